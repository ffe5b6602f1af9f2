//! Plain-text rendering of a session view.

use std::fmt::Write;

use simmatrix_session::{ModelStatus, PipelineStatus, SessionView};

const CELL_WIDTH: usize = 6;

/// Leading components shown per vector.
const PREVIEW_LEN: usize = 4;

/// Render the numbered input list, marking highlighted rows with `*`.
pub fn inputs(view: &SessionView) -> String {
    let mut out = String::new();
    for (i, text) in view.inputs.iter().enumerate() {
        let mark = if view.highlight.is_highlighted(i) { '*' } else { ' ' };
        let _ = writeln!(out, "{mark}{:>3}  {text}", i + 1);
    }
    out
}

/// Render the embeddings section: shape plus a short preview of each
/// vector, or the loading and error lines of the latest request.
pub fn embeddings(view: &SessionView) -> String {
    let mut out = String::new();

    if let PipelineStatus::Error { message } = &view.status {
        let _ = writeln!(out, "Embedding error: {message}");
    }

    let Some(vectors) = &view.embeddings else {
        if view.status == PipelineStatus::Loading {
            out.push_str("Loading embeddings...\n");
        }
        return out;
    };

    let dimension = vectors.first().map_or(0, Vec::len);
    let _ = writeln!(out, "embeddings: {}x{dimension}", vectors.len());
    for (i, vector) in vectors.iter().enumerate() {
        let preview: Vec<String> = vector
            .iter()
            .take(PREVIEW_LEN)
            .map(|x| format!("{x:.4}"))
            .collect();
        let more = if vector.len() > PREVIEW_LEN { ", ..." } else { "" };
        let _ = writeln!(out, "{:>4}  [{}{more}]", i + 1, preview.join(", "));
    }
    out
}

/// Render the matrix, or the model status line explaining why there is none.
///
/// Highlighted indices get a `*` next to their row and column headers.
pub fn matrix(view: &SessionView) -> String {
    let mut out = String::new();

    match &view.model {
        ModelStatus::Loading => out.push_str("Loading model...\n"),
        ModelStatus::Failed { message } => {
            let _ = writeln!(out, "Loading model error: {message}");
        }
        ModelStatus::Ready { .. } => {}
    }

    let Some(matrix) = &view.matrix else {
        return out;
    };

    let mark = |i: usize| if view.highlight.is_highlighted(i) { "*" } else { "" };

    let _ = write!(out, "{:>w$}", "", w = CELL_WIDTH);
    for col in 0..matrix.dimension() {
        let header = format!("{}{}", col + 1, mark(col));
        let _ = write!(out, "{header:>w$}", w = CELL_WIDTH);
    }
    out.push('\n');

    for row in 0..matrix.dimension() {
        let header = format!("{}{}", row + 1, mark(row));
        let _ = write!(out, "{header:>w$}", w = CELL_WIDTH);
        for col in 0..matrix.dimension() {
            let cell = matrix.format_cell(row, col).unwrap_or_default();
            let _ = write!(out, "{cell:>w$}", w = CELL_WIDTH);
        }
        out.push('\n');
    }

    if view.status == PipelineStatus::Loading {
        out.push_str("(updating...)\n");
    }
    out
}
