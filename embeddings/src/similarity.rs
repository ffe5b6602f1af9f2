//! Similarity computation for embeddings.

use serde::Serialize;

use crate::Embedding;
use crate::error::LengthMismatch;

/// Decimal places kept for every matrix entry other than an exact 1.
const PRECISION: i32 = 2;

/// Compute the cosine similarity between two vectors.
///
/// Returns a value between -1.0 and 1.0. A zero vector on either side
/// yields 0.0 instead of dividing by zero.
///
/// The norms are combined as `sqrt(|a|² · |b|²)`. Every step is
/// commutative in `a` and `b`, so swapping the arguments produces the
/// same bits, and `v · v / sqrt(|v|²·|v|²)` is exactly 1.0.
pub fn try_cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, LengthMismatch> {
    if a.len() != b.len() {
        return Err(LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a * norm_b).sqrt()).clamp(-1.0, 1.0))
}

/// Cosine similarity for vectors that are known to share a dimension.
///
/// # Panics
///
/// Panics with [`LengthMismatch`] when the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    match try_cosine_similarity(a, b) {
        Ok(score) => score,
        Err(mismatch) => panic!("{mismatch}"),
    }
}

/// Round a similarity score for display.
///
/// An exact 1 is returned untouched; everything else is rounded to two
/// decimal places, half away from zero.
pub fn round_similarity(score: f64) -> f64 {
    if score == 1.0 {
        return score;
    }
    let scale = 10f64.powi(PRECISION);
    let rounded = (score * scale).round() / scale;
    // Fold -0.0 into 0.0 so tiny negative scores don't render as "-0.00".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Square matrix of rounded pairwise cosine similarities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatrix {
    /// Row-major `n × n` cells.
    cells: Vec<f64>,

    /// Number of rows (and columns).
    n: usize,
}

impl SimilarityMatrix {
    /// Build the matrix for every ordered pair of `embeddings`.
    ///
    /// Only the upper triangle is computed; the lower triangle is a copy,
    /// so `get(i, j) == get(j, i)` holds bit for bit.
    ///
    /// # Panics
    ///
    /// Panics with [`LengthMismatch`] if the embeddings do not share a
    /// dimension. Callers validate model output with
    /// [`check_shape`](crate::provider::check_shape) first.
    pub fn from_embeddings(embeddings: &[Embedding]) -> Self {
        let n = embeddings.len();
        let mut cells = vec![0.0f64; n * n];

        for i in 0..n {
            for j in i..n {
                let score = round_similarity(cosine_similarity(&embeddings[i], &embeddings[j]));
                cells[i * n + j] = score;
                cells[j * n + i] = score;
            }
        }

        Self { cells, n }
    }

    /// Number of rows (equal to the number of columns).
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Entry at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.n && col < self.n {
            Some(self.cells[row * self.n + col])
        } else {
            None
        }
    }

    /// One row of the matrix.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row < self.n {
            Some(&self.cells[row * self.n..(row + 1) * self.n])
        } else {
            None
        }
    }

    /// Iterate over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // `chunks_exact(0)` panics, and an empty matrix has no rows anyway.
        self.cells.chunks_exact(self.n.max(1))
    }

    /// Text for one cell: an exact 1 renders as `1`, everything else with
    /// two decimals.
    pub fn format_cell(&self, row: usize, col: usize) -> Option<String> {
        self.get(row, col).map(|score| {
            if score == 1.0 {
                "1".to_string()
            } else {
                format!("{score:.2}")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cosine_similarity_identical() {
        let v = vec![0.3, -1.7, 2.2, 0.01];
        assert_eq!(cosine_similarity(&v, &v), 1.0);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), -1.0);
    }

    #[test]
    fn test_zero_vector_is_zero() {
        let zero = vec![0.0, 0.0, 0.0];
        let v = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_argument_order_is_irrelevant() {
        let a = vec![0.12, 0.93, -0.4, 0.77];
        let b = vec![0.5, -0.21, 0.33, 0.9];
        assert_eq!(
            cosine_similarity(&a, &b).to_bits(),
            cosine_similarity(&b, &a).to_bits()
        );
    }

    #[test]
    fn test_length_mismatch() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(
            try_cosine_similarity(&a, &b),
            Err(LengthMismatch { left: 2, right: 3 })
        );
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn test_length_mismatch_panics() {
        cosine_similarity(&[1.0], &[1.0, 2.0]);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_similarity(0.7321), 0.73);
        assert_eq!(round_similarity(0.736), 0.74);
        assert_eq!(round_similarity(-0.456), -0.46);
        assert_eq!(round_similarity(1.0), 1.0);
        assert_eq!(round_similarity(0.0), 0.0);
    }

    #[test]
    fn test_matrix_for_orthogonal_pair() {
        let matrix = SimilarityMatrix::from_embeddings(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let rows: Vec<Vec<f64>> = matrix.rows().map(<[f64]>::to_vec).collect();
        assert_eq!(rows, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_matrix_is_square_and_symmetric() {
        let embeddings = vec![
            vec![0.1, 0.2, 0.3],
            vec![0.9, -0.1, 0.05],
            vec![0.0, 0.0, 0.0],
            vec![-0.3, 0.8, 0.11],
        ];
        let matrix = SimilarityMatrix::from_embeddings(&embeddings);
        assert_eq!(matrix.dimension(), 4);
        assert_eq!(matrix.rows().count(), 4);

        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        for i in [0, 1, 3] {
            assert_eq!(matrix.get(i, i), Some(1.0));
        }
        assert_eq!(matrix.get(2, 2), Some(0.0));
        assert_eq!(matrix.get(4, 0), None);
    }

    #[test]
    fn test_format_cell() {
        let matrix =
            SimilarityMatrix::from_embeddings(&[vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]]);
        assert_eq!(matrix.format_cell(0, 0).as_deref(), Some("1"));
        assert_eq!(matrix.format_cell(0, 1).as_deref(), Some("0.71"));
        assert_eq!(matrix.format_cell(0, 2).as_deref(), Some("0.00"));
        assert_eq!(matrix.format_cell(3, 0), None);
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = SimilarityMatrix::from_embeddings(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.rows().count(), 0);
    }
}
