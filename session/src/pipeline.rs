//! Embedding pipeline with a generation guard.
//!
//! Every change to the pipeline's key (model readiness or the debounced
//! input snapshot) issues a request tagged with a fresh generation. The
//! embed call runs as a background task and reports back through a
//! channel; only the completion whose tag matches the latest issued
//! generation is applied. Completion order therefore never matters.

use std::sync::Arc;

use simmatrix_embeddings::{
    Embedding, EmbeddingError, EmbeddingModel, ModelLoadError, SimilarityMatrix, check_shape,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::inputs::InputSnapshot;

/// Identifier of an issued embedding request. Strictly increasing.
pub type Generation = u64;

/// Model availability as seen by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    /// Load in progress.
    Loading,

    /// Model available.
    Ready { name: String },

    /// Load failed; embeddings stay unavailable for this session.
    Failed { message: String },
}

/// Lifecycle of the latest request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStatus {
    /// A request is in flight.
    Loading,

    /// The latest request resolved; see [`PipelineOutput`].
    Success,

    /// The latest embed call failed.
    Error { message: String },
}

/// Displayed embeddings and matrix.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// One vector per input of `source`.
    pub embeddings: Option<Arc<Vec<Embedding>>>,

    /// Pairwise similarities of `embeddings`.
    pub matrix: Option<Arc<SimilarityMatrix>>,

    /// Snapshot the embeddings were computed from.
    pub source: Option<InputSnapshot>,
}

impl PipelineOutput {
    fn computed(source: InputSnapshot, embeddings: Vec<Embedding>, matrix: SimilarityMatrix) -> Self {
        Self {
            embeddings: Some(Arc::new(embeddings)),
            matrix: Some(Arc::new(matrix)),
            source: Some(source),
        }
    }
}

/// Result of one request, delivered back to the event loop.
#[derive(Debug)]
pub struct Completion {
    /// Tag of the request.
    pub generation: Generation,

    /// Embeddings and matrix, or why the embed call failed.
    pub result: Result<PipelineOutput, EmbeddingError>,
}

enum ModelState {
    Loading,
    Ready(Arc<dyn EmbeddingModel>),
    Failed(ModelLoadError),
}

/// Session-scoped pipeline state.
pub struct EmbeddingPipeline {
    /// Model handle or its load state.
    model: ModelState,

    /// Latest debounced snapshot.
    snapshot: InputSnapshot,

    /// Generation of the most recently issued request.
    generation: Generation,

    /// Status of that request.
    status: PipelineStatus,

    /// What is currently displayed.
    output: PipelineOutput,

    /// Keep `output` while a newer request is in flight.
    keep_stale: bool,

    /// Completions from superseded requests that were dropped.
    discarded: u64,

    /// Where background requests report.
    completions: mpsc::UnboundedSender<Completion>,
}

impl EmbeddingPipeline {
    /// Create a pipeline for the initial snapshot.
    ///
    /// Nothing is issued until the model finishes loading or a new
    /// snapshot arrives.
    pub fn new(
        snapshot: InputSnapshot,
        keep_stale: bool,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            model: ModelState::Loading,
            snapshot,
            generation: 0,
            status: PipelineStatus::Success,
            output: PipelineOutput::default(),
            keep_stale,
            discarded: 0,
            completions,
        }
    }

    /// Record the outcome of the model load and issue a request.
    pub fn on_model_loaded(
        &mut self,
        loaded: Result<Arc<dyn EmbeddingModel>, ModelLoadError>,
    ) -> Generation {
        self.model = match loaded {
            Ok(model) => {
                info!("Embedding model ready: {}", model.name());
                ModelState::Ready(model)
            }
            Err(e) => {
                warn!("Embedding model unavailable: {e}");
                ModelState::Failed(e)
            }
        };
        self.issue()
    }

    /// Record a new debounced snapshot and issue a request.
    ///
    /// A snapshot with the same contents as the current one leaves the key
    /// unchanged, so nothing is issued and `None` is returned.
    pub fn on_snapshot(&mut self, snapshot: InputSnapshot) -> Option<Generation> {
        if *snapshot == *self.snapshot {
            debug!("Debounced inputs unchanged; keeping request {}", self.generation);
            return None;
        }
        self.snapshot = snapshot;
        Some(self.issue())
    }

    /// Issue a request for the current key.
    ///
    /// Without a ready model the request resolves on the spot to empty
    /// output. Otherwise the embed call is spawned and its result comes
    /// back as a [`Completion`].
    fn issue(&mut self) -> Generation {
        self.generation += 1;
        let generation = self.generation;

        let model = match &self.model {
            ModelState::Ready(model) => model.clone(),
            ModelState::Loading | ModelState::Failed(_) => {
                debug!("Request {generation} resolved without a model");
                self.apply(Completion {
                    generation,
                    result: Ok(PipelineOutput::default()),
                });
                return generation;
            }
        };

        debug!(
            "Issuing embedding request {generation} for {} inputs",
            self.snapshot.len()
        );
        self.status = PipelineStatus::Loading;
        if !self.keep_stale {
            self.output = PipelineOutput::default();
        }

        let snapshot = self.snapshot.clone();
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = compute(model.as_ref(), snapshot).await;
            // The receiver is gone only when the session has ended.
            let _ = completions.send(Completion { generation, result });
        });

        generation
    }

    /// Apply a completion if it belongs to the latest request.
    ///
    /// Returns `false` when the completion was superseded and dropped.
    pub fn apply(&mut self, completion: Completion) -> bool {
        if completion.generation != self.generation {
            debug!(
                "Discarding stale result for request {} (latest is {})",
                completion.generation, self.generation
            );
            self.discarded += 1;
            return false;
        }

        match completion.result {
            Ok(output) => {
                if let Some(matrix) = &output.matrix {
                    info!(
                        "Applied {n}x{n} similarity matrix from request {}",
                        completion.generation,
                        n = matrix.dimension()
                    );
                }
                self.status = PipelineStatus::Success;
                self.output = output;
            }
            Err(e) => {
                warn!("Embedding request {} failed: {e}", completion.generation);
                self.status = PipelineStatus::Error {
                    message: e.to_string(),
                };
                self.output = PipelineOutput::default();
            }
        }
        true
    }

    /// Generation of the most recently issued request.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Status of the most recently issued request.
    pub fn status(&self) -> &PipelineStatus {
        &self.status
    }

    /// Currently displayed output.
    pub fn output(&self) -> &PipelineOutput {
        &self.output
    }

    /// Number of superseded completions dropped so far.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Latest debounced snapshot.
    pub fn snapshot(&self) -> &InputSnapshot {
        &self.snapshot
    }

    /// Model availability.
    pub fn model_status(&self) -> ModelStatus {
        match &self.model {
            ModelState::Loading => ModelStatus::Loading,
            ModelState::Ready(model) => ModelStatus::Ready {
                name: model.name().to_string(),
            },
            ModelState::Failed(e) => ModelStatus::Failed {
                message: e.to_string(),
            },
        }
    }
}

async fn compute(
    model: &dyn EmbeddingModel,
    snapshot: InputSnapshot,
) -> Result<PipelineOutput, EmbeddingError> {
    let embeddings = model.embed(&snapshot).await?;
    check_shape(&snapshot, &embeddings)?;
    let matrix = SimilarityMatrix::from_embeddings(&embeddings);
    Ok(PipelineOutput::computed(snapshot, embeddings, matrix))
}
