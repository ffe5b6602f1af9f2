//! The interactive session event loop.
//!
//! One task owns the input list, the highlight state, the debouncer and
//! the pipeline. Edits, pointer events, debounce expiry, model load and
//! embed completions are all handled in that task, one at a time, so no
//! state needs a lock.

use std::sync::Arc;

use simmatrix_embeddings::{Embedding, EmbeddingModel, ModelLoadError, ModelLoader, SimilarityMatrix};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::debounce::Debouncer;
use crate::error::{Result, SessionError};
use crate::highlight::{HighlightAction, HighlightState, PointerEvent};
use crate::inputs::{InputAction, InputList, InputSnapshot};
use crate::pipeline::{Completion, EmbeddingPipeline, Generation, ModelStatus, PipelineStatus};

/// Everything a front end needs to render the session.
#[derive(Debug, Clone)]
pub struct SessionView {
    /// Current (live) inputs.
    pub inputs: InputSnapshot,

    /// Highlight flags, always as long as `inputs`.
    pub highlight: HighlightState,

    /// Model availability.
    pub model: ModelStatus,

    /// Status of the latest embedding request.
    pub status: PipelineStatus,

    /// Displayed embeddings.
    pub embeddings: Option<Arc<Vec<Embedding>>>,

    /// Displayed matrix. May lag `inputs`.
    pub matrix: Option<Arc<SimilarityMatrix>>,

    /// Inputs the displayed matrix was computed from.
    pub matrix_inputs: Option<InputSnapshot>,

    /// Generation of the latest issued request.
    pub generation: Generation,

    /// Superseded completions dropped so far.
    pub discarded: u64,
}

enum SessionCommand {
    Edit {
        action: InputAction,
        reply: oneshot::Sender<Result<InputSnapshot>>,
    },
    Pointer {
        event: PointerEvent,
        reply: oneshot::Sender<HighlightState>,
    },
    Shutdown,
}

/// Event loop state. Consumed by [`Session::spawn`].
pub struct Session {
    inputs: InputList,
    highlight: HighlightState,
    debouncer: Debouncer<InputSnapshot>,
    pipeline: EmbeddingPipeline,
    commands: mpsc::Receiver<SessionCommand>,
    completions: mpsc::UnboundedReceiver<Completion>,
    view: watch::Sender<SessionView>,
}

impl Session {
    /// Start a session on the current tokio runtime.
    ///
    /// The model load starts immediately in the background. The initial
    /// inputs count as already debounced, so the first request is issued
    /// as soon as the model is ready.
    pub fn spawn(config: SessionConfig, loader: Arc<dyn ModelLoader>) -> Result<SessionHandle> {
        config.validate()?;

        let (command_tx, command_rx) = mpsc::channel(config.command_buffer);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let inputs = InputList::new(config.initial_inputs.clone());
        let pipeline =
            EmbeddingPipeline::new(inputs.snapshot(), config.keep_stale_matrix, completion_tx);
        let highlight = HighlightState::new(inputs.len());

        let mut session = Self {
            inputs,
            highlight,
            debouncer: Debouncer::new(config.debounce()),
            pipeline,
            commands: command_rx,
            completions: completion_rx,
            view: watch::channel(placeholder_view()).0,
        };
        let view_rx = session.view.subscribe();
        session.publish();

        let (model_tx, model_rx) = oneshot::channel();
        tokio::spawn(async move {
            let _ = model_tx.send(loader.load().await);
        });

        info!(
            "Session started with {} inputs (debounce {}ms)",
            session.inputs.len(),
            config.debounce_ms
        );
        let task = tokio::spawn(session.run(model_rx));

        Ok(SessionHandle {
            commands: command_tx,
            view: view_rx,
            task: Arc::new(task),
        })
    }

    async fn run(
        mut self,
        mut model_rx: oneshot::Receiver<std::result::Result<Arc<dyn EmbeddingModel>, ModelLoadError>>,
    ) {
        let mut model_pending = true;

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Edit { action, reply }) => {
                        let result = self.edit(action);
                        self.publish();
                        let _ = reply.send(result);
                    }
                    Some(SessionCommand::Pointer { event, reply }) => {
                        self.highlight.on_pointer(event);
                        self.publish();
                        let _ = reply.send(self.highlight.clone());
                    }
                    Some(SessionCommand::Shutdown) | None => break,
                },
                loaded = &mut model_rx, if model_pending => {
                    model_pending = false;
                    let loaded = loaded.unwrap_or_else(|_| {
                        Err(ModelLoadError::Unavailable("model loader task ended".to_string()))
                    });
                    self.pipeline.on_model_loaded(loaded);
                    self.publish();
                }
                snapshot = self.debouncer.fired() => {
                    self.pipeline.on_snapshot(snapshot);
                    self.publish();
                }
                Some(completion) = self.completions.recv() => {
                    // A dropped completion still bumps the discard count.
                    self.pipeline.apply(completion);
                    self.publish();
                }
            }
        }

        info!("Session stopped");
    }

    fn edit(&mut self, action: InputAction) -> Result<InputSnapshot> {
        let before = self.inputs.len();
        let snapshot = self.inputs.dispatch(action)?;

        if snapshot.len() != before {
            debug!("Input list length {before} -> {}", snapshot.len());
            self.highlight.apply(HighlightAction::Reset(snapshot.len()));
        }
        self.debouncer.push(snapshot.clone());

        Ok(snapshot)
    }

    fn publish(&self) {
        let output = self.pipeline.output();
        self.view.send_replace(SessionView {
            inputs: self.inputs.snapshot(),
            highlight: self.highlight.clone(),
            model: self.pipeline.model_status(),
            status: self.pipeline.status().clone(),
            embeddings: output.embeddings.clone(),
            matrix: output.matrix.clone(),
            matrix_inputs: output.source.clone(),
            generation: self.pipeline.generation(),
            discarded: self.pipeline.discarded(),
        });
    }
}

fn placeholder_view() -> SessionView {
    SessionView {
        inputs: InputSnapshot::default(),
        highlight: HighlightState::default(),
        model: ModelStatus::Loading,
        status: PipelineStatus::Success,
        embeddings: None,
        matrix: None,
        matrix_inputs: None,
        generation: 0,
        discarded: 0,
    }
}

/// Cloneable handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    view: watch::Receiver<SessionView>,
    task: Arc<JoinHandle<()>>,
}

impl SessionHandle {
    /// Append an empty input. Returns the new list.
    pub async fn create(&self) -> Result<InputSnapshot> {
        self.edit(InputAction::Create).await
    }

    /// Replace the input at `index`.
    pub async fn update(&self, index: usize, value: impl Into<String>) -> Result<InputSnapshot> {
        self.edit(InputAction::Update {
            index,
            value: value.into(),
        })
        .await
    }

    /// Remove the input at `index`.
    pub async fn delete(&self, index: usize) -> Result<InputSnapshot> {
        self.edit(InputAction::Delete(index)).await
    }

    /// Apply any input edit.
    pub async fn edit(&self, action: InputAction) -> Result<InputSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Edit { action, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    /// Feed a pointer event. Returns the resulting highlight state.
    pub async fn pointer(&self, event: PointerEvent) -> Result<HighlightState> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Pointer { event, reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    /// The latest published view.
    pub fn snapshot(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every published view.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    /// Wait until a published view satisfies `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&SessionView) -> bool) -> Result<SessionView> {
        let mut rx = self.view.clone();
        let view = rx.wait_for(predicate).await.map_err(|_| SessionError::Closed)?;
        Ok(view.clone())
    }

    /// Stop the event loop. In-flight embed calls finish unobserved.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown).await;
    }

    /// Whether the event loop has exited.
    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }
}
