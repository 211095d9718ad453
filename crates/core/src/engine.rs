mod builder;
mod snapshot;
mod state;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use storybeat_actor::Actor;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::conversation::{MessageId, Transcript};
use crate::error::{EngineError, ProviderError};
use crate::image_client::ImageClient;
use crate::model_client::ModelClient;
pub use builder::EngineBuilder;
pub use snapshot::{Snapshot, Stage};
use state::{IllustrationStage, InFlightNarrative};

/// A discrete happening reported to the `on_event` callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// A narrative reply was accepted and appended as this message.
    TurnCompleted(MessageId),
    /// The narrative request of `start` or `submit` failed. Nothing was
    /// appended for the reply, and the command may be issued again.
    NarrativeFailed(ProviderError),
    /// The illustration now shows this URL.
    IllustrationUpdated(String),
}

type EventFn = Arc<dyn Fn(EngineEvent) + Send + Sync>;
type DeltaFn = Arc<dyn Fn(&str) + Send + Sync>;

/// The state owned by an engine's actor. Only its message handlers mutate
/// it, one message at a time.
pub(crate) struct EngineState {
    theme: Arc<str>,
    model_client: ModelClient,
    image_client: ImageClient,
    transcript: Transcript,
    started_at: Option<Instant>,

    narrative: Option<InFlightNarrative>,
    next_request_id: u64,
    streaming: Option<String>,
    // Number of accepted narrative replies. Illustration work is tagged
    // with the turn it belongs to.
    turn: u64,
    illustration: IllustrationStage,
    illustration_url: Option<String>,

    running_tasks: HashMap<u64, JoinHandle<()>>,
    next_task_id: u64,

    snapshot_tx: watch::Sender<Snapshot>,
    on_event: Option<EventFn>,
    on_delta: Option<DeltaFn>,
}

/// An interactive story conversation.
///
/// The engine owns the transcript and talks to a narrative provider and an
/// image provider on its own tasks. Commands return as soon as the engine
/// has accepted or rejected them; progress is observed through
/// [`Engine::subscribe`] and the callbacks of [`EngineBuilder`].
///
/// Dropping the engine stops it. Requests still in flight are aborted and
/// their results are discarded.
pub struct Engine {
    actor: Actor<EngineState>,
    snapshot_rx: watch::Receiver<Snapshot>,
}

impl Engine {
    /// Requests the opening beat of the story.
    ///
    /// This is a no-op when the story already has messages or a narrative
    /// request is in flight.
    pub async fn start(&self) -> Result<(), EngineError> {
        self.actor
            .ask(|state, handle| state.start(handle))
            .await
            .map_err(|_| EngineError::Disposed)
    }

    /// Appends `text` as the user's turn and requests the next beat.
    ///
    /// Returns the id of the appended user message. `text` is stored
    /// verbatim; it is only required to contain something other than
    /// whitespace.
    pub async fn submit<S: Into<String>>(
        &self,
        text: S,
    ) -> Result<MessageId, EngineError> {
        let text = text.into();
        self.actor
            .ask(move |state, handle| state.submit(text, handle))
            .await
            .map_err(|_| EngineError::Disposed)?
    }

    /// Returns a receiver that observes every state change.
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Returns the latest published state.
    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.actor.try_kill();
    }
}

impl Engine {
    fn spawn_from_builder(builder: EngineBuilder) -> Self {
        let EngineBuilder {
            theme,
            model_client,
            image_client,
            on_event,
            on_delta,
        } = builder;

        let theme: Arc<str> = theme.into();
        let (snapshot_tx, snapshot_rx) =
            watch::channel(Snapshot::initial(Arc::clone(&theme)));
        let state = EngineState {
            theme,
            model_client,
            image_client,
            transcript: Default::default(),
            started_at: None,
            narrative: None,
            next_request_id: 1,
            streaming: None,
            turn: 0,
            illustration: Default::default(),
            illustration_url: None,
            running_tasks: Default::default(),
            next_task_id: 1,
            snapshot_tx,
            on_event,
            on_delta,
        };
        let actor = Actor::spawn(state, Some("story engine"));
        Self { actor, snapshot_rx }
    }
}
