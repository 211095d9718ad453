use std::sync::Arc;
use std::time::Instant;

use crate::conversation::{Message, Sender};
use crate::elapsed::{elapsed_since, format_elapsed};

/// What the engine is waiting for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Nothing is in flight.
    #[default]
    Idle,
    /// A narrative reply is being requested.
    AwaitingNarrative,
    /// Keywords for the latest turn's illustration are being requested.
    AwaitingIllustrationKeywords,
    /// The latest turn's illustration is being searched.
    AwaitingIllustration,
}

/// An immutable view of an engine's state.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Every message of the story, in order.
    pub transcript: Vec<Message>,
    /// Whether a narrative request is in flight, i.e. whether to show a
    /// typing indicator.
    pub pending: bool,
    /// The most recently resolved illustration.
    pub illustration_url: Option<String>,
    /// The current stage of the engine.
    pub stage: Stage,
    /// The partial text of the reply being streamed.
    pub streaming: Option<String>,
    /// The theme the story was created with.
    pub theme: Arc<str>,
    /// When `start` was first called.
    pub started_at: Option<Instant>,
}

impl Snapshot {
    pub(crate) fn initial(theme: Arc<str>) -> Self {
        Self {
            transcript: vec![],
            pending: false,
            illustration_url: None,
            stage: Stage::Idle,
            streaming: None,
            theme,
            started_at: None,
        }
    }

    /// Returns the last message written by the assistant.
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.transcript
            .iter()
            .rev()
            .find(|msg| msg.sender() == Sender::Assistant)
    }

    /// Formats the time since the story started as `MM:SS`.
    pub fn elapsed_label(&self, now: Instant) -> String {
        let seconds = self
            .started_at
            .map(|started_at| elapsed_since(now, started_at).as_secs())
            .unwrap_or_default();
        format_elapsed(seconds)
    }
}
