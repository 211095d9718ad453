//! Error types.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use storybeat_model::{ErrorKind, ProviderError as RawProviderError};

/// A narrative or image provider failed.
///
/// Network failures, non-success statuses, and malformed payloads all end
/// up here and are handled the same way by the engine. The kind and the
/// message are kept for diagnostics only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderError {
    message: String,
    kind: ErrorKind,
}

impl ProviderError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ErrorKind::Other,
        }
    }

    pub(crate) fn from_raw<E: RawProviderError>(err: &E) -> Self {
        Self {
            message: err.to_string(),
            kind: err.kind(),
        }
    }

    /// Returns the error message reported by the provider.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the kind reported by the provider.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "provider error ({}): {}", self.kind, self.message)
    }
}

impl Error for ProviderError {}

/// The reason a command was rejected by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineError {
    /// The input is empty or only whitespace.
    EmptyInput,
    /// The story has no opening beat yet, call `start` first.
    NotStarted,
    /// A narrative request is still in flight.
    Busy,
    /// The engine has been shut down.
    Disposed,
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::EmptyInput => "input is empty".fmt(f),
            EngineError::NotStarted => "the story has not started".fmt(f),
            EngineError::Busy => "a narrative request is in flight".fmt(f),
            EngineError::Disposed => "the engine has been disposed".fmt(f),
        }
    }
}

impl Error for EngineError {}
