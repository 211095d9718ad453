//! Core logic of an interactive story: the conversation engine, its
//! transcript, prompts, and the illustration pipeline.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod conversation;
pub mod elapsed;
mod engine;
mod error;
mod image_client;
mod model_client;
mod prompt;

pub use engine::{Engine, EngineBuilder, EngineEvent, Snapshot, Stage};
pub use error::{EngineError, ProviderError};
