//! An out-of-the-box story engine that wires the narrative and image
//! providers together.
//!
//! The crate includes a small terminal demo. And you can also use it as a
//! library to bring illustrated interactive stories into your own host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod story;

pub use story::{ConfigError, StoryBuilder, StoryConfig};

/// Re-exports of [`storybeat_core`] crate.
pub mod core {
    pub use storybeat_core::*;
}
