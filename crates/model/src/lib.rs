//! An abstraction layer for the content providers a story is built from.
//!
//! This crate establishes an unified protocol for the story engine to
//! interact with a narrative provider (a text-completion model) and an
//! image provider (a photo search service), so that the engine can switch
//! between concrete services without modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod image;
mod provider;
mod request;
mod response;

pub use error::*;
pub use image::*;
pub use provider::*;
pub use request::*;
pub use response::*;
