//! # Events Module
//!
//! Progress reporting decoupled from presentation.
//!
//! The assembler emits [`Event`]s through an [`EventSender`]; the CLI drains
//! the matching [`EventReceiver`] on its own thread to drive a progress bar.
//! Logging happens through `tracing` regardless of whether anyone listens.

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
