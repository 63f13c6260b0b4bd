//! Speech capture engine
//!
//! This module provides the `SpeechEngine` that manages:
//! - One platform recognizer per bound input, rebuilt on language change
//! - The Idle / Listening / Erroring session lifecycle
//! - Interim and final transcript merging
//! - Mapping platform error codes onto a fixed error taxonomy

mod engine;
mod error;
mod transcript;

pub use engine::{Configure, EngineEvent, SessionStatus, SpeechEngine};
pub use error::{ErrorKind, RecognitionError};
pub use transcript::{Reduction, TranscriptReducer};
