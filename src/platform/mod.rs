//! Platform speech-recognition seam
//!
//! The engine never probes the host for a recognizer itself. It is handed a
//! [`PlatformProvider`], which is either `Available` (wrapping a concrete
//! [`SpeechCapability`]) or `Absent` (always unsupported).

pub mod capability;
pub mod scripted;

pub use capability::{
    Environment, PlatformEvent, PlatformProvider, Recognizer, RecognizerSettings, ResultSegment,
    SpeechCapability, KNOWN_SPEECH_APIS,
};
pub use scripted::{Script, ScriptedCalls, ScriptedCapability};
