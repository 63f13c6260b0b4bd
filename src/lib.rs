pub mod config;
pub mod diagnostics;
pub mod input;
pub mod language;
pub mod notify;
pub mod platform;
pub mod probe;
pub mod recognition;

pub use config::Config;
pub use diagnostics::{CompatibilityReport, DebugInfo, DeviceClass};
pub use input::{SearchField, VoiceSearch, VoiceSearchOptions};
pub use language::{find_by_code, list_popular, Language, LANGUAGES};
pub use notify::{Notice, Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use platform::{
    Environment, PlatformEvent, PlatformProvider, Recognizer, RecognizerSettings, ResultSegment,
    Script, ScriptedCapability, SpeechCapability,
};
pub use probe::{run_test_capture, ProbeOutcome};
pub use recognition::{
    Configure, EngineEvent, ErrorKind, RecognitionError, SessionStatus, SpeechEngine,
};
