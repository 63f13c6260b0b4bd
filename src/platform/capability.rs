use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Names under which hosts expose speech recognition, standard name first
pub const KNOWN_SPEECH_APIS: &[&str] = &["SpeechRecognition", "webkitSpeechRecognition"];

/// Settings applied to a platform recognizer when it is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizerSettings {
    /// Recognition locale (e.g. "en-US")
    pub lang: String,

    /// Keep listening after the first utterance
    pub continuous: bool,

    /// Deliver revisable interim results
    pub interim_results: bool,

    /// Alternatives per result segment
    pub max_alternatives: u32,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            lang: "en-US".to_string(),
            continuous: false,     // One utterance per search
            interim_results: true, // Live feedback while speaking
            max_alternatives: 1,
        }
    }
}

/// One transcribed segment carried by a platform result event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSegment {
    pub text: String,
    pub is_final: bool,
}

impl ResultSegment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_final: false }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_final: true }
    }
}

/// Raw events pushed by a platform recognizer, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// Audio capture began
    Start,
    /// New or revised segments for the current utterance
    Result(Vec<ResultSegment>),
    /// Platform error code (e.g. "no-speech") with optional detail
    Error { code: String, message: Option<String> },
    /// Recognizer finished and released the microphone
    End,
}

/// A platform recognizer bound to one locale
///
/// Calls only issue requests; completion arrives later on the event channel
/// the recognizer was built with.
pub trait Recognizer: Send {
    /// Request audio capture. May fail synchronously (e.g. already started).
    fn start(&mut self) -> Result<()>;

    /// Request a graceful stop. Pending results may still be delivered.
    fn stop(&mut self);

    /// Stop immediately, discarding pending results
    fn abort(&mut self);

    /// Locale the recognizer was built for
    fn lang(&self) -> &str;
}

/// Host-provided speech recognition capability
pub trait SpeechCapability: Send + Sync {
    /// Name the host exposes the capability under
    fn api_name(&self) -> &str;

    /// Build a recognizer that reports its events on `events`
    fn create_recognizer(
        &self,
        settings: &RecognizerSettings,
        events: mpsc::UnboundedSender<PlatformEvent>,
    ) -> Result<Box<dyn Recognizer>>;
}

/// What the host reports about itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub user_agent: String,
}

impl Environment {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self { user_agent: user_agent.into() }
    }
}

/// Capability provider injected into the engine
#[derive(Clone)]
pub enum PlatformProvider {
    /// Host exposes a recognizer
    Available {
        capability: Arc<dyn SpeechCapability>,
        environment: Environment,
    },
    /// Host has no recognizer; everything reports unsupported
    Absent { environment: Environment },
}

impl PlatformProvider {
    pub fn available(capability: Arc<dyn SpeechCapability>, environment: Environment) -> Self {
        Self::Available { capability, environment }
    }

    pub fn absent(environment: Environment) -> Self {
        Self::Absent { environment }
    }

    /// True iff the capability is exposed under a known name
    pub fn is_supported(&self) -> bool {
        match self {
            Self::Available { capability, .. } => {
                KNOWN_SPEECH_APIS.contains(&capability.api_name())
            }
            Self::Absent { .. } => false,
        }
    }

    pub fn api_name(&self) -> Option<&str> {
        match self {
            Self::Available { capability, .. } => Some(capability.api_name()),
            Self::Absent { .. } => None,
        }
    }

    pub fn environment(&self) -> &Environment {
        match self {
            Self::Available { environment, .. } | Self::Absent { environment } => environment,
        }
    }

    /// Build a recognizer, failing when the host has no supported capability
    pub fn create_recognizer(
        &self,
        settings: &RecognizerSettings,
        events: mpsc::UnboundedSender<PlatformEvent>,
    ) -> Result<Box<dyn Recognizer>> {
        match self {
            Self::Available { capability, .. } if self.is_supported() => {
                capability.create_recognizer(settings, events)
            }
            Self::Available { capability, .. } => {
                anyhow::bail!("Unrecognized speech API: {}", capability.api_name())
            }
            Self::Absent { .. } => {
                anyhow::bail!("Speech recognition is not available on this platform")
            }
        }
    }
}

impl std::fmt::Debug for PlatformProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformProvider")
            .field("api_name", &self.api_name())
            .field("environment", self.environment())
            .finish()
    }
}
