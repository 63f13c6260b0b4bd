use serde::{Deserialize, Serialize};
use std::fmt;

/// Error taxonomy for recognition failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Host has no speech recognition capability
    Unsupported,
    /// Recognizer timed out without hearing speech
    NoSpeech,
    /// Microphone missing or failing
    AudioCapture,
    /// User or host refused microphone access
    PermissionDenied,
    /// Recognizer needs connectivity that is unavailable
    Network,
    /// Anything else; the raw platform code is kept in the message
    Unknown,
}

impl ErrorKind {
    /// Map a platform error code onto the taxonomy
    pub fn from_platform_code(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "not-allowed" | "service-not-allowed" => Self::PermissionDenied,
            "network" => Self::Network,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::NoSpeech => "no-speech",
            Self::AudioCapture => "audio-capture",
            Self::PermissionDenied => "permission-denied",
            Self::Network => "network",
            Self::Unknown => "unknown",
        }
    }

    /// Short message suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unsupported => {
                "Voice search is not supported in this browser. Use Chrome or Edge for best results."
            }
            Self::NoSpeech => "No speech was detected. Please try again.",
            Self::AudioCapture => "No microphone was found. Check that one is connected.",
            Self::PermissionDenied => {
                "Microphone access was denied. Allow it in your browser settings and try again."
            }
            Self::Network => "Network error during speech recognition. Please try again.",
            Self::Unknown => "Speech recognition failed.",
        }
    }

    /// Whether a manual retry can reasonably succeed without user action elsewhere
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NoSpeech | Self::AudioCapture | Self::Network | Self::Unknown)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognition failure delivered through the engine's error channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {}", self.detail())]
pub struct RecognitionError {
    pub kind: ErrorKind,

    /// Raw platform detail, kept for diagnostics
    pub message: Option<String>,
}

impl RecognitionError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, message: None }
    }

    /// Build from a platform error event. Unknown codes keep the raw code.
    pub fn from_platform(code: &str, message: Option<String>) -> Self {
        let kind = ErrorKind::from_platform_code(code);
        let message = match (kind, message) {
            (ErrorKind::Unknown, Some(detail)) => Some(format!("{}: {}", code, detail)),
            (ErrorKind::Unknown, None) => Some(code.to_string()),
            (_, detail) => detail,
        };

        Self { kind, message }
    }

    /// Convert a synchronous failure from the platform's `start()`
    pub fn from_start_failure(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<RecognitionError>() {
            Some(recognition) => recognition.clone(),
            None => Self {
                kind: ErrorKind::Unknown,
                message: Some(err.to_string()),
            },
        }
    }

    fn detail(&self) -> &str {
        self.message.as_deref().unwrap_or(self.kind.user_message())
    }

    /// Message shown to the user
    pub fn user_message(&self) -> String {
        match (self.kind, &self.message) {
            (ErrorKind::Unknown, Some(detail)) => format!("Speech recognition failed: {}", detail),
            (kind, _) => kind.user_message().to_string(),
        }
    }
}
