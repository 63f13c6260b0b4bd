//! Browser compatibility and debug snapshots
//!
//! Everything here is computed from the injected platform provider and the
//! engine state. Nothing is cached; every call re-inspects.

use crate::platform::PlatformProvider;
use crate::recognition::{RecognitionError, SessionStatus, SpeechEngine};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Shown when speech recognition is unavailable
pub const RECOMMENDED_BROWSER: &str = "Use Chrome or Edge for best results";

const MOBILE_MARKERS: &[&str] = &[
    "Android",
    "iPhone",
    "iPad",
    "iPod",
    "Mobile",
    "BlackBerry",
    "IEMobile",
    "Opera Mini",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

/// Point-in-time view of browser identity and speech support
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityReport {
    pub is_chrome: bool,
    pub is_edge: bool,
    pub is_firefox: bool,
    pub is_safari: bool,
    pub is_opera: bool,
    pub device: DeviceClass,
    pub is_supported: bool,
    pub api_name: Option<String>,

    /// Set only when speech recognition is unsupported
    pub recommended_browser: Option<String>,
}

impl CompatibilityReport {
    /// Inspect the provider's environment. Never fails.
    pub fn inspect(provider: &PlatformProvider) -> Self {
        let ua = provider.environment().user_agent.as_str();

        let is_edge = ua.contains("Edg/") || ua.contains("Edge/");
        let is_opera = ua.contains("OPR/") || ua.contains("Opera");
        let is_chrome =
            (ua.contains("Chrome/") || ua.contains("CriOS/")) && !is_edge && !is_opera;
        let is_firefox = ua.contains("Firefox/") || ua.contains("FxiOS/");
        let is_safari = ua.contains("Safari/") && !is_chrome && !is_edge && !is_opera && !is_firefox;

        let device = if MOBILE_MARKERS.iter().any(|marker| ua.contains(marker)) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        };

        let is_supported = provider.is_supported();

        Self {
            is_chrome,
            is_edge,
            is_firefox,
            is_safari,
            is_opera,
            device,
            is_supported,
            api_name: provider.api_name().map(str::to_string),
            recommended_browser: (!is_supported).then(|| RECOMMENDED_BROWSER.to_string()),
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.device == DeviceClass::Mobile
    }

    pub fn browser_name(&self) -> &'static str {
        if self.is_edge {
            "Edge"
        } else if self.is_opera {
            "Opera"
        } else if self.is_chrome {
            "Chrome"
        } else if self.is_firefox {
            "Firefox"
        } else if self.is_safari {
            "Safari"
        } else {
            "Unknown"
        }
    }
}

/// Serializable snapshot attached to user bug reports
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub is_supported: bool,
    pub api_name: Option<String>,
    pub browser: String,
    pub compatibility: CompatibilityReport,
    pub user_agent: String,
    pub current_language: String,
    pub pending_language: Option<String>,
    pub status: SessionStatus,
    pub is_listening: bool,
    pub live_transcript: String,
    pub last_error: Option<RecognitionError>,
    pub session_id: Option<Uuid>,
    pub captured_at: DateTime<Utc>,
}

impl DebugInfo {
    /// Snapshot the engine. Works with an absent platform too.
    pub fn capture(engine: &SpeechEngine) -> Self {
        let provider = engine.provider();
        let compatibility = CompatibilityReport::inspect(provider);

        Self {
            is_supported: compatibility.is_supported,
            api_name: compatibility.api_name.clone(),
            browser: compatibility.browser_name().to_string(),
            compatibility,
            user_agent: provider.environment().user_agent.clone(),
            current_language: engine.language().code.to_string(),
            pending_language: engine.pending_language().map(|l| l.code.to_string()),
            status: engine.status(),
            is_listening: engine.is_listening(),
            live_transcript: engine.live_transcript().to_string(),
            last_error: engine.last_error().cloned(),
            session_id: engine.session_id(),
            captured_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Environment, ScriptedCapability};
    use std::sync::Arc;

    const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const EDGE_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const FIREFOX_DESKTOP: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";

    fn available(ua: &str) -> PlatformProvider {
        PlatformProvider::available(
            Arc::new(ScriptedCapability::with_api_name("webkitSpeechRecognition")),
            Environment::new(ua),
        )
    }

    #[test]
    fn test_chrome_desktop() {
        let report = CompatibilityReport::inspect(&available(CHROME_DESKTOP));
        assert!(report.is_chrome);
        assert!(!report.is_safari);
        assert!(!report.is_edge);
        assert_eq!(report.device, DeviceClass::Desktop);
        assert!(report.is_supported);
        assert_eq!(report.recommended_browser, None);
        assert_eq!(report.browser_name(), "Chrome");
    }

    #[test]
    fn test_edge_is_not_chrome() {
        let report = CompatibilityReport::inspect(&available(EDGE_DESKTOP));
        assert!(report.is_edge);
        assert!(!report.is_chrome);
        assert_eq!(report.browser_name(), "Edge");
    }

    #[test]
    fn test_firefox_without_speech_recommends_browser() {
        let report = CompatibilityReport::inspect(&PlatformProvider::absent(Environment::new(
            FIREFOX_DESKTOP,
        )));
        assert!(report.is_firefox);
        assert!(!report.is_supported);
        assert_eq!(report.api_name, None);
        assert_eq!(report.recommended_browser.as_deref(), Some(RECOMMENDED_BROWSER));
    }

    #[test]
    fn test_iphone_safari_is_mobile() {
        let report = CompatibilityReport::inspect(&available(SAFARI_IPHONE));
        assert!(report.is_safari);
        assert!(report.is_mobile());
    }

    #[test]
    fn test_unknown_api_name_is_unsupported() {
        let provider = PlatformProvider::available(
            Arc::new(ScriptedCapability::with_api_name("mozSpeechRecognition")),
            Environment::new(FIREFOX_DESKTOP),
        );
        let report = CompatibilityReport::inspect(&provider);
        assert!(!report.is_supported);
        assert_eq!(report.api_name.as_deref(), Some("mozSpeechRecognition"));
        assert!(report.recommended_browser.is_some());
    }

    #[test]
    fn test_debug_info_with_absent_platform() {
        let engine = SpeechEngine::new(
            PlatformProvider::absent(Environment::default()),
            Default::default(),
        );

        let info = DebugInfo::capture(&engine);
        assert!(!info.is_supported);
        assert_eq!(info.browser, "Unknown");
        assert_eq!(info.current_language, "en-US");
        assert_eq!(info.status, SessionStatus::Idle);

        let json = info.to_json().unwrap();
        assert!(json.contains("\"status\": \"idle\""));
        assert!(json.contains("\"last_error\": null"));
    }
}
