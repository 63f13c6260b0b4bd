use crate::diagnostics::{CompatibilityReport, DebugInfo};
use crate::language::Language;
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::platform::{PlatformProvider, RecognizerSettings};
use crate::recognition::{Configure, EngineEvent, SpeechEngine};
use std::sync::Arc;
use tracing::{debug, warn};

type ResultCallback = Box<dyn FnMut(String) + Send>;
type LanguageCallback = Box<dyn FnMut(&str) + Send>;

/// Caller configuration for a voice search input
pub struct VoiceSearchOptions {
    /// Receives each finalized utterance, exactly once per utterance
    pub on_result: ResultCallback,

    /// Receives the session language whenever an utterance is finalized
    pub on_language_detected: Option<LanguageCallback>,

    /// Initial language; the settings default is used when unset
    pub language: Option<String>,

    pub settings: RecognizerSettings,
}

impl VoiceSearchOptions {
    pub fn new(on_result: impl FnMut(String) + Send + 'static) -> Self {
        Self {
            on_result: Box::new(on_result),
            on_language_detected: None,
            language: None,
            settings: RecognizerSettings::default(),
        }
    }

    pub fn language(mut self, code: impl Into<String>) -> Self {
        self.language = Some(code.into());
        self
    }

    pub fn settings(mut self, settings: RecognizerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn on_language_detected(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_language_detected = Some(Box::new(callback));
        self
    }
}

/// Voice input bound to one search field
///
/// Callbacks are captured once at construction. Only a language change
/// reconfigures the engine, so an in-progress capture is never torn down by
/// unrelated updates of the owning view.
pub struct VoiceSearch {
    engine: SpeechEngine,
    on_result: ResultCallback,
    on_language_detected: Option<LanguageCallback>,
    notifier: Arc<dyn Notifier>,
}

impl VoiceSearch {
    pub fn new(provider: PlatformProvider, options: VoiceSearchOptions) -> Self {
        let VoiceSearchOptions {
            on_result,
            on_language_detected,
            language,
            mut settings,
        } = options;

        if let Some(code) = language {
            settings.lang = code;
        }

        Self {
            engine: SpeechEngine::new(provider, settings),
            on_result,
            on_language_detected,
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn is_listening(&self) -> bool {
        self.engine.is_listening()
    }

    pub fn is_supported(&self) -> bool {
        self.engine.is_supported()
    }

    /// Live transcript of the utterance in progress
    pub fn transcript(&self) -> &str {
        self.engine.live_transcript()
    }

    pub fn current_language(&self) -> &'static Language {
        self.engine.language()
    }

    /// Start or stop capturing, returning the events dispatched right away
    pub fn toggle_listening(&mut self) -> Vec<EngineEvent> {
        if !self.engine.is_supported() {
            warn!("Voice search toggled on a platform without speech recognition");
            return Vec::new();
        }

        self.engine.toggle();
        self.process_events()
    }

    /// Change the recognition language. Same-language requests are ignored.
    pub fn change_language(&mut self, code: &str) -> Configure {
        let outcome = self.engine.configure(code);

        match outcome {
            Configure::Applied => self.notifier.notify(Notice::info(
                "Language changed",
                format!("Voice search now listens in {}", self.engine.language().name),
            )),
            Configure::Queued => {
                if let Some(pending) = self.engine.pending_language() {
                    self.notifier.notify(Notice::info(
                        "Language changed",
                        format!("{} will be used for the next search", pending.name),
                    ));
                }
            }
            Configure::Unchanged => {}
        }

        outcome
    }

    pub fn get_browser_compatibility(&self) -> CompatibilityReport {
        CompatibilityReport::inspect(self.engine.provider())
    }

    pub fn get_debug_info(&self) -> DebugInfo {
        DebugInfo::capture(&self.engine)
    }

    /// Persistent notice for hosts that cannot do voice search at all
    pub fn inline_notice(&self) -> Option<String> {
        let report = self.get_browser_compatibility();
        report.recommended_browser.map(|recommendation| {
            format!("Voice search is not supported in this browser. {}.", recommendation)
        })
    }

    /// Dispatch every engine event already available
    pub fn process_events(&mut self) -> Vec<EngineEvent> {
        let events = self.engine.pump();
        self.dispatch(&events);
        events
    }

    /// Wait for engine activity and dispatch it.
    /// Returns `None` when the engine has no event source.
    pub async fn wait_for_events(&mut self) -> Option<Vec<EngineEvent>> {
        let events = self.engine.next_events().await?;
        self.dispatch(&events);
        Some(events)
    }

    pub fn engine(&self) -> &SpeechEngine {
        &self.engine
    }

    /// Request a capture without dispatching. Events wait for `process_events`.
    pub fn start_listening(&mut self) {
        self.engine.start();
    }

    /// Request a stop without dispatching. Events wait for `process_events`.
    pub fn stop_listening(&mut self) {
        self.engine.stop();
    }

    fn dispatch(&mut self, events: &[EngineEvent]) {
        for event in events {
            match event {
                EngineEvent::Started => self.notifier.notify(Notice::info(
                    "Voice Search Started",
                    format!("Listening in {}", self.engine.language().name),
                )),
                EngineEvent::PartialResult(text) => debug!("Live transcript: {:?}", text),
                EngineEvent::FinalResult { text, language } => {
                    (self.on_result)(text.clone());
                    if let Some(callback) = self.on_language_detected.as_mut() {
                        callback(language);
                    }
                }
                EngineEvent::Error(err) => self.notifier.notify(Notice::error(
                    format!("Voice Search Error: {}", err.kind),
                    err.user_message(),
                )),
                EngineEvent::Ended => debug!("Voice search ended without a result"),
            }
        }
    }
}
