use super::error::RecognitionError;
use super::transcript::TranscriptReducer;
use crate::language::{self, Language};
use crate::platform::{PlatformEvent, PlatformProvider, Recognizer, RecognizerSettings};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Lifecycle of the capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Listening,
    /// Platform reported an error and has not yet confirmed the end
    Erroring,
}

/// Events the engine hands to its consumer, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Platform confirmed audio capture began
    Started,
    /// Best-guess text for the utterance so far
    PartialResult(String),
    /// Finalized utterance. At most once per session.
    FinalResult { text: String, language: &'static str },
    /// Session failed; no final result follows
    Error(RecognitionError),
    /// Session ended without a final result
    Ended,
}

/// Outcome of a language change request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configure {
    /// Recognizer rebuilt for the new language
    Applied,
    /// Capture in progress; the change applies once the session is idle
    Queued,
    /// Language already active
    Unchanged,
}

/// Speech capture engine owning one platform recognizer
///
/// All operations only issue requests and return immediately. Platform
/// events are folded in by [`SpeechEngine::pump`] or
/// [`SpeechEngine::next_events`], which return the resulting
/// [`EngineEvent`]s.
pub struct SpeechEngine {
    provider: PlatformProvider,

    /// Settings for the next recognizer build; `lang` tracks `language`
    settings: RecognizerSettings,

    language: &'static Language,

    /// Language change requested while listening
    pending_language: Option<&'static Language>,

    recognizer: Option<Box<dyn Recognizer>>,

    /// Event subscription of the current recognizer
    events: Option<mpsc::UnboundedReceiver<PlatformEvent>>,

    status: SessionStatus,
    reducer: TranscriptReducer,
    live_transcript: String,
    last_error: Option<RecognitionError>,

    /// ID of the current or most recent session, for log correlation
    session_id: Option<Uuid>,

    stop_requested: bool,

    /// Last run finalized but its recognizer has not confirmed the end yet
    awaiting_end: bool,

    /// Engine events not yet handed to the consumer
    outbox: VecDeque<EngineEvent>,
}

impl SpeechEngine {
    /// Create an engine and build its recognizer for `settings.lang`
    pub fn new(provider: PlatformProvider, settings: RecognizerSettings) -> Self {
        let language = resolve(&settings.lang);

        let mut engine = Self {
            provider,
            settings: RecognizerSettings {
                lang: language.code.to_string(),
                ..settings
            },
            language,
            pending_language: None,
            recognizer: None,
            events: None,
            status: SessionStatus::Idle,
            reducer: TranscriptReducer::new(),
            live_transcript: String::new(),
            last_error: None,
            session_id: None,
            stop_requested: false,
            awaiting_end: false,
            outbox: VecDeque::new(),
        };

        if let Err(e) = engine.rebuild() {
            error!("Failed to build recognizer: {:#}", e);
        }

        engine
    }

    /// Switch the recognition language
    ///
    /// Rebuilds the recognizer when idle. While listening the change is
    /// queued and applied as soon as the session ends.
    pub fn configure(&mut self, code: &str) -> Configure {
        let language = resolve(code);

        if self.status == SessionStatus::Listening {
            self.pending_language = (language != self.language).then_some(language);
            return match self.pending_language {
                Some(pending) => {
                    info!("Capture in progress, queueing language change to {}", pending.code);
                    Configure::Queued
                }
                None => Configure::Unchanged,
            };
        }

        let built = self.recognizer.is_some() || !self.provider.is_supported();
        if language == self.language && built {
            return Configure::Unchanged;
        }

        self.set_language(language);
        Configure::Applied
    }

    /// Begin capturing. No-op while listening or when unsupported.
    pub fn start(&mut self) {
        if self.status == SessionStatus::Listening {
            debug!("Already listening, ignoring start");
            return;
        }

        if !self.provider.is_supported() {
            warn!("Speech recognition is not supported here, ignoring start");
            return;
        }

        // A finished or erroring recognizer may still emit its end event; drop it
        if self.recognizer.is_none()
            || self.status == SessionStatus::Erroring
            || self.awaiting_end
        {
            if let Err(e) = self.rebuild() {
                self.fail_start(e);
                return;
            }
        }

        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);
        self.reducer.reset();
        self.live_transcript.clear();
        self.last_error = None;
        self.stop_requested = false;
        self.status = SessionStatus::Listening;

        info!("Starting capture session {} ({})", session_id, self.language.code);

        let started = match self.recognizer.as_mut() {
            Some(recognizer) => recognizer.start(),
            None => Err(anyhow::anyhow!("No recognizer available")),
        };

        if let Err(e) = started {
            self.fail_start(e);
        }
    }

    /// Request the platform to stop. The session ends once it confirms.
    pub fn stop(&mut self) {
        if self.status != SessionStatus::Listening {
            debug!("Not listening, ignoring stop");
            return;
        }

        if self.stop_requested {
            return;
        }

        self.stop_requested = true;
        info!("Stop requested for session {}", self.session_label());

        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
    }

    pub fn toggle(&mut self) {
        if self.status == SessionStatus::Listening {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Fold every platform event already delivered, without waiting
    pub fn pump(&mut self) -> Vec<EngineEvent> {
        while let Some(event) = self.events.as_mut().and_then(|rx| rx.try_recv().ok()) {
            self.handle(event);
        }

        self.outbox.drain(..).collect()
    }

    /// Wait for the next platform event, then fold everything pending.
    ///
    /// Returns `None` when there is no event source left to wait on.
    pub async fn next_events(&mut self) -> Option<Vec<EngineEvent>> {
        if self.outbox.is_empty() {
            let event = self.events.as_mut()?.recv().await?;
            self.handle(event);
        }

        Some(self.pump())
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_listening(&self) -> bool {
        self.status == SessionStatus::Listening
    }

    pub fn is_supported(&self) -> bool {
        self.provider.is_supported()
    }

    /// In-progress text for the current utterance; empty when not listening
    pub fn live_transcript(&self) -> &str {
        &self.live_transcript
    }

    pub fn language(&self) -> &'static Language {
        self.language
    }

    pub fn pending_language(&self) -> Option<&'static Language> {
        self.pending_language
    }

    pub fn last_error(&self) -> Option<&RecognitionError> {
        self.last_error.as_ref()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn provider(&self) -> &PlatformProvider {
        &self.provider
    }

    pub fn settings(&self) -> &RecognizerSettings {
        &self.settings
    }

    fn handle(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::Start => {
                if self.status == SessionStatus::Listening {
                    debug!("Platform confirmed capture for session {}", self.session_label());
                    self.outbox.push_back(EngineEvent::Started);
                }
            }

            PlatformEvent::Result(segments) => {
                if self.status != SessionStatus::Listening {
                    debug!("Dropping result outside an active session");
                    return;
                }

                let reduction = self.reducer.apply(&segments);

                match reduction.finalized {
                    Some(text) => {
                        info!("Session {} finalized: {:?}", self.session_label(), text);

                        if self.settings.continuous && !self.stop_requested {
                            if let Some(recognizer) = self.recognizer.as_mut() {
                                recognizer.stop();
                            }
                        }

                        self.outbox.push_back(EngineEvent::FinalResult {
                            text,
                            language: self.language.code,
                        });
                        self.awaiting_end = true;
                        self.finish();
                    }
                    None => {
                        self.live_transcript = reduction.display;
                        self.outbox
                            .push_back(EngineEvent::PartialResult(self.live_transcript.clone()));
                    }
                }
            }

            PlatformEvent::Error { code, message } => {
                if self.status != SessionStatus::Listening {
                    debug!("Ignoring platform error {} outside an active session", code);
                    return;
                }

                let error = RecognitionError::from_platform(&code, message);
                warn!("Session {} failed: {}", self.session_label(), error);

                self.status = SessionStatus::Erroring;
                self.reducer.reset();
                self.live_transcript.clear();
                self.last_error = Some(error.clone());
                self.outbox.push_back(EngineEvent::Error(error));
            }

            PlatformEvent::End => match self.status {
                SessionStatus::Listening => {
                    info!("Session {} ended without a final result", self.session_label());
                    self.outbox.push_back(EngineEvent::Ended);
                    self.finish();
                }
                SessionStatus::Erroring => {
                    debug!("Session {} ended after error", self.session_label());
                    self.outbox.push_back(EngineEvent::Ended);
                    self.finish();
                }
                SessionStatus::Idle => {
                    self.awaiting_end = false;
                }
            },
        }
    }

    /// Return to idle and apply any queued language change
    fn finish(&mut self) {
        self.status = SessionStatus::Idle;
        self.reducer.reset();
        self.live_transcript.clear();
        self.stop_requested = false;

        if let Some(language) = self.pending_language.take() {
            self.set_language(language);
        }
    }

    fn fail_start(&mut self, err: anyhow::Error) {
        let error = RecognitionError::from_start_failure(&err);
        warn!("Failed to start capture: {:#}", err);

        self.status = SessionStatus::Idle;
        self.last_error = Some(error.clone());
        self.outbox.push_back(EngineEvent::Error(error));

        if let Some(language) = self.pending_language.take() {
            self.set_language(language);
        }
    }

    fn set_language(&mut self, language: &'static Language) {
        info!("Switching recognition language {} -> {}", self.language.code, language.code);
        self.language = language;
        self.settings.lang = language.code.to_string();

        if let Err(e) = self.rebuild() {
            error!("Failed to rebuild recognizer: {:#}", e);
        }
    }

    /// Release the current recognizer and build one for `settings`
    fn rebuild(&mut self) -> Result<()> {
        // Drop the subscription first so late events from the old recognizer are never seen
        self.events = None;
        self.awaiting_end = false;

        // Its end event can no longer arrive to close an erroring session
        if self.status == SessionStatus::Erroring {
            debug!("Releasing erroring recognizer, session {} is idle", self.session_label());
            self.status = SessionStatus::Idle;
        }

        if let Some(mut old) = self.recognizer.take() {
            debug!("Releasing recognizer for {}", old.lang());
            old.abort();
        }

        if !self.provider.is_supported() {
            return Ok(());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let recognizer = self
            .provider
            .create_recognizer(&self.settings, tx)
            .with_context(|| format!("Failed to create recognizer for {}", self.settings.lang))?;

        debug!("Built recognizer for {}", recognizer.lang());

        self.recognizer = Some(recognizer);
        self.events = Some(rx);

        Ok(())
    }

    fn session_label(&self) -> String {
        self.session_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

impl Drop for SpeechEngine {
    fn drop(&mut self) {
        if self.status == SessionStatus::Listening {
            if let Some(recognizer) = self.recognizer.as_mut() {
                recognizer.abort();
            }
        }
    }
}

fn resolve(code: &str) -> &'static Language {
    let language = language::find_by_code(code);
    if language.code != code {
        warn!("Unregistered language {}, falling back to {}", code, language.code);
    }
    language
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Environment, ResultSegment, Script, ScriptedCapability};
    use crate::recognition::ErrorKind;
    use std::sync::Arc;

    fn engine_with(cap: &ScriptedCapability, lang: &str) -> SpeechEngine {
        let provider = PlatformProvider::available(Arc::new(cap.clone()), Environment::default());
        SpeechEngine::new(
            provider,
            RecognizerSettings {
                lang: lang.to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_start_while_listening_is_noop() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        engine.start();
        engine.start();

        assert!(engine.is_listening());
        assert_eq!(cap.calls().starts, 1);
        assert_eq!(cap.calls().built.len(), 1);
        assert_eq!(engine.pump(), vec![EngineEvent::Started]);
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        engine.stop();

        assert_eq!(engine.status(), SessionStatus::Idle);
        assert_eq!(cap.calls().stops, 0);
        assert!(engine.pump().is_empty());
    }

    #[test]
    fn test_partial_updates_live_transcript() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        engine.start();
        cap.emit(PlatformEvent::Result(vec![ResultSegment::interim("cement")]));

        let events = engine.pump();
        assert_eq!(
            events,
            vec![EngineEvent::Started, EngineEvent::PartialResult("cement".to_string())]
        );
        assert_eq!(engine.live_transcript(), "cement");
        assert!(engine.is_listening());
    }

    #[test]
    fn test_results_after_final_are_dropped() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        engine.start();
        cap.emit(PlatformEvent::Result(vec![ResultSegment::final_text("sand")]));
        cap.emit(PlatformEvent::Result(vec![ResultSegment::final_text("sand again")]));

        let finals: Vec<_> = engine
            .pump()
            .into_iter()
            .filter(|e| matches!(e, EngineEvent::FinalResult { .. }))
            .collect();
        assert_eq!(
            finals,
            vec![EngineEvent::FinalResult {
                text: "sand".to_string(),
                language: "en-US",
            }]
        );
        assert_eq!(engine.status(), SessionStatus::Idle);
    }

    #[test]
    fn test_error_then_end_returns_to_idle() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        engine.start();
        cap.emit(PlatformEvent::Error {
            code: "network".to_string(),
            message: None,
        });
        engine.pump();
        assert_eq!(engine.status(), SessionStatus::Erroring);
        assert!(!engine.is_listening());

        cap.emit(PlatformEvent::End);
        assert_eq!(engine.pump(), vec![EngineEvent::Ended]);
        assert_eq!(engine.status(), SessionStatus::Idle);
        assert_eq!(engine.last_error().map(|e| e.kind), Some(ErrorKind::Network));
    }

    #[test]
    fn test_start_from_erroring_rebuilds_recognizer() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        engine.start();
        cap.emit(PlatformEvent::Error {
            code: "no-speech".to_string(),
            message: None,
        });
        engine.pump();

        engine.start();
        assert!(engine.is_listening());
        assert_eq!(cap.calls().built.len(), 2);
        assert!(engine.last_error().is_none());
    }

    #[test]
    fn test_restart_before_trailing_end_ignores_old_end() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        engine.start();
        cap.emit(PlatformEvent::Result(vec![ResultSegment::final_text("cement")]));
        engine.pump();
        assert_eq!(engine.status(), SessionStatus::Idle);

        // New search before the first run's end event arrives
        engine.start();
        assert_eq!(cap.calls().built.len(), 2);
        assert!(!cap.emit_on(0, PlatformEvent::End));
        engine.pump();
        assert!(engine.is_listening());

        cap.emit(PlatformEvent::Result(vec![ResultSegment::final_text("steel")]));
        let finals: Vec<_> = engine
            .pump()
            .into_iter()
            .filter(|e| matches!(e, EngineEvent::FinalResult { .. }))
            .collect();
        assert_eq!(
            finals,
            vec![EngineEvent::FinalResult {
                text: "steel".to_string(),
                language: "en-US",
            }]
        );
    }

    #[test]
    fn test_restart_after_confirmed_end_reuses_recognizer() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        engine.start();
        cap.emit(PlatformEvent::Result(vec![ResultSegment::final_text("cement")]));
        cap.emit(PlatformEvent::End);
        engine.pump();

        engine.start();
        assert!(engine.is_listening());
        assert_eq!(cap.calls().built.len(), 1);
    }

    #[test]
    fn test_configure_while_erroring_returns_to_idle() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        engine.start();
        cap.emit(PlatformEvent::Error {
            code: "network".to_string(),
            message: None,
        });
        engine.pump();
        assert_eq!(engine.status(), SessionStatus::Erroring);

        assert_eq!(engine.configure("fr-FR"), Configure::Applied);
        engine.pump();

        assert_eq!(engine.status(), SessionStatus::Idle);
        assert_eq!(engine.last_error().map(|e| e.kind), Some(ErrorKind::Network));
        assert_eq!(engine.language().code, "fr-FR");
    }

    #[test]
    fn test_configure_same_language_does_not_rebuild() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        assert_eq!(engine.configure("en-US"), Configure::Unchanged);
        assert_eq!(engine.configure("fr-FR"), Configure::Applied);
        assert_eq!(cap.calls().built, vec!["en-US".to_string(), "fr-FR".to_string()]);
        assert_eq!(engine.settings().lang, "fr-FR");
    }

    #[test]
    fn test_configure_while_listening_is_queued() {
        let cap = ScriptedCapability::new();
        let mut engine = engine_with(&cap, "en-US");

        engine.start();
        assert_eq!(engine.configure("hi-IN"), Configure::Queued);
        assert_eq!(engine.language().code, "en-US");
        assert_eq!(cap.calls().built.len(), 1);

        engine.stop();
        engine.pump();

        assert_eq!(engine.language().code, "hi-IN");
        assert!(engine.pending_language().is_none());
        assert_eq!(cap.calls().built, vec!["en-US".to_string(), "hi-IN".to_string()]);
    }

    #[test]
    fn test_start_failure_becomes_error_event() {
        let cap = ScriptedCapability::new();
        cap.push_script(Script::Throw("InvalidStateError".to_string()));
        let mut engine = engine_with(&cap, "en-US");

        engine.start();

        assert_eq!(engine.status(), SessionStatus::Idle);
        let events = engine.pump();
        assert_eq!(events.len(), 1);
        match &events[0] {
            EngineEvent::Error(err) => {
                assert_eq!(err.kind, ErrorKind::Unknown);
                assert_eq!(err.message.as_deref(), Some("InvalidStateError"));
            }
            other => panic!("Expected error event, got {:?}", other),
        }
    }

    #[test]
    fn test_unregistered_language_falls_back() {
        let cap = ScriptedCapability::new();
        let engine = engine_with(&cap, "xx-YY");

        assert_eq!(engine.language().code, "en-US");
        assert_eq!(cap.calls().built, vec!["en-US".to_string()]);
    }
}
