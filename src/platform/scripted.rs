//! Deterministic in-process speech capability
//!
//! Each `start()` on a scripted recognizer consumes the next queued
//! [`Script`]. Used by the `simulate` command and by tests.

use super::capability::{PlatformEvent, Recognizer, RecognizerSettings, SpeechCapability};
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::debug;

/// What a recognizer does on its next `start()`
#[derive(Debug, Clone)]
pub enum Script {
    /// Emit `Start`, then these events in order
    Events(Vec<PlatformEvent>),
    /// Fail `start()` synchronously with this message
    Throw(String),
    /// Emit `Start` and keep listening until stopped or fed via `emit`
    Hold,
}

/// Calls observed by the scripted capability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedCalls {
    /// Locale of every recognizer built, in order
    pub built: Vec<String>,
    pub starts: usize,
    pub stops: usize,
    pub aborts: usize,
}

#[derive(Default)]
struct ScriptState {
    scripts: VecDeque<Script>,
    calls: ScriptedCalls,
    /// Event channel of every recognizer built, in build order
    senders: Vec<mpsc::UnboundedSender<PlatformEvent>>,
}

/// Speech capability driven by queued scripts
#[derive(Clone)]
pub struct ScriptedCapability {
    api_name: String,
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedCapability {
    /// Capability exposed under the standard API name
    pub fn new() -> Self {
        Self::with_api_name("SpeechRecognition")
    }

    pub fn with_api_name(api_name: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            state: Arc::default(),
        }
    }

    /// Queue the behavior of the next `start()`
    pub fn push_script(&self, script: Script) {
        lock(&self.state).scripts.push_back(script);
    }

    /// Queue an utterance: cumulative interim words, then the full text as final
    pub fn push_utterance(&self, text: &str) {
        use super::capability::ResultSegment;

        let words: Vec<&str> = text.split_whitespace().collect();
        let mut events: Vec<PlatformEvent> = (1..words.len())
            .map(|n| PlatformEvent::Result(vec![ResultSegment::interim(words[..n].join(" "))]))
            .collect();
        events.push(PlatformEvent::Result(vec![ResultSegment::final_text(text)]));
        events.push(PlatformEvent::End);

        self.push_script(Script::Events(events));
    }

    /// Push an event through the latest recognizer, as the host would.
    /// Returns false when no recognizer is listening on the channel.
    pub fn emit(&self, event: PlatformEvent) -> bool {
        match lock(&self.state).senders.last() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Push an event through the recognizer built `index`-th (0 = first).
    /// Returns false once the engine has released that recognizer.
    pub fn emit_on(&self, index: usize, event: PlatformEvent) -> bool {
        match lock(&self.state).senders.get(index) {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Snapshot of the calls made so far
    pub fn calls(&self) -> ScriptedCalls {
        lock(&self.state).calls.clone()
    }
}

impl Default for ScriptedCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechCapability for ScriptedCapability {
    fn api_name(&self) -> &str {
        &self.api_name
    }

    fn create_recognizer(
        &self,
        settings: &RecognizerSettings,
        events: mpsc::UnboundedSender<PlatformEvent>,
    ) -> Result<Box<dyn Recognizer>> {
        {
            let mut state = lock(&self.state);
            state.calls.built.push(settings.lang.clone());
            state.senders.push(events.clone());
        }

        debug!("Built scripted recognizer for {}", settings.lang);

        Ok(Box::new(ScriptedRecognizer {
            lang: settings.lang.clone(),
            state: Arc::clone(&self.state),
            events,
            active: false,
        }))
    }
}

struct ScriptedRecognizer {
    lang: String,
    state: Arc<Mutex<ScriptState>>,
    events: mpsc::UnboundedSender<PlatformEvent>,
    active: bool,
}

impl ScriptedRecognizer {
    fn send(&self, event: PlatformEvent) {
        // Receiver is gone once the engine has released this recognizer
        let _ = self.events.send(event);
    }
}

impl Recognizer for ScriptedRecognizer {
    fn start(&mut self) -> Result<()> {
        let script = {
            let mut state = lock(&self.state);
            state.calls.starts += 1;
            state.scripts.pop_front().unwrap_or(Script::Hold)
        };

        match script {
            Script::Throw(message) => anyhow::bail!(message),
            Script::Hold => {
                self.active = true;
                self.send(PlatformEvent::Start);
            }
            Script::Events(events) => {
                self.active = events.last() != Some(&PlatformEvent::End);
                self.send(PlatformEvent::Start);
                for event in events {
                    self.send(event);
                }
            }
        }

        Ok(())
    }

    fn stop(&mut self) {
        lock(&self.state).calls.stops += 1;
        if self.active {
            self.active = false;
            self.send(PlatformEvent::End);
        }
    }

    fn abort(&mut self) {
        lock(&self.state).calls.aborts += 1;
        if self.active {
            self.active = false;
            self.send(PlatformEvent::Error {
                code: "aborted".to_string(),
                message: None,
            });
            self.send(PlatformEvent::End);
        }
    }

    fn lang(&self) -> &str {
        &self.lang
    }
}

fn lock(state: &Mutex<ScriptState>) -> MutexGuard<'_, ScriptState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
