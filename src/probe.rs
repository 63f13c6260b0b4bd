//! Test capture with a wall-clock limit
//!
//! The platform may listen indefinitely, so the probe enforces its own
//! deadline. At the deadline it re-reads the engine status and stops the
//! session only if it is still listening at that moment.

use crate::input::VoiceSearch;
use crate::recognition::{EngineEvent, RecognitionError};
use serde::Serialize;
use std::time::Duration;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{info, warn};

/// How long to wait for the platform to confirm a timed-out stop
const STOP_GRACE: Duration = Duration::from_secs(2);

/// Result of a test capture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// Every live transcript update, in order
    pub partials: Vec<String>,
    pub final_text: Option<String>,
    pub error: Option<RecognitionError>,

    /// The deadline passed while still listening and the probe stopped it
    pub timed_out: bool,
}

impl ProbeOutcome {
    fn record(&mut self, events: &[EngineEvent]) {
        for event in events {
            match event {
                EngineEvent::PartialResult(text) => self.partials.push(text.clone()),
                EngineEvent::FinalResult { text, .. } => self.final_text = Some(text.clone()),
                EngineEvent::Error(err) => self.error = Some(err.clone()),
                EngineEvent::Started | EngineEvent::Ended => {}
            }
        }
    }
}

/// Start a capture and run it until it finishes or `limit` elapses
pub async fn run_test_capture(voice: &mut VoiceSearch, limit: Duration) -> ProbeOutcome {
    let mut outcome = ProbeOutcome::default();

    if voice.is_listening() {
        warn!("Test capture requested while already listening");
        return outcome;
    }

    info!("Running test capture for up to {:?}", limit);

    let deadline = Instant::now() + limit;
    outcome.record(&voice.toggle_listening());

    while voice.is_listening() {
        match timeout_at(deadline, voice.wait_for_events()).await {
            Ok(Some(events)) => outcome.record(&events),
            Ok(None) => break,
            Err(_) => {
                // Status read at fire time, not when the deadline was set
                if voice.is_listening() {
                    info!("Test capture hit its {:?} limit, stopping", limit);
                    outcome.timed_out = true;
                    outcome.record(&voice.toggle_listening());
                    drain_until_idle(voice, &mut outcome).await;
                }
                break;
            }
        }
    }

    outcome
}

async fn drain_until_idle(voice: &mut VoiceSearch, outcome: &mut ProbeOutcome) {
    let drained = timeout(STOP_GRACE, async {
        while voice.is_listening() {
            match voice.wait_for_events().await {
                Some(events) => outcome.record(&events),
                None => break,
            }
        }
    })
    .await;

    if drained.is_err() {
        warn!("Platform did not confirm stop within {:?}", STOP_GRACE);
    }
}
