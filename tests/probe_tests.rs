// Integration tests for time-limited test captures

use std::sync::Arc;
use std::time::Duration;
use voice_search::{
    run_test_capture, Environment, ErrorKind, PlatformEvent, PlatformProvider, ResultSegment,
    Script, ScriptedCapability, SessionStatus, VoiceSearch, VoiceSearchOptions,
};

fn voice_with(capability: &ScriptedCapability) -> VoiceSearch {
    VoiceSearch::new(
        PlatformProvider::available(Arc::new(capability.clone()), Environment::default()),
        VoiceSearchOptions::new(|_| {}),
    )
}

#[tokio::test]
async fn test_capture_completes_before_limit() {
    let capability = ScriptedCapability::new();
    capability.push_utterance("quantity cement");
    let mut voice = voice_with(&capability);

    let outcome = run_test_capture(&mut voice, Duration::from_secs(1)).await;

    assert_eq!(outcome.final_text.as_deref(), Some("quantity cement"));
    assert_eq!(outcome.partials, vec!["quantity".to_string()]);
    assert!(!outcome.timed_out);
    assert_eq!(voice.engine().status(), SessionStatus::Idle);
}

#[tokio::test]
async fn test_silent_capture_is_stopped_at_limit() {
    let capability = ScriptedCapability::new();
    capability.push_script(Script::Hold);
    let mut voice = voice_with(&capability);

    let outcome = run_test_capture(&mut voice, Duration::from_millis(50)).await;

    assert!(outcome.timed_out);
    assert_eq!(outcome.final_text, None);
    assert!(!voice.is_listening());
    assert_eq!(capability.calls().stops, 1);
}

#[tokio::test]
async fn test_delayed_final_is_awaited() {
    let capability = ScriptedCapability::new();
    let mut voice = voice_with(&capability);

    let platform = capability.clone();
    let speaker = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        platform.emit(PlatformEvent::Result(vec![ResultSegment::interim("tmt")]));
        platform.emit(PlatformEvent::Result(vec![ResultSegment::final_text("tmt bars")]));
    });

    let outcome = run_test_capture(&mut voice, Duration::from_secs(2)).await;
    speaker.await.unwrap();

    assert_eq!(outcome.final_text.as_deref(), Some("tmt bars"));
    assert_eq!(outcome.partials, vec!["tmt".to_string()]);
    assert!(!outcome.timed_out);
    assert_eq!(capability.calls().stops, 0);
}

#[tokio::test]
async fn test_error_ends_capture_without_timeout() {
    let capability = ScriptedCapability::new();
    capability.push_script(Script::Events(vec![
        PlatformEvent::Error {
            code: "network".to_string(),
            message: None,
        },
        PlatformEvent::End,
    ]));
    let mut voice = voice_with(&capability);

    let outcome = run_test_capture(&mut voice, Duration::from_secs(1)).await;

    assert!(!outcome.timed_out);
    assert_eq!(outcome.error.map(|e| e.kind), Some(ErrorKind::Network));
    assert_eq!(outcome.final_text, None);
    assert_eq!(voice.engine().status(), SessionStatus::Idle);
}

#[tokio::test]
async fn test_unsupported_platform_returns_immediately() {
    let mut voice = VoiceSearch::new(
        PlatformProvider::absent(Environment::default()),
        VoiceSearchOptions::new(|_| {}),
    );

    let outcome = run_test_capture(&mut voice, Duration::from_secs(30)).await;

    assert_eq!(outcome, Default::default());
}
