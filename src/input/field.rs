use super::voice::VoiceSearch;

/// Caller-owned text of a search input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchField {
    value: String,
}

impl SearchField {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    /// Stored value, untouched while a capture is in progress
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the stored value (typing, or accepting a finalized transcript)
    pub fn on_change(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// What the input should render: the live transcript while listening
    pub fn displayed<'a>(&'a self, voice: &'a VoiceSearch) -> &'a str {
        if voice.is_listening() {
            voice.transcript()
        } else {
            &self.value
        }
    }
}
