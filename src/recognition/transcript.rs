use crate::platform::ResultSegment;

/// Outcome of folding one platform result event into the utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    /// Text to show while listening
    pub display: String,

    /// Set once the utterance has non-empty final text
    pub finalized: Option<String>,
}

/// Merges interim and final segments for a single utterance
///
/// Final segments accumulate in emission order. Interim segments are
/// revisions of the same utterance, so the interim buffer is replaced on
/// every event rather than appended to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptReducer {
    final_transcript: String,
    interim_transcript: String,
}

impl TranscriptReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the segments of one result event
    pub fn apply(&mut self, segments: &[ResultSegment]) -> Reduction {
        self.interim_transcript.clear();
        let mut confident = false;

        for segment in segments {
            if segment.is_final {
                self.final_transcript.push_str(&segment.text);
                confident |= !segment.text.trim().is_empty();
            } else {
                self.interim_transcript.push_str(&segment.text);
            }
        }

        Reduction {
            display: self.display().to_string(),
            finalized: confident.then(|| self.final_transcript.trim().to_string()),
        }
    }

    /// Accumulated final text if any, else the latest interim text
    pub fn display(&self) -> &str {
        if self.final_transcript.is_empty() {
            &self.interim_transcript
        } else {
            &self.final_transcript
        }
    }

    pub fn final_transcript(&self) -> &str {
        &self.final_transcript
    }

    pub fn interim_transcript(&self) -> &str {
        &self.interim_transcript
    }

    pub fn reset(&mut self) {
        self.final_transcript.clear();
        self.interim_transcript.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interim_is_replaced_not_appended() {
        let mut reducer = TranscriptReducer::new();

        let first = reducer.apply(&[ResultSegment::interim("cem")]);
        assert_eq!(first.display, "cem");
        assert_eq!(first.finalized, None);

        let second = reducer.apply(&[ResultSegment::interim("cement")]);
        assert_eq!(second.display, "cement");
        assert_eq!(reducer.interim_transcript(), "cement");
    }

    #[test]
    fn test_display_prefers_final_over_empty_interim() {
        let mut reducer = TranscriptReducer::new();

        let reduction = reducer.apply(&[ResultSegment::final_text("cement bags")]);
        assert_eq!(reduction.display, "cement bags");
        assert_eq!(reduction.finalized.as_deref(), Some("cement bags"));
        assert_eq!(reducer.interim_transcript(), "");
    }

    #[test]
    fn test_final_segments_concatenate_in_order() {
        let mut reducer = TranscriptReducer::new();

        let reduction = reducer.apply(&[
            ResultSegment::final_text("steel"),
            ResultSegment::final_text(" bars"),
            ResultSegment::interim(" twelve"),
        ]);

        assert_eq!(reduction.display, "steel bars");
        assert_eq!(reduction.finalized.as_deref(), Some("steel bars"));
        assert_eq!(reducer.interim_transcript(), " twelve");
    }

    #[test]
    fn test_blank_final_does_not_finalize() {
        let mut reducer = TranscriptReducer::new();

        let reduction = reducer.apply(&[
            ResultSegment::final_text(" "),
            ResultSegment::interim("sand"),
        ]);

        assert_eq!(reduction.finalized, None);
    }

    #[test]
    fn test_finalized_text_is_trimmed() {
        let mut reducer = TranscriptReducer::new();
        let reduction = reducer.apply(&[ResultSegment::final_text(" quantity cement ")]);
        assert_eq!(reduction.finalized.as_deref(), Some("quantity cement"));
    }

    #[test]
    fn test_reset_clears_both_buffers() {
        let mut reducer = TranscriptReducer::new();
        reducer.apply(&[ResultSegment::final_text("a"), ResultSegment::interim("b")]);
        reducer.reset();
        assert_eq!(reducer.display(), "");
        assert_eq!(reducer, TranscriptReducer::default());
    }
}
