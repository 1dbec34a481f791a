/// One speaker-attributed span of recognized text from a single
/// transcription event. Transient: utterances are not retained, only their
/// formatted aggregate feeds a segment's hypothesis text.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub speaker_label: String,
    pub start_sec: f64,
    pub end_sec: f64,
    pub text: String,
}

impl Utterance {
    pub fn new(speaker_label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker_label: speaker_label.into(),
            start_sec: 0.0,
            end_sec: 0.0,
            text: text.into(),
        }
    }

    pub fn with_span(mut self, start_sec: f64, end_sec: f64) -> Self {
        self.start_sec = start_sec;
        self.end_sec = end_sec;
        self
    }

    /// Display form used when joining utterances into a hypothesis.
    pub fn labeled_text(&self) -> String {
        format!("{}: {}", self.speaker_label, self.text)
    }
}
