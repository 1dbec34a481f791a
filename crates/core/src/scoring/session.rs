use thiserror::Error;

use crate::shared::audio_format::AudioFormat;

use super::domain::aligner::align;
use super::domain::reference_map::ReferenceMap;
use super::domain::segment::{Segment, SegmentRecord};
use super::domain::segment_tracker::{ClosingPolicy, SegmentTracker};
use super::domain::utterance::Utterance;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub format: AudioFormat,
    pub segment_seconds: f64,
    /// Audio-timeline offset of the first segment (the clip start).
    pub start_offset_sec: f64,
    pub references: ReferenceMap,
    pub closing_policy: ClosingPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::default(),
            segment_seconds: crate::shared::constants::DEFAULT_SEGMENT_SECONDS,
            start_offset_sec: 0.0,
            references: ReferenceMap::new(),
            closing_policy: ClosingPolicy::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionConfigError {
    #[error("segment duration must be positive, got {0}")]
    NonPositiveSegmentDuration(f64),
    #[error("audio format yields zero bytes per second")]
    DegenerateAudioFormat,
}

/// Drives the full segment lifecycle for one benchmark run: opens segments
/// as outgoing audio crosses duration thresholds, closes them as
/// transcription events arrive, and scores closed segments that have a
/// reference transcript.
///
/// Single-writer: the host must serialize `advance` and
/// `on_transcription_event` (one lock, or one event-loop turn). Everything
/// event-time degrades locally; only construction validates.
pub struct ScoringSession {
    tracker: SegmentTracker,
    references: ReferenceMap,
    segment_bytes: usize,
    accumulated_bytes: usize,
}

impl ScoringSession {
    pub fn new(config: SessionConfig) -> Result<Self, SessionConfigError> {
        if config.segment_seconds <= 0.0 {
            return Err(SessionConfigError::NonPositiveSegmentDuration(
                config.segment_seconds,
            ));
        }
        if config.format.bytes_per_second() == 0 {
            return Err(SessionConfigError::DegenerateAudioFormat);
        }

        let segment_bytes = config.format.bytes_for_duration(config.segment_seconds);
        Ok(Self {
            tracker: SegmentTracker::new(
                config.start_offset_sec,
                config.segment_seconds,
                config.closing_policy,
            ),
            references: config.references,
            segment_bytes,
            accumulated_bytes: 0,
        })
    }

    /// Account for one unit of outgoing audio. Opens a segment each time
    /// the accumulated byte count reaches the per-segment threshold, then
    /// resets the accumulator.
    pub fn advance(&mut self, bytes: usize) {
        self.accumulated_bytes += bytes;
        if self.accumulated_bytes >= self.segment_bytes {
            let id = self.tracker.open_segment(&self.references);
            log::debug!("opened segment {id}");
            self.accumulated_bytes = 0;
        }
    }

    /// Deliver the utterances parsed from one transcription event. Empty
    /// input is a no-op (malformed events parse to zero utterances).
    ///
    /// When a segment closes and carries a non-empty reference, the aligner
    /// runs and its result is stored on the segment. An empty reference
    /// leaves the alignment unset, which is distinct from a zero-error one.
    pub fn on_transcription_event(&mut self, utterances: &[Utterance]) {
        if utterances.is_empty() {
            return;
        }

        let (id, hypothesis) = match self.tracker.close_next_open(utterances) {
            Some(closed) => closed,
            None => {
                log::debug!("transcription event arrived with no open segment; dropped");
                return;
            }
        };

        let reference = self
            .tracker
            .segment(id)
            .map(|s| s.reference_text().to_string())
            .unwrap_or_default();
        if !reference.is_empty() {
            self.tracker
                .attach_alignment(id, align(&reference, &hypothesis));
        }
    }

    /// All segments in creation order. Segments still open retain empty
    /// hypothesis and alignment fields: no result arrived, which is not a
    /// scoring failure.
    pub fn finalize(self) -> Vec<Segment> {
        self.tracker.into_segments()
    }

    pub fn segments(&self) -> &[Segment] {
        self.tracker.segments()
    }

    pub fn records(&self) -> Vec<SegmentRecord> {
        self.tracker.segments().iter().map(SegmentRecord::from).collect()
    }

    pub fn open_count(&self) -> usize {
        self.tracker.open_count()
    }

    pub fn dropped_events(&self) -> u64 {
        self.tracker.dropped_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig {
            format: AudioFormat::new(16000, 1, 2),
            segment_seconds: 6.0,
            start_offset_sec: 0.0,
            references: ReferenceMap::new(),
            closing_policy: ClosingPolicy::NewestFirst,
        }
    }

    fn segment_bytes() -> usize {
        AudioFormat::new(16000, 1, 2).bytes_for_duration(6.0)
    }

    fn one_utterance(text: &str) -> Vec<Utterance> {
        vec![Utterance::new("0", text)]
    }

    #[test]
    fn test_rejects_non_positive_segment_duration() {
        for bad in [0.0, -1.0] {
            let result = ScoringSession::new(SessionConfig {
                segment_seconds: bad,
                ..config()
            });
            assert!(matches!(
                result,
                Err(SessionConfigError::NonPositiveSegmentDuration(_))
            ));
        }
    }

    #[test]
    fn test_rejects_degenerate_audio_format() {
        let result = ScoringSession::new(SessionConfig {
            format: AudioFormat::new(0, 0, 0),
            ..config()
        });
        assert!(matches!(
            result,
            Err(SessionConfigError::DegenerateAudioFormat)
        ));
    }

    #[test]
    fn test_advance_opens_segment_at_threshold() {
        let mut session = ScoringSession::new(config()).unwrap();
        session.advance(segment_bytes() - 1);
        assert!(session.segments().is_empty());
        session.advance(1);
        assert_eq!(session.segments().len(), 1);
    }

    #[test]
    fn test_advance_resets_accumulator_after_opening() {
        let mut session = ScoringSession::new(config()).unwrap();
        // One oversized buffer still only crosses the threshold once.
        session.advance(segment_bytes() * 2);
        assert_eq!(session.segments().len(), 1);
        // The remainder was discarded with the reset, so a full segment's
        // worth is needed again.
        session.advance(segment_bytes() - 1);
        assert_eq!(session.segments().len(), 1);
        session.advance(1);
        assert_eq!(session.segments().len(), 2);
    }

    #[test]
    fn test_empty_event_is_noop() {
        let mut session = ScoringSession::new(config()).unwrap();
        session.advance(segment_bytes());
        session.on_transcription_event(&[]);
        assert_eq!(session.open_count(), 1);
    }

    #[test]
    fn test_event_with_no_open_segment_is_dropped() {
        let mut session = ScoringSession::new(config()).unwrap();
        session.on_transcription_event(&one_utterance("too early"));
        assert!(session.segments().is_empty());
        assert_eq!(session.dropped_events(), 1);
    }

    #[test]
    fn test_alignment_computed_when_reference_present() {
        let mut references = ReferenceMap::new();
        references.insert(1, "the quick brown fox");
        let mut session = ScoringSession::new(SessionConfig {
            references,
            ..config()
        })
        .unwrap();

        session.advance(segment_bytes());
        session.on_transcription_event(&one_utterance("a quick red fox"));

        let segments = session.finalize();
        let alignment = segments[0].outcome().unwrap().alignment.unwrap();
        // Hypothesis includes the "0:" speaker prefix, which normalizes to
        // one extra token against the reference.
        assert_eq!(alignment.reference_words, 4);
        assert!(alignment.errors() >= 2);
    }

    #[test]
    fn test_missing_reference_leaves_alignment_unset() {
        let mut session = ScoringSession::new(config()).unwrap();
        session.advance(segment_bytes());
        session.on_transcription_event(&one_utterance("whatever"));

        let segments = session.finalize();
        let outcome = segments[0].outcome().unwrap();
        assert_eq!(outcome.hypothesis_text, "0: whatever");
        assert!(outcome.alignment.is_none());
    }

    #[test]
    fn test_three_segments_three_events_end_to_end() {
        let mut session = ScoringSession::new(config()).unwrap();
        for _ in 0..3 {
            session.advance(segment_bytes());
        }
        for text in ["first", "second", "third"] {
            session.on_transcription_event(&one_utterance(text));
        }

        let segments = session.finalize();
        assert_eq!(segments.len(), 3);
        for segment in &segments {
            assert!(!segment.is_open());
            assert!(segment.latency_ms().is_some());
        }
        // Newest-first policy: the first event lands on segment 3.
        assert_eq!(segments[2].outcome().unwrap().hypothesis_text, "0: first");
        assert_eq!(segments[0].outcome().unwrap().hypothesis_text, "0: third");
    }

    #[test]
    fn test_finalize_keeps_open_segments_unmeasured() {
        let mut session = ScoringSession::new(config()).unwrap();
        session.advance(segment_bytes());
        session.advance(segment_bytes());
        session.on_transcription_event(&one_utterance("only one result"));

        let segments = session.finalize();
        assert_eq!(segments.len(), 2);
        assert!(segments[0].is_open());
        assert!(!segments[1].is_open());
    }
}
