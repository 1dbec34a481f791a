use std::collections::VecDeque;

use super::aligner::Alignment;
use super::reference_map::ReferenceMap;
use super::segment::Segment;
use super::utterance::Utterance;

const HYPOTHESIS_SEPARATOR: &str = " | ";

/// Which open segment a transcription event closes when more than one is
/// open (burst of audio outran the provider).
///
/// `NewestFirst` reproduces the original benchmark's reverse-scan matching
/// and is the default; it can misassign results when events arrive in
/// chronological order. `OldestFirst` is true FIFO. Changing the policy
/// changes measured latency and WER, so it is an explicit switch rather
/// than a silent fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosingPolicy {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Ordered collection of scoring segments. Assigns each incoming
/// transcription event to one still-open segment and records timing.
///
/// Open segments are indexed by a deque of ids, so closing is O(1) for
/// either policy instead of a rescan of every segment.
#[derive(Debug)]
pub struct SegmentTracker {
    segments: Vec<Segment>,
    open_ids: VecDeque<u64>,
    policy: ClosingPolicy,
    next_offset_sec: f64,
    segment_seconds: f64,
    dropped_events: u64,
}

impl SegmentTracker {
    pub fn new(start_offset_sec: f64, segment_seconds: f64, policy: ClosingPolicy) -> Self {
        Self {
            segments: Vec::new(),
            open_ids: VecDeque::new(),
            policy,
            next_offset_sec: start_offset_sec,
            segment_seconds,
            dropped_events: 0,
        }
    }

    /// Append a new open segment with the next sequential id and the
    /// reference text for that id (empty when absent). Never fails.
    pub fn open_segment(&mut self, references: &ReferenceMap) -> u64 {
        let id = self.segments.len() as u64 + 1;
        let reference = references.lookup(id).to_string();
        self.segments
            .push(Segment::open(id, self.next_offset_sec, reference));
        self.open_ids.push_back(id);
        self.next_offset_sec += self.segment_seconds;
        id
    }

    /// Close the next open segment per the configured policy, recording the
    /// finalization timestamp, latency, and the joined hypothesis text.
    ///
    /// Returns the closed segment's id and hypothesis, or `None` when no
    /// segment is open (the event is dropped, not an error).
    pub fn close_next_open(&mut self, utterances: &[Utterance]) -> Option<(u64, String)> {
        let id = match self.policy {
            ClosingPolicy::NewestFirst => self.open_ids.pop_back(),
            ClosingPolicy::OldestFirst => self.open_ids.pop_front(),
        };
        let id = match id {
            Some(id) => id,
            None => {
                self.dropped_events += 1;
                return None;
            }
        };

        let hypothesis = join_utterances(utterances);
        // Ids are 1-based positions in the creation-ordered vec.
        let segment = &mut self.segments[(id - 1) as usize];
        segment.close(hypothesis.clone());
        Some((id, hypothesis))
    }

    pub fn attach_alignment(&mut self, id: u64, alignment: Alignment) {
        if let Some(segment) = self.segments.get_mut((id - 1) as usize) {
            segment.attach_alignment(alignment);
        }
    }

    pub fn segment(&self, id: u64) -> Option<&Segment> {
        self.segments.get((id - 1) as usize)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn open_count(&self) -> usize {
        self.open_ids.len()
    }

    /// Events that arrived with no open segment to assign. Diagnostic only.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }
}

fn join_utterances(utterances: &[Utterance]) -> String {
    utterances
        .iter()
        .map(Utterance::labeled_text)
        .collect::<Vec<_>>()
        .join(HYPOTHESIS_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(policy: ClosingPolicy) -> SegmentTracker {
        SegmentTracker::new(450.0, 6.0, policy)
    }

    fn utterance(speaker: &str, text: &str) -> Vec<Utterance> {
        vec![Utterance::new(speaker, text)]
    }

    #[test]
    fn test_ids_strictly_increasing_offsets_non_decreasing() {
        let refs = ReferenceMap::new();
        let mut t = tracker(ClosingPolicy::NewestFirst);
        let ids: Vec<u64> = (0..5).map(|_| t.open_segment(&refs)).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let offsets: Vec<f64> = t.segments().iter().map(|s| s.start_offset_sec()).collect();
        assert_eq!(offsets, vec![450.0, 456.0, 462.0, 468.0, 474.0]);
    }

    #[test]
    fn test_reference_drawn_by_segment_id() {
        let mut refs = ReferenceMap::new();
        refs.insert(2, "second window");
        let mut t = tracker(ClosingPolicy::NewestFirst);
        t.open_segment(&refs);
        t.open_segment(&refs);
        assert_eq!(t.segment(1).unwrap().reference_text(), "");
        assert_eq!(t.segment(2).unwrap().reference_text(), "second window");
    }

    #[test]
    fn test_newest_first_closes_most_recent() {
        let refs = ReferenceMap::new();
        let mut t = tracker(ClosingPolicy::NewestFirst);
        t.open_segment(&refs);
        t.open_segment(&refs);
        t.open_segment(&refs);

        let (id, _) = t.close_next_open(&utterance("0", "hi")).unwrap();
        assert_eq!(id, 3);
        assert!(t.segment(1).unwrap().is_open());
        assert!(t.segment(2).unwrap().is_open());
        assert!(!t.segment(3).unwrap().is_open());
    }

    #[test]
    fn test_oldest_first_closes_in_creation_order() {
        let refs = ReferenceMap::new();
        let mut t = tracker(ClosingPolicy::OldestFirst);
        t.open_segment(&refs);
        t.open_segment(&refs);
        t.open_segment(&refs);

        let (first, _) = t.close_next_open(&utterance("0", "a")).unwrap();
        let (second, _) = t.close_next_open(&utterance("0", "b")).unwrap();
        assert_eq!((first, second), (1, 2));
    }

    #[test]
    fn test_no_open_segment_drops_event() {
        let mut t = tracker(ClosingPolicy::NewestFirst);
        assert!(t.close_next_open(&utterance("0", "early")).is_none());
        assert!(t.segments().is_empty());
        assert_eq!(t.dropped_events(), 1);
    }

    #[test]
    fn test_closed_segment_never_selected_again() {
        let refs = ReferenceMap::new();
        let mut t = tracker(ClosingPolicy::NewestFirst);
        t.open_segment(&refs);

        assert!(t.close_next_open(&utterance("0", "first")).is_some());
        assert!(t.close_next_open(&utterance("0", "late")).is_none());

        let outcome = t.segment(1).unwrap().outcome().unwrap();
        assert_eq!(outcome.hypothesis_text, "0: first");
    }

    #[test]
    fn test_hypothesis_joins_utterances_in_order() {
        let refs = ReferenceMap::new();
        let mut t = tracker(ClosingPolicy::NewestFirst);
        t.open_segment(&refs);

        let utts = vec![
            Utterance::new("0", "hello there"),
            Utterance::new("1", "hi yourself"),
        ];
        let (_, hypothesis) = t.close_next_open(&utts).unwrap();
        assert_eq!(hypothesis, "0: hello there | 1: hi yourself");
    }

    #[test]
    fn test_latency_recorded_on_close() {
        let refs = ReferenceMap::new();
        let mut t = tracker(ClosingPolicy::NewestFirst);
        t.open_segment(&refs);
        t.close_next_open(&utterance("0", "x"));
        assert!(t.segment(1).unwrap().latency_ms().is_some());
    }

    #[test]
    fn test_open_count_tracks_lifecycle() {
        let refs = ReferenceMap::new();
        let mut t = tracker(ClosingPolicy::NewestFirst);
        t.open_segment(&refs);
        t.open_segment(&refs);
        assert_eq!(t.open_count(), 2);
        t.close_next_open(&utterance("0", "x"));
        assert_eq!(t.open_count(), 1);
    }
}
