use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use super::aligner::Alignment;

/// Everything recorded when a transcription event closes a segment. Set at
/// most once; a closed segment is never reopened.
#[derive(Debug, Clone)]
pub struct SegmentOutcome {
    pub finalized_at: DateTime<Utc>,
    pub latency: Duration,
    pub hypothesis_text: String,
    pub alignment: Option<Alignment>,
}

/// One fixed-duration window of source audio awaiting a transcription
/// result.
#[derive(Debug, Clone)]
pub struct Segment {
    id: u64,
    start_offset_sec: f64,
    reference_text: String,
    opened_at: Instant,
    outcome: Option<SegmentOutcome>,
}

impl Segment {
    pub(crate) fn open(id: u64, start_offset_sec: f64, reference_text: String) -> Self {
        Self {
            id,
            start_offset_sec,
            reference_text,
            opened_at: Instant::now(),
            outcome: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn start_offset_sec(&self) -> f64 {
        self.start_offset_sec
    }

    /// Known-correct transcript for this window; empty when no reference
    /// was provided.
    pub fn reference_text(&self) -> &str {
        &self.reference_text
    }

    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    pub fn is_open(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn outcome(&self) -> Option<&SegmentOutcome> {
        self.outcome.as_ref()
    }

    pub fn latency_ms(&self) -> Option<u64> {
        self.outcome.as_ref().map(|o| o.latency.as_millis() as u64)
    }

    pub(crate) fn close(&mut self, hypothesis_text: String) {
        debug_assert!(self.is_open(), "segment {} closed twice", self.id);
        self.outcome = Some(SegmentOutcome {
            finalized_at: Utc::now(),
            latency: self.opened_at.elapsed(),
            hypothesis_text,
            alignment: None,
        });
    }

    /// Record the alignment computed for a just-closed segment. Writes only
    /// when no alignment is present.
    pub(crate) fn attach_alignment(&mut self, alignment: Alignment) {
        if let Some(outcome) = self.outcome.as_mut() {
            if outcome.alignment.is_none() {
                outcome.alignment = Some(alignment);
            }
        }
    }
}

/// Flat per-segment shape suitable for tabular export. Unmeasured fields
/// are `None`/empty rather than zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRecord {
    pub segment_id: u64,
    pub start_offset_sec: f64,
    pub finalized_iso: String,
    pub latency_ms: Option<u64>,
    pub hypothesis_text: String,
    pub reference_text: String,
    pub alignment: Option<Alignment>,
}

impl From<&Segment> for SegmentRecord {
    fn from(segment: &Segment) -> Self {
        let (finalized_iso, latency_ms, hypothesis_text, alignment) = match segment.outcome() {
            Some(o) => (
                o.finalized_at.to_rfc3339(),
                Some(o.latency.as_millis() as u64),
                o.hypothesis_text.clone(),
                o.alignment,
            ),
            None => (String::new(), None, String::new(), None),
        };

        Self {
            segment_id: segment.id(),
            start_offset_sec: segment.start_offset_sec(),
            finalized_iso,
            latency_ms,
            hypothesis_text,
            reference_text: segment.reference_text().to_string(),
            alignment,
        }
    }
}
