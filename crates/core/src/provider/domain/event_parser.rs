use serde_json::Value;

use crate::scoring::domain::utterance::Utterance;

/// Adapter seam that normalizes one vendor event payload into the fixed
/// utterance shape before it reaches the scoring session.
///
/// Parsing is best-effort: an event the parser does not understand yields
/// an empty vector, never an error.
pub trait EventParser: Send {
    fn parse(&self, event: &Value) -> Vec<Utterance>;
}
