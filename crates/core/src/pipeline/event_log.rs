use std::io::Write;

use chrono::Utc;
use serde_json::{json, Value};

/// Observational tap for every provider event before it reaches the
/// scoring session. Appending never affects pipeline behavior; sinks that
/// fail log and swallow the error.
pub trait RawEventSink: Send {
    fn append(&mut self, provider: &str, event: &Value);
}

/// Discards all events. Used when the host does not ask for a raw log, and
/// by tests where the log is irrelevant.
pub struct NullRawEventSink;

impl RawEventSink for NullRawEventSink {
    fn append(&mut self, _provider: &str, _event: &Value) {}
}

/// Writes one JSON object per event as a JSON-lines stream:
/// `{"provider": …, "event": …, "iso": …}`.
///
/// The host owns the underlying writer (and any file handle behind it);
/// this type never opens files itself.
pub struct JsonlRawEventSink {
    writer: Box<dyn Write + Send>,
}

impl JsonlRawEventSink {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }
}

impl RawEventSink for JsonlRawEventSink {
    fn append(&mut self, provider: &str, event: &Value) {
        let record = json!({
            "provider": provider,
            "event": event,
            "iso": Utc::now().to_rfc3339(),
        });
        if let Err(e) = writeln!(self.writer, "{record}") {
            log::warn!("failed to append raw event: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_jsonl_record_shape() {
        let buf = SharedBuf::default();
        let mut sink = JsonlRawEventSink::new(Box::new(buf.clone()));
        sink.append("deepgram", &json!({"type": "Results"}));
        sink.append("deepgram", &json!({"type": "Metadata"}));

        let bytes = buf.0.lock().unwrap().clone();
        let content = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["provider"], "deepgram");
        assert_eq!(first["event"]["type"], "Results");
        assert!(first["iso"].as_str().unwrap().contains('T'));
    }
}
