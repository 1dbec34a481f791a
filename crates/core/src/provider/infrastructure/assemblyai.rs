use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use tungstenite::Message;

use crate::provider::domain::event_parser::EventParser;
use crate::scoring::domain::utterance::Utterance;

use super::deepgram::speaker_label;
use super::ws_channel::{ProviderConnectError, WireFormat, WsTranscriptionChannel};

const REALTIME_ENDPOINT: &str = "wss://api.assemblyai.com/v2/realtime/ws";

pub fn connect(
    api_key: &str,
    sample_rate: u32,
) -> Result<WsTranscriptionChannel, ProviderConnectError> {
    let url = format!("{REALTIME_ENDPOINT}?sample_rate={sample_rate}");
    WsTranscriptionChannel::connect(&url, api_key, Box::new(AssemblyAiWire))
}

/// AssemblyAI realtime framing: audio travels base64-wrapped inside JSON
/// text frames, bracketed by `StartStream`/`StopStream` control messages.
pub struct AssemblyAiWire;

impl WireFormat for AssemblyAiWire {
    fn frame_audio(&self, chunk: &[u8]) -> Message {
        let payload = json!({
            "type": "InputAudio",
            "audio_data": BASE64.encode(chunk),
        });
        Message::Text(payload.to_string())
    }

    fn open_messages(&self) -> Vec<Message> {
        vec![Message::Text(json!({"type": "StartStream"}).to_string())]
    }

    fn close_message(&self) -> Option<Message> {
        Some(Message::Text(json!({"type": "StopStream"}).to_string()))
    }
}

/// Parser for AssemblyAI realtime events: any event whose `type` ends with
/// `transcript` (partials included) with non-empty text becomes one
/// utterance.
pub struct AssemblyAiParser;

impl EventParser for AssemblyAiParser {
    fn parse(&self, event: &Value) -> Vec<Utterance> {
        let event_type = event.get("type").and_then(Value::as_str).unwrap_or("");
        if !event_type.to_lowercase().ends_with("transcript") {
            return Vec::new();
        }

        let text = event.get("text").and_then(Value::as_str).unwrap_or("");
        if text.trim().is_empty() {
            return Vec::new();
        }

        let speaker = speaker_label(
            event
                .get("speaker")
                .or_else(|| event.get("speaker_label")),
        );
        let start = event.get("start").and_then(Value::as_f64).unwrap_or(0.0);
        let end = event.get("end").and_then(Value::as_f64).unwrap_or(0.0);
        vec![Utterance::new(speaker, text).with_span(start, end)]
    }
}
