use serde_json::{json, Value};
use tungstenite::Message;

use crate::provider::domain::event_parser::EventParser;
use crate::scoring::domain::utterance::Utterance;

use super::ws_channel::{ProviderConnectError, WireFormat, WsTranscriptionChannel};

const LISTEN_ENDPOINT: &str = "wss://api.deepgram.com/v1/listen";
const DEFAULT_MODEL: &str = "general";

pub fn connect(
    api_key: &str,
    sample_rate: u32,
    diarize: bool,
) -> Result<WsTranscriptionChannel, ProviderConnectError> {
    let url = listen_url(DEFAULT_MODEL, sample_rate, diarize);
    WsTranscriptionChannel::connect(&url, &format!("Token {api_key}"), Box::new(DeepgramWire))
}

fn listen_url(model: &str, sample_rate: u32, diarize: bool) -> String {
    let mut url = format!(
        "{LISTEN_ENDPOINT}?model={model}&encoding=linear16&sample_rate={sample_rate}&channels=1"
    );
    if diarize {
        url.push_str("&diarize=true");
    }
    url
}

/// Deepgram takes raw PCM16LE binary frames and a JSON `CloseStream`
/// control message.
pub struct DeepgramWire;

impl WireFormat for DeepgramWire {
    fn frame_audio(&self, chunk: &[u8]) -> Message {
        Message::Binary(chunk.to_vec())
    }

    fn close_message(&self) -> Option<Message> {
        Some(Message::Text(json!({"type": "CloseStream"}).to_string()))
    }
}

/// Best-effort parser for Deepgram listen events.
///
/// Primary path: find the first `words` array anywhere in the payload and
/// group consecutive word entries per speaker into utterances. Fallback:
/// `alternatives[0].transcript` as a single unattributed utterance.
pub struct DeepgramParser;

impl EventParser for DeepgramParser {
    fn parse(&self, event: &Value) -> Vec<Utterance> {
        let mut utterances = group_words(find_words(event).unwrap_or(&[]));
        if utterances.is_empty() {
            if let Some(fallback) = transcript_fallback(event) {
                utterances.push(fallback);
            }
        }
        utterances
    }
}

fn find_words(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "words" {
                    if let Value::Array(words) = child {
                        return Some(words);
                    }
                } else if let Some(words) = find_words(child) {
                    return Some(words);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(find_words),
        _ => None,
    }
}

fn group_words(words: &[Value]) -> Vec<Utterance> {
    struct Group {
        speaker: String,
        start: f64,
        end: f64,
        texts: Vec<String>,
    }

    let mut groups: Vec<Group> = Vec::new();
    for word in words {
        let speaker = speaker_label(word.get("speaker"));
        let start = word.get("start").and_then(Value::as_f64).unwrap_or(0.0);
        let end = word.get("end").and_then(Value::as_f64).unwrap_or(start);
        let text = word
            .get("word")
            .or_else(|| word.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("");

        match groups.iter_mut().find(|g| g.speaker == speaker) {
            Some(group) => {
                group.end = end;
                if !text.is_empty() {
                    group.texts.push(text.to_string());
                }
            }
            None => groups.push(Group {
                speaker,
                start,
                end,
                texts: if text.is_empty() {
                    Vec::new()
                } else {
                    vec![text.to_string()]
                },
            }),
        }
    }

    groups
        .into_iter()
        .map(|g| {
            Utterance::new(g.speaker, g.texts.join(" ").trim().to_string())
                .with_span(g.start, g.end)
        })
        .collect()
}

fn transcript_fallback(event: &Value) -> Option<Utterance> {
    let alternative = event
        .get("alternative")
        .or_else(|| event.get("alternatives"))?;
    let alternative = match alternative {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let text = alternative
        .get("transcript")
        .or_else(|| alternative.get("text"))
        .and_then(Value::as_str)?;
    if text.is_empty() {
        return None;
    }
    Some(Utterance::new(speaker_label(event.get("speaker")), text))
}

pub(crate) fn speaker_label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "0".to_string(),
    }
}
