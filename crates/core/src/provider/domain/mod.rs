pub mod event_parser;
pub mod transcription_channel;
