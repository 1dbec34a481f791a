use serde_json::Value;

/// Domain interface for a live speech-recognition connection.
///
/// The scoring side never sees vendor framing: audio goes in as raw bytes,
/// transcription events come back as already-parsed JSON values.
pub trait TranscriptionChannel: Send {
    /// Ship one chunk of raw audio to the provider.
    fn send_audio(&mut self, chunk: &[u8]) -> Result<(), Box<dyn std::error::Error>>;

    /// Next pending transcription event, without blocking beyond a short
    /// poll. `None` means nothing is waiting; after the remote closes the
    /// stream this stays `None`.
    fn poll_event(&mut self) -> Result<Option<Value>, Box<dyn std::error::Error>>;

    /// Tell the provider the audio stream is complete. Events may continue
    /// to arrive for a short while afterwards.
    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
