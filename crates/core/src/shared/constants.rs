pub const SAMPLE_RATE: u32 = 16000;
pub const CHANNELS: u16 = 1;
pub const BYTES_PER_SAMPLE: u16 = 2;

/// Outgoing audio chunk size. Smaller chunks lower send latency but cost
/// more messages on the wire.
pub const CHUNK_MS: u32 = 320;

pub const DEFAULT_SEGMENT_SECONDS: f64 = 6.0;

/// How long to keep draining provider events after the audio stream ends.
pub const FINAL_EVENT_LINGER_MS: u64 = 2000;

/// Sleep between event polls while lingering.
pub const EVENT_POLL_INTERVAL_MS: u64 = 20;
