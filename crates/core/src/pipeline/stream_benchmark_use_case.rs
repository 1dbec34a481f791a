use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::audio::domain::audio_source::AudioSource;
use crate::pipeline::event_log::RawEventSink;
use crate::provider::domain::event_parser::EventParser;
use crate::provider::domain::transcription_channel::TranscriptionChannel;
use crate::scoring::domain::segment::Segment;
use crate::scoring::session::ScoringSession;
use crate::shared::constants::{EVENT_POLL_INTERVAL_MS, FINAL_EVENT_LINGER_MS};

const CHUNK_CHANNEL_CAPACITY: usize = 8;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one benchmark run: every segment in creation order plus the
/// count of events that arrived with no open segment to claim them.
pub struct BenchmarkResult {
    pub segments: Vec<Segment>,
    pub dropped_events: u64,
}

/// Drives one full benchmark run.
///
/// Layout: `audio reader thread → main loop [send / advance / score]`.
/// Decoding runs on its own thread so socket sends overlap ffmpeg I/O; all
/// scoring state is mutated only from the main loop, so no lock is needed.
pub struct StreamBenchmarkUseCase {
    source: Option<Box<dyn AudioSource>>,
    channel: Box<dyn TranscriptionChannel>,
    parser: Box<dyn EventParser>,
    event_sink: Box<dyn RawEventSink>,
    session: ScoringSession,
    provider_id: String,
    cancelled: Arc<AtomicBool>,
}

impl StreamBenchmarkUseCase {
    pub fn new(
        source: Box<dyn AudioSource>,
        channel: Box<dyn TranscriptionChannel>,
        parser: Box<dyn EventParser>,
        event_sink: Box<dyn RawEventSink>,
        session: ScoringSession,
        provider_id: impl Into<String>,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source: Some(source),
            channel,
            parser,
            event_sink,
            session,
            provider_id: provider_id.into(),
            cancelled,
        }
    }

    /// Stream the audio, score arriving events, and return all segments.
    ///
    /// Cancellation stops streaming at the next chunk boundary and leaves
    /// still-open segments unfinalized; that is a normal outcome, not an
    /// error.
    pub fn run(mut self) -> Result<BenchmarkResult, Box<dyn std::error::Error>> {
        let (chunk_tx, chunk_rx) = crossbeam_channel::bounded(CHUNK_CHANNEL_CAPACITY);
        let source = match self.source.take() {
            Some(source) => source,
            None => return Err("benchmark use case already ran".into()),
        };
        let reader_handle = spawn_reader(source, chunk_tx, self.cancelled.clone());

        let stream_result = self.stream(chunk_rx);
        let _ = reader_handle.join();
        stream_result?;

        Ok(BenchmarkResult {
            dropped_events: self.session.dropped_events(),
            segments: self.session.finalize(),
        })
    }

    fn stream(
        &mut self,
        chunks: crossbeam_channel::Receiver<Result<Vec<u8>, SendError>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut events_alive = true;

        for chunk in chunks.iter() {
            if self.cancelled.load(Ordering::Relaxed) {
                log::info!("benchmark cancelled; tearing down");
                return Ok(());
            }
            let chunk = chunk.map_err(|e| e as Box<dyn std::error::Error>)?;
            self.channel.send_audio(&chunk)?;
            self.session.advance(chunk.len());
            if events_alive {
                events_alive = self.pump_events();
            }
        }

        if self.cancelled.load(Ordering::Relaxed) {
            return Ok(());
        }
        self.channel.finish()?;
        if events_alive {
            self.linger();
        }
        Ok(())
    }

    /// Drain every pending provider event into the session. Returns false
    /// when the event side of the connection failed; the audio side keeps
    /// going and the affected segments stay unmeasured.
    fn pump_events(&mut self) -> bool {
        loop {
            match self.channel.poll_event() {
                Ok(Some(event)) => {
                    self.event_sink.append(&self.provider_id, &event);
                    let utterances = self.parser.parse(&event);
                    for utterance in &utterances {
                        log::info!("speaker {}: {}", utterance.speaker_label, utterance.text);
                    }
                    self.session.on_transcription_event(&utterances);
                }
                Ok(None) => return true,
                Err(e) => {
                    log::warn!("transcription event stream failed: {e}");
                    return false;
                }
            }
        }
    }

    /// Keep collecting trailing events for a short while after the audio
    /// stream ends; providers finalize their last results asynchronously.
    fn linger(&mut self) {
        let deadline = Instant::now() + Duration::from_millis(FINAL_EVENT_LINGER_MS);
        while Instant::now() < deadline && !self.cancelled.load(Ordering::Relaxed) {
            if !self.pump_events() {
                return;
            }
            std::thread::sleep(Duration::from_millis(EVENT_POLL_INTERVAL_MS));
        }
    }
}

fn spawn_reader(
    mut source: Box<dyn AudioSource>,
    chunk_tx: crossbeam_channel::Sender<Result<Vec<u8>, SendError>>,
    cancelled: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        loop {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            match source.next_chunk() {
                Ok(Some(chunk)) => {
                    if chunk_tx.send(Ok(chunk)).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let _ = chunk_tx.send(Err(e.to_string().into()));
                    break;
                }
            }
        }
        source.close();
    })
}
