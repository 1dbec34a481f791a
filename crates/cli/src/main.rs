use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use streambench_core::audio::infrastructure::ffmpeg_audio_source::FfmpegAudioSource;
use streambench_core::pipeline::event_log::{JsonlRawEventSink, NullRawEventSink, RawEventSink};
use streambench_core::pipeline::stream_benchmark_use_case::StreamBenchmarkUseCase;
use streambench_core::provider::infrastructure::provider_factory::Provider;
use streambench_core::scoring::domain::reference_map::ReferenceMap;
use streambench_core::scoring::domain::segment::SegmentRecord;
use streambench_core::scoring::domain::segment_tracker::ClosingPolicy;
use streambench_core::scoring::infrastructure::metrics_csv::write_metrics_csv;
use streambench_core::scoring::infrastructure::reference_csv::{
    load_reference_csv, ReferenceCsvError,
};
use streambench_core::scoring::session::{ScoringSession, SessionConfig};
use streambench_core::shared::audio_format::AudioFormat;
use streambench_core::shared::constants::{CHUNK_MS, DEFAULT_SEGMENT_SECONDS};

/// Benchmark a streaming speech-recognition provider against a reference
/// transcript: WER and latency per fixed-duration audio segment.
#[derive(Parser)]
#[command(name = "streambench")]
struct Cli {
    /// Provider to benchmark: deepgram or assemblyai.
    #[arg(long)]
    provider: String,

    /// Provider API key.
    #[arg(long)]
    api_key: String,

    /// Audio URL or local file (anything ffmpeg can open).
    #[arg(long)]
    url: String,

    /// Clip start offset in seconds.
    #[arg(long, default_value = "0.0")]
    start: f64,

    /// Clip duration in seconds.
    #[arg(long, default_value = "300.0")]
    duration: f64,

    /// Scoring segment window in seconds.
    #[arg(long, default_value_t = DEFAULT_SEGMENT_SECONDS)]
    segment_seconds: f64,

    /// Outgoing audio chunk size in milliseconds.
    #[arg(long, default_value_t = CHUNK_MS)]
    chunk_ms: u32,

    /// CSV with segment_id,reference_text columns.
    #[arg(long)]
    reference_csv: Option<PathBuf>,

    /// Metrics CSV output path (default data/sample_metrics_<provider>.csv).
    #[arg(long)]
    metrics_out: Option<PathBuf>,

    /// Raw provider events as JSON lines; pass "none" to disable.
    #[arg(long, default_value = "transcripts.jsonl")]
    transcripts_out: PathBuf,

    /// Which open segment an event closes when several are open:
    /// newest (historical behavior) or oldest (true FIFO).
    #[arg(long, default_value = "newest")]
    close_policy: String,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let provider = parse_provider(&cli.provider)?;
    let format = AudioFormat::default();
    let chunk_bytes = format.bytes_for_duration(cli.chunk_ms as f64 / 1000.0);

    let references = load_references(cli.reference_csv.as_deref())?;
    let session = ScoringSession::new(SessionConfig {
        format,
        segment_seconds: cli.segment_seconds,
        start_offset_sec: cli.start,
        references,
        closing_policy: parse_policy(&cli.close_policy),
    })?;

    let source = FfmpegAudioSource::spawn(&cli.url, cli.start, cli.duration, format, chunk_bytes)?;
    let channel = provider.connect(&cli.api_key, format.sample_rate)?;
    log::info!("connected to {}", provider.display_name());

    let event_sink: Box<dyn RawEventSink> = if cli.transcripts_out.as_os_str() == "none" {
        Box::new(NullRawEventSink)
    } else {
        let file = File::create(&cli.transcripts_out)?;
        Box::new(JsonlRawEventSink::new(Box::new(BufWriter::new(file))))
    };

    let use_case = StreamBenchmarkUseCase::new(
        Box::new(source),
        channel,
        provider.parser(),
        event_sink,
        session,
        provider.id(),
        Arc::new(AtomicBool::new(false)),
    );
    let result = use_case.run()?;

    if result.dropped_events > 0 {
        log::warn!(
            "{} transcription event(s) arrived with no open segment",
            result.dropped_events
        );
    }

    let records: Vec<SegmentRecord> = result.segments.iter().map(SegmentRecord::from).collect();
    report(&records);

    let metrics_path = cli.metrics_out.unwrap_or_else(|| {
        PathBuf::from(format!("data/sample_metrics_{}.csv", provider.id()))
    });
    write_metrics_csv(&metrics_path, provider.display_name(), &records)?;
    log::info!("wrote metrics to {}", metrics_path.display());

    Ok(())
}

fn report(records: &[SegmentRecord]) {
    let measured = records.iter().filter(|r| r.alignment.is_some()).count();
    log::info!(
        "{} segment(s), {} with a scored alignment",
        records.len(),
        measured
    );
    for record in records {
        match (record.alignment, record.latency_ms) {
            (Some(alignment), Some(latency)) => log::info!(
                "segment {}: wer {:.3} ({} errors / {} words), latency {} ms",
                record.segment_id,
                alignment.wer(),
                alignment.errors(),
                alignment.reference_words,
                latency
            ),
            (None, Some(latency)) => log::info!(
                "segment {}: no reference, latency {} ms",
                record.segment_id,
                latency
            ),
            _ => log::info!("segment {}: unmeasured", record.segment_id),
        }
    }
}

fn load_references(path: Option<&std::path::Path>) -> Result<ReferenceMap, ReferenceCsvError> {
    let path = match path {
        Some(path) => path,
        None => return Ok(ReferenceMap::new()),
    };
    match load_reference_csv(path) {
        Ok(map) => {
            log::info!("loaded {} reference segment(s)", map.len());
            Ok(map)
        }
        // A missing reference file degrades to an unscored run, matching
        // every other missing-reference case.
        Err(ReferenceCsvError::Read { ref source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            log::warn!("reference csv not found: {}", path.display());
            Ok(ReferenceMap::new())
        }
        Err(e) => Err(e),
    }
}

fn parse_provider(name: &str) -> Result<Provider, Box<dyn std::error::Error>> {
    match name.to_lowercase().as_str() {
        "deepgram" => Ok(Provider::Deepgram),
        "assemblyai" => Ok(Provider::AssemblyAi),
        other => Err(format!("Provider must be 'deepgram' or 'assemblyai', got '{other}'").into()),
    }
}

fn parse_policy(policy: &str) -> ClosingPolicy {
    if policy == "oldest" {
        ClosingPolicy::OldestFirst
    } else {
        ClosingPolicy::NewestFirst
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.duration <= 0.0 {
        return Err(format!("Duration must be positive, got {}", cli.duration).into());
    }
    if cli.segment_seconds <= 0.0 {
        return Err(format!(
            "Segment window must be positive, got {}",
            cli.segment_seconds
        )
        .into());
    }
    if cli.chunk_ms == 0 {
        return Err("Chunk size must be at least 1 ms".into());
    }
    if cli.start < 0.0 {
        return Err(format!("Start offset must be non-negative, got {}", cli.start).into());
    }
    if cli.close_policy != "newest" && cli.close_policy != "oldest" {
        return Err(format!(
            "Close policy must be 'newest' or 'oldest', got '{}'",
            cli.close_policy
        )
        .into());
    }
    Ok(())
}
