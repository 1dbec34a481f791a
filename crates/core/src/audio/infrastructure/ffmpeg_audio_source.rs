use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

use thiserror::Error;

use crate::audio::domain::audio_source::AudioSource;
use crate::shared::audio_format::AudioFormat;

#[derive(Error, Debug)]
pub enum FfmpegSpawnError {
    #[error("failed to spawn ffmpeg (is it installed and on PATH?): {0}")]
    Spawn(#[source] std::io::Error),
    #[error("ffmpeg produced no stdout pipe")]
    NoStdout,
}

/// Decodes a remote URL or local file to raw PCM16LE by spawning the
/// external `ffmpeg` binary and reading its stdout in fixed-size chunks.
pub struct FfmpegAudioSource {
    child: Child,
    stdout: ChildStdout,
    chunk_bytes: usize,
    finished: bool,
}

impl FfmpegAudioSource {
    pub fn spawn(
        url: &str,
        start_sec: f64,
        duration_sec: f64,
        format: AudioFormat,
        chunk_bytes: usize,
    ) -> Result<Self, FfmpegSpawnError> {
        let args = build_args(url, start_sec, duration_sec, format);
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdout(Stdio::piped())
            .stdin(Stdio::null())
            .spawn()
            .map_err(FfmpegSpawnError::Spawn)?;
        let stdout = child.stdout.take().ok_or(FfmpegSpawnError::NoStdout)?;
        log::info!("started ffmpeg pid {}", child.id());

        Ok(Self {
            child,
            stdout,
            chunk_bytes,
            finished: false,
        })
    }
}

fn build_args(url: &str, start_sec: f64, duration_sec: f64, format: AudioFormat) -> Vec<String> {
    vec![
        "-ss".to_string(),
        start_sec.to_string(),
        "-i".to_string(),
        url.to_string(),
        "-t".to_string(),
        duration_sec.to_string(),
        "-ar".to_string(),
        format.sample_rate.to_string(),
        "-ac".to_string(),
        format.channels.to_string(),
        "-f".to_string(),
        "s16le".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "pipe:1".to_string(),
    ]
}

impl AudioSource for FfmpegAudioSource {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, Box<dyn std::error::Error>> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.chunk_bytes];
        let mut filled = 0;
        while filled < self.chunk_bytes {
            let read = self.stdout.read(&mut buf[filled..])?;
            if read == 0 {
                self.finished = true;
                break;
            }
            filled += read;
        }

        if filled == 0 {
            Ok(None)
        } else {
            buf.truncate(filled);
            Ok(Some(buf))
        }
    }

    fn close(&mut self) {
        self.finished = true;
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for FfmpegAudioSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_shape() {
        let args = build_args(
            "https://example.com/audio.mp3",
            450.0,
            300.0,
            AudioFormat::new(16000, 1, 2),
        );
        let joined = args.join(" ");
        assert!(joined.starts_with("-ss 450 -i https://example.com/audio.mp3 -t 300"));
        assert!(joined.contains("-ar 16000 -ac 1 -f s16le"));
        assert!(joined.ends_with("pipe:1"));
    }

    #[test]
    fn test_spawn_missing_binary_errors() {
        // Drive the same spawn path with a binary name that cannot exist.
        let result = Command::new("ffmpeg-definitely-not-installed")
            .arg("-version")
            .stdout(Stdio::piped())
            .spawn()
            .map_err(FfmpegSpawnError::Spawn);
        assert!(matches!(result, Err(FfmpegSpawnError::Spawn(_))));
    }
}
