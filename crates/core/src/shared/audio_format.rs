/// Raw PCM stream parameters. Everything the scoring side needs to turn a
/// byte count into a duration on the audio timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bytes_per_sample: u16,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channels: u16, bytes_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bytes_per_sample,
        }
    }

    pub fn bytes_per_second(&self) -> usize {
        self.sample_rate as usize * self.channels as usize * self.bytes_per_sample as usize
    }

    pub fn bytes_for_duration(&self, seconds: f64) -> usize {
        (seconds * self.bytes_per_second() as f64) as usize
    }

    pub fn duration_for_bytes(&self, bytes: usize) -> f64 {
        bytes as f64 / self.bytes_per_second() as f64
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        use crate::shared::constants::{BYTES_PER_SAMPLE, CHANNELS, SAMPLE_RATE};
        Self::new(SAMPLE_RATE, CHANNELS, BYTES_PER_SAMPLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bytes_per_second_mono_16khz_s16() {
        let f = AudioFormat::new(16000, 1, 2);
        assert_eq!(f.bytes_per_second(), 32000);
    }

    #[test]
    fn test_bytes_for_duration() {
        let f = AudioFormat::new(16000, 1, 2);
        assert_eq!(f.bytes_for_duration(6.0), 192000);
        assert_eq!(f.bytes_for_duration(0.32), 10240);
    }

    #[test]
    fn test_duration_for_bytes_round_trips() {
        let f = AudioFormat::new(16000, 2, 2);
        assert_relative_eq!(f.duration_for_bytes(f.bytes_for_duration(3.5)), 3.5);
    }
}
