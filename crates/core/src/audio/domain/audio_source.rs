/// Domain interface for the audio producer side of a benchmark run.
///
/// Yields fixed-size raw PCM buffers; the scoring side only needs the byte
/// counts to drive segment boundaries.
pub trait AudioSource: Send {
    /// Next chunk of raw audio, `None` at end of stream. The final chunk
    /// may be shorter than the configured size.
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, Box<dyn std::error::Error>>;

    /// Release the underlying decoder. Also called implicitly on drop by
    /// implementations that own a process or handle.
    fn close(&mut self) {}
}
