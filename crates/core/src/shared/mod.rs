pub mod audio_format;
pub mod constants;
