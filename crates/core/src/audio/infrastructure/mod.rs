pub mod ffmpeg_audio_source;
