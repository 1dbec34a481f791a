pub mod assemblyai;
pub mod deepgram;
pub mod provider_factory;
pub mod ws_channel;
