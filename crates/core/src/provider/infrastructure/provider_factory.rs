use crate::provider::domain::event_parser::EventParser;
use crate::provider::domain::transcription_channel::TranscriptionChannel;

use super::assemblyai::{self, AssemblyAiParser};
use super::deepgram::{self, DeepgramParser};
use super::ws_channel::ProviderConnectError;

/// Supported speech-recognition vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Deepgram,
    AssemblyAi,
}

impl Provider {
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Deepgram => "Deepgram",
            Provider::AssemblyAi => "AssemblyAI",
        }
    }

    /// Lowercase identifier used in file names and the raw-event log.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::Deepgram => "deepgram",
            Provider::AssemblyAi => "assemblyai",
        }
    }

    pub fn parser(&self) -> Box<dyn EventParser> {
        match self {
            Provider::Deepgram => Box::new(DeepgramParser),
            Provider::AssemblyAi => Box::new(AssemblyAiParser),
        }
    }

    pub fn connect(
        &self,
        api_key: &str,
        sample_rate: u32,
    ) -> Result<Box<dyn TranscriptionChannel>, ProviderConnectError> {
        let channel = match self {
            Provider::Deepgram => deepgram::connect(api_key, sample_rate, true)?,
            Provider::AssemblyAi => assemblyai::connect(api_key, sample_rate)?,
        };
        Ok(Box::new(channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_ids() {
        assert_eq!(Provider::Deepgram.display_name(), "Deepgram");
        assert_eq!(Provider::AssemblyAi.id(), "assemblyai");
    }
}
