//! services/api/src/adapters/sst.rs
//!
//! This module contains the adapter for OpenAI's Speech-to-Text (Whisper) service.
//! It implements the `TranscriptionService` port from the `core` crate, backing
//! the voice input path of the capture UI.

use async_openai::{
    config::OpenAIConfig,
    types::audio::{AudioInput, CreateTranscriptionRequest},
    Client,
};
use async_trait::async_trait;
use hound::{WavSpec, WavWriter};
use praxis_core::ports::{PortError, PortResult, TranscriptionService};

/// Sample rate the capture UI records at.
const CAPTURE_SAMPLE_RATE: u32 = 48_000;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `TranscriptionService` port using the OpenAI Whisper API.
#[derive(Clone)]
pub struct OpenAiSstAdapter {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiSstAdapter {
    /// Creates a new `OpenAiSstAdapter`.
    pub fn new(client: Option<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    /// Packages raw mono PCM16 samples into an in-memory WAV file, the
    /// container the transcription API expects.
    fn pcm16_to_wav(pcm_data: &[u8], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
        let mut cursor = std::io::Cursor::new(Vec::new());

        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for chunk in pcm_data.chunks_exact(2) {
            let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        Ok(cursor.into_inner())
    }
}

//=========================================================================================
// `TranscriptionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TranscriptionService for OpenAiSstAdapter {
    /// Transcribes a slice of audio data into text using the configured Whisper model.
    ///
    /// Unlike the degradable capture-time AI calls, a transcription failure
    /// surfaces as an error: there is no useful fallback text.
    async fn transcribe(&self, audio_data: &[u8]) -> PortResult<String> {
        let client = self.client.as_ref().ok_or_else(|| {
            PortError::Unexpected("Transcription unavailable: OPENAI_API_KEY missing".to_string())
        })?;

        let wav_data = Self::pcm16_to_wav(audio_data, CAPTURE_SAMPLE_RATE)
            .map_err(|e| PortError::Unexpected(format!("Failed to encode WAV: {}", e)))?;

        let input = AudioInput::from_vec_u8("voice_capture.wav".into(), wav_data);

        let request = CreateTranscriptionRequest {
            file: input,
            model: self.model.clone(),
            ..Default::default()
        };

        let response = client
            .audio()
            .transcription()
            .create(request)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(response.text)
    }
}
