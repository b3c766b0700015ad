use async_trait::async_trait;
use thiserror::Error;

pub mod elevenlabs;

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("TTS request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("TTS failed HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("TTS returned no audio")]
    EmptyAudio,
}

/// Turns narration text into encoded audio bytes (mp3 unless the
/// implementation says otherwise).
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError>;

    /// File extension for the bytes `synthesize` returns.
    fn audio_extension(&self) -> &'static str {
        "mp3"
    }
}
