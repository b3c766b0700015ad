use super::{SpeechSynthesizer, TtsError};
use crate::config::{Config, VoiceSettings};
use crate::logw;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const ELEVENLABS_BASE: &str = "https://api.elevenlabs.io";
const ERROR_BODY_MAX: usize = 300;

pub struct ElevenLabsClient {
    client: Client,
    base_url: String,
    api_key: String,
    voice_id: String,
    model_id: String,
    voice_settings: VoiceSettings,
}

impl ElevenLabsClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("failed to build reqwest client")?;
        Self::with_client(client, cfg)
    }

    pub fn with_client(client: Client, cfg: &Config) -> Result<Self> {
        Ok(Self {
            client,
            base_url: ELEVENLABS_BASE.to_string(),
            api_key: cfg.elevenlabs_key()?.to_string(),
            voice_id: cfg.eleven_voice_id.clone(),
            model_id: cfg.eleven_model_id.clone(),
            voice_settings: cfg.voice_settings.clone(),
        })
    }

    /// Points the client at another host, e.g. a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn request_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format=mp3_44100_128",
            self.base_url, self.voice_id
        )
    }

    pub fn request_body(&self, text: &str) -> serde_json::Value {
        serde_json::json!({
            "text": text,
            "model_id": self.model_id,
            "voice_settings": {
                "stability": self.voice_settings.stability,
                "similarity_boost": self.voice_settings.similarity_boost,
                "style": self.voice_settings.style,
                "use_speaker_boost": self.voice_settings.use_speaker_boost,
            },
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let resp = self
            .client
            .post(self.request_url())
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&self.request_body(text))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: String = resp
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(ERROR_BODY_MAX)
                .collect();
            logw(format!("ElevenLabs TTS failed HTTP {}", status.as_u16()));
            return Err(TtsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(TtsError::EmptyAudio);
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            elevenlabs_key: Some("sk-test".to_string()),
            eleven_voice_id: "voice123".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_request_url() {
        let client = ElevenLabsClient::with_client(Client::new(), &config())
            .unwrap()
            .with_base_url("http://127.0.0.1:9999/");
        assert_eq!(
            client.request_url(),
            "http://127.0.0.1:9999/v1/text-to-speech/voice123?output_format=mp3_44100_128"
        );
    }

    #[test]
    fn test_request_body_carries_voice_settings() {
        let client = ElevenLabsClient::with_client(Client::new(), &config()).unwrap();
        let body = client.request_body("Hello there");
        assert_eq!(body["text"], "Hello there");
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert_eq!(body["voice_settings"]["stability"], 0.5);
        assert_eq!(body["voice_settings"]["use_speaker_boost"], true);
    }

    #[test]
    fn test_missing_key_rejected() {
        assert!(ElevenLabsClient::with_client(Client::new(), &Config::default()).is_err());
    }
}
