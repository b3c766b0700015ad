use crate::captions::SegmentationMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "elevenlabs_api_key")]
    #[serde(default)]
    pub elevenlabs_key: Option<String>,
    #[serde(rename = "eleven_voice_id")]
    #[serde(default = "default_voice_id")]
    pub eleven_voice_id: String,
    #[serde(rename = "eleven_model_id")]
    #[serde(default = "default_model_id")]
    pub eleven_model_id: String,
    #[serde(default)]
    pub voice_settings: VoiceSettings,
    /// Preset applied when a request names none.
    #[serde(default)]
    pub caption_preset: Option<String>,
    #[serde(default)]
    pub caption_mode: SegmentationMode,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// ElevenLabs `voice_settings` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

fn default_voice_id() -> String {
    "JBFqnCBsd6RMkjVDRZzb".to_string()
}

fn default_model_id() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            elevenlabs_key: None,
            eleven_voice_id: default_voice_id(),
            eleven_model_id: default_model_id(),
            voice_settings: VoiceSettings::default(),
            caption_preset: None,
            caption_mode: SegmentationMode::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid config: {}", path.as_ref().display()))
    }

    /// Like [`Config::load`], but a missing file yields the defaults. Any
    /// other read failure (permissions, a directory) is still an error.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match fs::metadata(&path).await {
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            _ => Self::load(path).await,
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;

        let vs = &config.voice_settings;
        for (name, value) in [
            ("stability", vs.stability),
            ("similarity_boost", vs.similarity_boost),
            ("style", vs.style),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("config.json: voice_settings.{name} must be within 0..1 (got {value})");
            }
        }

        Ok(config)
    }

    pub fn elevenlabs_key(&self) -> Result<&str> {
        match self.elevenlabs_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => anyhow::bail!("config.json: elevenlabs_api_key missing"),
        }
    }
}
