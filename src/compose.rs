//! Narration + video in, captioned video out.
//!
//! Intermediate files (ASS scripts, synthesized audio, the narrated
//! pre-burn video) live in a per-call `TempDir` under the composer's
//! scratch root and are removed when the call returns, on success or error.

use crate::api::SpeechSynthesizer;
use crate::captions::{
    self, CaptionSegment, CaptionStyle, CaptionStyleOverrides, SegmentationMode,
};
use crate::ffmpeg;
use crate::{logi, logok, logw};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

/// What to caption and how it should look.
#[derive(Debug, Clone, Default)]
pub struct CaptionJob {
    pub narration: String,
    /// Spoken length of `narration` in seconds.
    pub duration: f64,
    pub mode: SegmentationMode,
    pub preset: Option<String>,
    pub overrides: Option<CaptionStyleOverrides>,
}

impl CaptionJob {
    pub fn new(narration: impl Into<String>, duration: f64) -> Self {
        Self {
            narration: narration.into(),
            duration,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: SegmentationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_preset(mut self, preset: Option<String>) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_overrides(mut self, overrides: Option<CaptionStyleOverrides>) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn segments(&self) -> Vec<CaptionSegment> {
        captions::generate_segments(&self.narration, self.duration, self.mode)
    }

    pub fn style(&self) -> CaptionStyle {
        captions::resolve_style(self.preset.as_deref(), self.overrides.as_ref())
    }

    pub fn render_srt(&self) -> String {
        captions::generate_srt(&self.segments())
    }

    pub fn render_ass(&self) -> String {
        captions::generate_ass(&self.segments(), &self.style())
    }
}

#[derive(Debug, Clone)]
pub struct CaptionFiles {
    pub srt: PathBuf,
    pub ass: PathBuf,
    pub segments: usize,
}

/// Writes `<stem>.srt` and `<stem>.ass` into `dir`.
pub async fn write_caption_files(job: &CaptionJob, dir: &Path, stem: &str) -> Result<CaptionFiles> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create dir {}", dir.display()))?;

    let segments = job.segments();
    let srt = dir.join(format!("{stem}.srt"));
    let ass = dir.join(format!("{stem}.ass"));

    fs::write(&srt, captions::generate_srt(&segments))
        .await
        .with_context(|| format!("write srt: {}", srt.display()))?;
    fs::write(&ass, captions::generate_ass(&segments, &job.style()))
        .await
        .with_context(|| format!("write ass: {}", ass.display()))?;

    Ok(CaptionFiles {
        srt,
        ass,
        segments: segments.len(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct NarrationOutcome {
    pub duration: f64,
    pub segments: usize,
}

pub struct Composer {
    scratch_root: PathBuf,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir(),
        }
    }
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scratch_root(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
        }
    }

    fn scratch(&self, prefix: &str) -> Result<TempDir> {
        tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(&self.scratch_root)
            .with_context(|| {
                format!("create scratch dir under {}", self.scratch_root.display())
            })
    }

    /// Burns the job's captions into `video_in`. Returns the number of
    /// caption segments; with none the video is copied through unchanged.
    pub async fn caption_video(
        &self,
        job: &CaptionJob,
        video_in: &Path,
        out_mp4: &Path,
    ) -> Result<usize> {
        let segments = job.segments();
        if segments.is_empty() {
            logw("No caption segments (empty narration or zero duration); copying video through");
            fs::copy(video_in, out_mp4).await.with_context(|| {
                format!("copy {} -> {}", video_in.display(), out_mp4.display())
            })?;
            return Ok(0);
        }

        let staging = self.scratch("captions-")?;
        let ass_path = staging.path().join("captions.ass");
        fs::write(&ass_path, captions::generate_ass(&segments, &job.style()))
            .await
            .with_context(|| format!("write ass: {}", ass_path.display()))?;

        ffmpeg::burn_subtitles(video_in, &ass_path, out_mp4).await?;
        logok(format!(
            "Captioned {} ({} {} segments)",
            out_mp4.display(),
            segments.len(),
            job.mode.as_str()
        ));
        Ok(segments.len())
    }

    /// Synthesizes `job.narration`, lays it over `video_in` and burns in
    /// captions timed to the measured audio length (`job.duration` is
    /// ignored).
    pub async fn narrate_and_caption(
        &self,
        synth: &dyn SpeechSynthesizer,
        video_in: &Path,
        job: CaptionJob,
        out_mp4: &Path,
    ) -> Result<NarrationOutcome> {
        let staging = self.scratch("narration-")?;

        logi(format!("Synthesizing {} chars of narration", job.narration.len()));
        let audio = synth
            .synthesize(&job.narration)
            .await
            .context("speech synthesis failed")?;
        let audio_path = staging
            .path()
            .join(format!("narration.{}", synth.audio_extension()));
        fs::write(&audio_path, &audio)
            .await
            .with_context(|| format!("write audio: {}", audio_path.display()))?;

        let duration = ffmpeg::probe_duration(&audio_path).await?;
        logi(format!("Narration runs {:.2}s", duration));

        let narrated = staging.path().join("narrated.mp4");
        ffmpeg::merge_audio(video_in, &audio_path, &narrated).await?;

        let job = CaptionJob { duration, ..job };
        let segments = self.caption_video(&job, &narrated, out_mp4).await?;

        Ok(NarrationOutcome { duration, segments })
    }
}
