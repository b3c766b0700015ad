//! Caption timing engine.
//!
//! Turns narration text plus its spoken duration into timed segments and
//! renders them as SRT or styled ASS. Everything here is pure: no I/O, no
//! shared state, safe to call from any thread.
//!
//! ```
//! use influencer_media::captions::{CaptionEngine, SegmentationMode};
//!
//! let engine = CaptionEngine::new();
//! let segments = engine.generate_segments("Hello world", 4.0, SegmentationMode::Word);
//! let style = engine.resolve_style(Some("bold-center"), None);
//! let ass = engine.generate_ass(&segments, &style);
//! assert_eq!(segments.len(), 2);
//! assert!(ass.contains("Style: Default,Montserrat,64,"));
//! ```

mod markup;
mod segment;
mod style;
mod timecode;

pub use markup::{ASS_PLAY_RES, ass_style_line, fade_tag, generate_ass, generate_srt};
pub use segment::{
    CaptionSegment, SegmentationMode, WORDS_PER_CHUNK, chunk_words, generate_segments,
    split_sentences,
};
pub use style::{
    CaptionAnimation, CaptionPosition, CaptionPreset, CaptionStyle, CaptionStyleOverrides,
    TextTransform, ass_alignment, ass_color, find_preset, parse_hex_rgb, presets, resolve_style,
};
pub use timecode::{format_ass_time, format_srt_time};

/// Stateless facade over the free functions, for callers that prefer to
/// hold an engine value.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaptionEngine;

impl CaptionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_segments(
        &self,
        text: &str,
        total_duration: f64,
        mode: SegmentationMode,
    ) -> Vec<CaptionSegment> {
        generate_segments(text, total_duration, mode)
    }

    pub fn generate_srt(&self, segments: &[CaptionSegment]) -> String {
        generate_srt(segments)
    }

    pub fn generate_ass(&self, segments: &[CaptionSegment], style: &CaptionStyle) -> String {
        generate_ass(segments, style)
    }

    pub fn resolve_style(
        &self,
        preset_id: Option<&str>,
        custom: Option<&CaptionStyleOverrides>,
    ) -> CaptionStyle {
        resolve_style(preset_id, custom)
    }

    pub fn format_srt_time(&self, seconds: f64) -> String {
        format_srt_time(seconds)
    }

    pub fn format_ass_time(&self, seconds: f64) -> String {
        format_ass_time(seconds)
    }
}
