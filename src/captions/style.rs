//! Caption styling: the flat `CaptionStyle` record, static presets and
//! the preset + override merge used before rendering.
//!
//! Colors are stored the way the editor produces them (`#RRGGBB`) and only
//! converted to ASS channel order at render time by [`ass_color`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize};

/// Vertical placement of the caption block on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum CaptionPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

impl CaptionPosition {
    /// Unknown values land at the bottom of the frame.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Self::Top,
            "center" | "middle" => Self::Center,
            _ => Self::Bottom,
        }
    }

    /// ASS numpad alignment numeral (horizontally centered).
    pub fn ass_alignment(self) -> u8 {
        match self {
            Self::Top => 8,
            Self::Center => 5,
            Self::Bottom => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

impl From<String> for CaptionPosition {
    fn from(value: String) -> Self {
        Self::parse_lossy(&value)
    }
}

/// Alignment numeral for a raw position string as it arrives from a request.
pub fn ass_alignment(position: &str) -> u8 {
    CaptionPosition::parse_lossy(position).ass_alignment()
}

/// How each caption card enters the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum CaptionAnimation {
    None,
    #[default]
    Fade,
    Pop,
    Slide,
    Typewriter,
}

impl From<String> for CaptionAnimation {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "fade" => Self::Fade,
            "pop" => Self::Pop,
            "slide" => Self::Slide,
            "typewriter" => Self::Typewriter,
            _ => Self::None,
        }
    }
}

/// Letter-case transform applied to caption text before it is burned in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl From<String> for TextTransform {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "uppercase" => Self::Uppercase,
            "lowercase" => Self::Lowercase,
            "capitalize" => Self::Capitalize,
            _ => Self::None,
        }
    }
}

impl TextTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => capitalize_words(text),
        }
    }
}

// Upper-cases the first letter of every whitespace-delimited word and leaves
// the rest untouched.
fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Visual parameters for one caption track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionStyle {
    pub font_family: String,
    /// Font size in points at the 1920x1080 reference canvas.
    pub font_size: f64,
    /// CSS-style weight; 700 and above renders bold.
    #[serde(deserialize_with = "weight_from_number")]
    pub font_weight: u16,
    /// Text color, `#RRGGBB`.
    pub color: String,
    pub background_color: String,
    /// 0.0 (transparent) to 1.0 (opaque).
    pub background_opacity: f64,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub letter_spacing: f64,
    pub position: CaptionPosition,
    pub animation: CaptionAnimation,
    /// Entry animation length in seconds.
    pub animation_duration: f64,
    pub text_transform: TextTransform,
    /// Only meaningful for the live preview; ASS has no rounded boxes.
    pub border_radius: f64,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 48.0,
            font_weight: 700,
            color: "#FFFFFF".to_string(),
            background_color: "#000000".to_string(),
            background_opacity: 0.0,
            stroke_color: "#000000".to_string(),
            stroke_width: 2.0,
            letter_spacing: 0.0,
            position: CaptionPosition::Bottom,
            animation: CaptionAnimation::Fade,
            animation_duration: 0.3,
            text_transform: TextTransform::None,
            border_radius: 8.0,
        }
    }
}

impl CaptionStyle {
    pub fn is_bold(&self) -> bool {
        self.font_weight >= 700
    }

    pub fn has_background(&self) -> bool {
        self.background_opacity > 0.0
    }
}

/// Field-level overrides; `None` keeps whatever the base style says.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionStyleOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_weight_from_number"
    )]
    pub font_weight: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<CaptionPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<CaptionAnimation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<TextTransform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
}

impl CaptionStyleOverrides {
    /// Shallow merge onto `base`, returning a new style.
    pub fn apply(&self, base: &CaptionStyle) -> CaptionStyle {
        let base = base.clone();
        CaptionStyle {
            font_family: self.font_family.clone().unwrap_or(base.font_family),
            font_size: self.font_size.unwrap_or(base.font_size),
            font_weight: self.font_weight.unwrap_or(base.font_weight),
            color: self.color.clone().unwrap_or(base.color),
            background_color: self.background_color.clone().unwrap_or(base.background_color),
            background_opacity: self.background_opacity.unwrap_or(base.background_opacity),
            stroke_color: self.stroke_color.clone().unwrap_or(base.stroke_color),
            stroke_width: self.stroke_width.unwrap_or(base.stroke_width),
            letter_spacing: self.letter_spacing.unwrap_or(base.letter_spacing),
            position: self.position.unwrap_or(base.position),
            animation: self.animation.unwrap_or(base.animation),
            animation_duration: self.animation_duration.unwrap_or(base.animation_duration),
            text_transform: self.text_transform.unwrap_or(base.text_transform),
            border_radius: self.border_radius.unwrap_or(base.border_radius),
        }
    }
}

// Editors send weights as plain JSON numbers, occasionally fractional.
fn round_weight(value: f64) -> u16 {
    value.round().clamp(0.0, 1000.0) as u16
}

fn weight_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    f64::deserialize(deserializer).map(round_weight)
}

fn optional_weight_from_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u16>, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map(round_weight))
}

/// A named style bundle offered in the caption picker.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionPreset {
    pub id: String,
    pub name: String,
    pub style: CaptionStyle,
}

impl CaptionPreset {
    fn new(id: &str, name: &str, style: CaptionStyle) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            style,
        }
    }
}

static PRESETS: Lazy<Vec<CaptionPreset>> = Lazy::new(|| {
    vec![
        CaptionPreset::new(
            "bold-center",
            "Bold Center",
            CaptionStyle {
                font_family: "Montserrat".to_string(),
                font_size: 64.0,
                font_weight: 800,
                stroke_width: 4.0,
                position: CaptionPosition::Center,
                animation: CaptionAnimation::Pop,
                animation_duration: 0.2,
                text_transform: TextTransform::Uppercase,
                ..CaptionStyle::default()
            },
        ),
        CaptionPreset::new(
            "minimal-bottom",
            "Minimal Bottom",
            CaptionStyle {
                font_family: "Inter".to_string(),
                font_size: 42.0,
                font_weight: 500,
                stroke_width: 1.0,
                ..CaptionStyle::default()
            },
        ),
        CaptionPreset::new(
            "boxed-bottom",
            "Boxed Bottom",
            CaptionStyle {
                font_size: 44.0,
                font_weight: 600,
                background_opacity: 0.6,
                stroke_width: 0.0,
                border_radius: 12.0,
                animation_duration: 0.25,
                ..CaptionStyle::default()
            },
        ),
        CaptionPreset::new(
            "headline-top",
            "Headline Top",
            CaptionStyle {
                font_family: "Bebas Neue".to_string(),
                font_size: 72.0,
                color: "#FFD400".to_string(),
                stroke_width: 3.0,
                letter_spacing: 2.0,
                position: CaptionPosition::Top,
                animation: CaptionAnimation::Slide,
                text_transform: TextTransform::Uppercase,
                ..CaptionStyle::default()
            },
        ),
        CaptionPreset::new(
            "neon-pop",
            "Neon Pop",
            CaptionStyle {
                font_family: "Poppins".to_string(),
                font_size: 56.0,
                color: "#39FF14".to_string(),
                stroke_color: "#1A0033".to_string(),
                stroke_width: 3.0,
                position: CaptionPosition::Center,
                animation: CaptionAnimation::Pop,
                animation_duration: 0.15,
                ..CaptionStyle::default()
            },
        ),
    ]
});

pub fn presets() -> &'static [CaptionPreset] {
    &PRESETS
}

pub fn find_preset(id: &str) -> Option<&'static CaptionPreset> {
    PRESETS.iter().find(|preset| preset.id == id)
}

/// Preset (or the default style) with `custom` layered on top. Unknown
/// preset ids fall back to the default style.
pub fn resolve_style(
    preset_id: Option<&str>,
    custom: Option<&CaptionStyleOverrides>,
) -> CaptionStyle {
    let base = preset_id
        .and_then(find_preset)
        .map(|preset| preset.style.clone())
        .unwrap_or_default();

    match custom {
        Some(overrides) => overrides.apply(&base),
        None => base,
    }
}

/// Parses `#RRGGBB` (or the `#RGB` shorthand) into channels.
pub fn parse_hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    if !expanded.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
    let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
    let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Converts `#RRGGBB` to ASS `&HAABBGGRR&`.
///
/// ASS alpha is inverted: `00` is opaque. Without an opacity the color is
/// fully opaque; otherwise alpha is `round((1 - opacity) * 255)`. Colors
/// that do not parse render white.
pub fn ass_color(hex: &str, opacity: Option<f64>) -> String {
    let (r, g, b) = parse_hex_rgb(hex).unwrap_or((255, 255, 255));
    let alpha = match opacity {
        Some(opacity) => ((1.0 - opacity.clamp(0.0, 1.0)) * 255.0).round() as u8,
        None => 0,
    };
    format!("&H{alpha:02X}{b:02X}{g:02X}{r:02X}&")
}
