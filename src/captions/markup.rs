use super::segment::CaptionSegment;
use super::style::{CaptionStyle, ass_color};
use super::timecode::{format_ass_time, format_srt_time};

/// Reference canvas the ASS script is authored against.
pub const ASS_PLAY_RES: (u32, u32) = (1920, 1080);

const ASS_STYLE_NAME: &str = "Default";
const ASS_MARGIN_H: u32 = 40;
const ASS_MARGIN_V: u32 = 60;

const ASS_STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const ASS_EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// SubRip document. Blocks are numbered from 1 and separated by a blank line.
pub fn generate_srt(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                format_srt_time(seg.start_time),
                format_srt_time(seg.end_time),
                seg.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Complete ASS script: script info, one style built from `style`, and a
/// `Dialogue` event per segment.
pub fn generate_ass(segments: &[CaptionSegment], style: &CaptionStyle) -> String {
    let (play_x, play_y) = ASS_PLAY_RES;
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    out.push_str("ScriptType: v4.00+\n");
    out.push_str(&format!("PlayResX: {play_x}\n"));
    out.push_str(&format!("PlayResY: {play_y}\n"));
    out.push_str("WrapStyle: 0\n");
    out.push_str("ScaledBorderAndShadow: yes\n");
    out.push('\n');

    out.push_str("[V4+ Styles]\n");
    out.push_str(ASS_STYLE_FORMAT);
    out.push('\n');
    out.push_str(&ass_style_line(style));
    out.push('\n');
    out.push('\n');

    out.push_str("[Events]\n");
    out.push_str(ASS_EVENT_FORMAT);
    out.push('\n');

    let prefix = fade_tag(style.animation_duration).unwrap_or_default();
    for seg in segments {
        let text = escape_dialogue_text(&style.text_transform.apply(&seg.text));
        out.push_str(&format!(
            "Dialogue: 0,{},{},{ASS_STYLE_NAME},,0,0,0,,{prefix}{text}\n",
            format_ass_time(seg.start_time),
            format_ass_time(seg.end_time),
        ));
    }

    out
}

/// The `Style:` line for `style`.
///
/// With a visible background the style switches to an opaque box
/// (`BorderStyle` 3), which libass paints in the outline color.
pub fn ass_style_line(style: &CaptionStyle) -> String {
    let primary = ass_color(&style.color, None);
    let back = ass_color(&style.background_color, Some(style.background_opacity));
    let (border_style, outline) = if style.has_background() {
        (3, back.clone())
    } else {
        (1, ass_color(&style.stroke_color, None))
    };
    let bold = if style.is_bold() { -1 } else { 0 };

    format!(
        "Style: {ASS_STYLE_NAME},{font},{size},{primary},{primary},{outline},{back},{bold},0,0,0,100,100,{spacing},0,{border_style},{outline_width},0,{alignment},{ASS_MARGIN_H},{ASS_MARGIN_H},{ASS_MARGIN_V},1",
        font = style.font_family.replace(',', " "),
        size = style.font_size,
        spacing = style.letter_spacing,
        outline_width = style.stroke_width.max(0.0),
        alignment = style.position.ass_alignment(),
    )
}

/// `{\fad(in,out)}` with the fade-out fixed at half the fade-in.
pub fn fade_tag(animation_duration: f64) -> Option<String> {
    if animation_duration.is_nan() || animation_duration <= 0.0 {
        return None;
    }
    let fade_in_ms = (animation_duration * 1000.0).round() as u64;
    Some(format!("{{\\fad({},{})}}", fade_in_ms, fade_in_ms / 2))
}

// Newlines become hard breaks. Backslashes and braces are escaped so caption
// text cannot open an override block or spell `\N`/`\h` codes.
fn escape_dialogue_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\\', "\\\\")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('\n', "\\N")
}
