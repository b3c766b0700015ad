use crate::{logi, logw};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed ({status}): {args:?}")]
    CommandFailed {
        program: String,
        status: String,
        args: Vec<String>,
    },

    #[error("ffprobe returned an unusable duration: {0:?}")]
    InvalidDuration(String),

    #[error("no input files to concatenate")]
    EmptyInput,

    #[error("failed to stage {}: {source}", .path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("expected output was not produced: {}", .0.display())]
    MissingOutput(PathBuf),
}

async fn run_cmd(args: &[String]) -> Result<(), ComposeError> {
    if args.is_empty() {
        return Ok(());
    }

    let mut cmd = Command::new(&args[0]);
    if args.len() > 1 {
        cmd.args(&args[1..]);
    }

    let status = cmd.status().await.map_err(|source| ComposeError::Spawn {
        program: args[0].clone(),
        source,
    })?;
    if !status.success() {
        return Err(ComposeError::CommandFailed {
            program: args[0].clone(),
            status: status.to_string(),
            args: args.to_vec(),
        });
    }

    Ok(())
}

fn ensure_output(out: &Path) -> Result<(), ComposeError> {
    if out.exists() {
        Ok(())
    } else {
        Err(ComposeError::MissingOutput(out.to_path_buf()))
    }
}

fn ffmpeg_base() -> Vec<String> {
    ["ffmpeg", "-y", "-hide_banner", "-loglevel", "error"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn push_all(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().map(|s| s.to_string()));
}

const H264_VIDEO: &[&str] = &[
    "-c:v", "libx264", "-pix_fmt", "yuv420p", "-preset", "veryfast", "-crf", "22",
];
const AAC_AUDIO: &[&str] = &["-c:a", "aac", "-b:a", "192k"];

/// Makes a path safe to interpolate into a single-quoted filter-graph
/// argument: forward slashes only, drive colons escaped, and each `'`
/// written as `'\''` (close quote, escaped quote, reopen).
pub fn filter_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let mut escaped = String::with_capacity(normalized.len() + 8);
    for ch in normalized.chars() {
        match ch {
            ':' => escaped.push_str("\\:"),
            '\'' => escaped.push_str("'\\''"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn burn_subtitles_args(video_in: &Path, subtitles: &Path, out_mp4: &Path) -> Vec<String> {
    let mut args = ffmpeg_base();
    args.push("-i".to_string());
    args.push(video_in.display().to_string());
    args.push("-vf".to_string());
    args.push(format!("subtitles='{}'", filter_path(subtitles)));
    push_all(&mut args, H264_VIDEO);
    push_all(&mut args, &["-c:a", "copy", "-movflags", "+faststart"]);
    args.push(out_mp4.display().to_string());
    args
}

/// Renders `subtitles` (ASS or SRT) into the video frames.
pub async fn burn_subtitles(
    video_in: &Path,
    subtitles: &Path,
    out_mp4: &Path,
) -> Result<(), ComposeError> {
    logi(format!(
        "Burning {} into {}",
        subtitles.display(),
        video_in.display()
    ));
    run_cmd(&burn_subtitles_args(video_in, subtitles, out_mp4)).await?;
    ensure_output(out_mp4)
}

/// Concat-demuxer list. Paths are made absolute because ffmpeg resolves
/// relative entries against the list file's own directory.
pub fn concat_list(inputs: &[PathBuf]) -> String {
    let mut list = String::new();
    for input in inputs {
        let absolute = std::path::absolute(input).unwrap_or_else(|_| input.clone());
        let quoted = absolute.to_string_lossy().replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\n", quoted));
    }
    list
}

pub fn concat_videos_args(list_txt: &Path, out_mp4: &Path) -> Vec<String> {
    let mut args = ffmpeg_base();
    push_all(&mut args, &["-f", "concat", "-safe", "0", "-i"]);
    args.push(list_txt.display().to_string());
    push_all(&mut args, H264_VIDEO);
    push_all(&mut args, AAC_AUDIO);
    push_all(&mut args, &["-movflags", "+faststart"]);
    args.push(out_mp4.display().to_string());
    args
}

/// Joins `inputs` end to end. The list file lives in a temp directory that
/// is removed when this returns, whatever the outcome.
pub async fn concat_videos(inputs: &[PathBuf], out_mp4: &Path) -> Result<(), ComposeError> {
    if inputs.is_empty() {
        return Err(ComposeError::EmptyInput);
    }

    let staging = tempfile::Builder::new()
        .prefix("concat-")
        .tempdir()
        .map_err(|source| ComposeError::Stage {
            path: std::env::temp_dir(),
            source,
        })?;
    let list_txt = staging.path().join("inputs.txt");
    tokio::fs::write(&list_txt, concat_list(inputs))
        .await
        .map_err(|source| ComposeError::Stage {
            path: list_txt.clone(),
            source,
        })?;

    logi(format!("Concatenating {} clips", inputs.len()));
    run_cmd(&concat_videos_args(&list_txt, out_mp4)).await?;
    ensure_output(out_mp4)
}

pub fn trim_video_args(input: &Path, start_s: f64, dur_s: f64, out_mp4: &Path) -> Vec<String> {
    let mut args = ffmpeg_base();
    args.push("-ss".to_string());
    args.push(format!("{:.3}", start_s.max(0.0)));
    args.push("-i".to_string());
    args.push(input.display().to_string());
    args.push("-t".to_string());
    args.push(format!("{:.3}", dur_s));
    push_all(&mut args, H264_VIDEO);
    push_all(&mut args, AAC_AUDIO);
    args.push(out_mp4.display().to_string());
    args
}

pub async fn trim_video(
    input: &Path,
    start_s: f64,
    dur_s: f64,
    out_mp4: &Path,
) -> Result<(), ComposeError> {
    if dur_s <= 0.0 {
        logw(format!("Refusing to trim {} to {:.3}s", input.display(), dur_s));
        return Err(ComposeError::InvalidDuration(format!("{dur_s}")));
    }
    run_cmd(&trim_video_args(input, start_s, dur_s, out_mp4)).await?;
    ensure_output(out_mp4)
}

pub fn merge_audio_args(video_in: &Path, audio_in: &Path, out_mp4: &Path) -> Vec<String> {
    let mut args = ffmpeg_base();
    args.push("-i".to_string());
    args.push(video_in.display().to_string());
    args.push("-i".to_string());
    args.push(audio_in.display().to_string());
    push_all(&mut args, &["-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy"]);
    push_all(&mut args, AAC_AUDIO);
    push_all(&mut args, &["-shortest", "-movflags", "+faststart"]);
    args.push(out_mp4.display().to_string());
    args
}

/// Replaces the video's audio track with `audio_in`, cut to the shorter of
/// the two streams.
pub async fn merge_audio(
    video_in: &Path,
    audio_in: &Path,
    out_mp4: &Path,
) -> Result<(), ComposeError> {
    run_cmd(&merge_audio_args(video_in, audio_in, out_mp4)).await?;
    ensure_output(out_mp4)
}

pub async fn probe_duration(path: &Path) -> Result<f64, ComposeError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|source| ComposeError::Spawn {
            program: "ffprobe".to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ComposeError::CommandFailed {
            program: "ffprobe".to_string(),
            status: output.status.to_string(),
            args: vec![path.display().to_string()],
        });
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    parse_probe_duration(&text)
}

/// ffprobe prints the container duration as a bare float; anything at or
/// below 0.1s is treated as a broken file.
pub fn parse_probe_duration(text: &str) -> Result<f64, ComposeError> {
    match text.trim().parse::<f64>() {
        Ok(duration) if duration.is_finite() && duration > 0.1 => Ok(duration),
        _ => Err(ComposeError::InvalidDuration(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_path_normalizes_windows_paths() {
        let path = Path::new(r"C:\Users\me\captions.ass");
        assert_eq!(filter_path(path), "C\\:/Users/me/captions.ass");
    }

    #[test]
    fn test_filter_path_escapes_quotes() {
        let path = Path::new("/tmp/it's/captions.ass");
        assert_eq!(filter_path(path), "/tmp/it'\\''s/captions.ass");
    }

    #[test]
    fn test_burn_args_reference_filter() {
        let args = burn_subtitles_args(
            Path::new("in.mp4"),
            Path::new("/tmp/job/captions.ass"),
            Path::new("out.mp4"),
        );
        assert_eq!(args[0], "ffmpeg");
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "subtitles='/tmp/job/captions.ass'");
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_concat_list_quotes() {
        let list = concat_list(&[PathBuf::from("/a/one.mp4"), PathBuf::from("/b/it's.mp4")]);
        assert_eq!(list, "file '/a/one.mp4'\nfile '/b/it'\\''s.mp4'\n");
    }

    #[test]
    fn test_concat_list_absolutizes() {
        let list = concat_list(&[PathBuf::from("clip.mp4")]);
        let line = list.trim_end();
        let inner = &line["file '".len()..line.len() - 1];
        assert!(Path::new(inner).is_absolute());
    }

    #[test]
    fn test_trim_args() {
        let args = trim_video_args(Path::new("in.mp4"), 1.5, 2.25, Path::new("out.mp4"));
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss + 1], "1.500");
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "2.250");
    }

    #[test]
    fn test_merge_args_maps_streams() {
        let args = merge_audio_args(Path::new("v.mp4"), Path::new("a.mp3"), Path::new("o.mp4"));
        let joined = args.join(" ");
        assert!(joined.contains("-map 0:v:0 -map 1:a:0"));
        assert!(joined.contains("-shortest"));
    }

    #[test]
    fn test_parse_probe_duration() {
        assert_eq!(parse_probe_duration("12.480000\n").unwrap(), 12.48);
        assert!(parse_probe_duration("N/A").is_err());
        assert!(parse_probe_duration("0.05").is_err());
    }

    #[tokio::test]
    async fn test_concat_rejects_empty() {
        let err = concat_videos(&[], Path::new("never.mp4")).await.unwrap_err();
        assert!(matches!(err, ComposeError::EmptyInput));
    }
}
