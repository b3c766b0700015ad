use async_trait::async_trait;
use influencer_media::api::{SpeechSynthesizer, TtsError};
use influencer_media::captions::{CaptionStyleOverrides, SegmentationMode};
use influencer_media::compose::{CaptionJob, Composer, write_caption_files};
use std::path::Path;
use tempfile::TempDir;

struct RejectingVoice;

#[async_trait]
impl SpeechSynthesizer for RejectingVoice {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, TtsError> {
        Err(TtsError::Status {
            status: 401,
            body: "invalid api key".to_string(),
        })
    }
}

fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn writes_srt_and_ass_side_by_side() {
    let dir = TempDir::new().unwrap();
    let job = CaptionJob::new("Hello world. Welcome back!", 4.0)
        .with_mode(SegmentationMode::Sentence)
        .with_preset(Some("boxed-bottom".to_string()));

    let files = write_caption_files(&job, &dir.path().join("captions"), "ep01")
        .await
        .unwrap();

    assert_eq!(files.segments, 2);
    assert_eq!(files.srt.file_name().unwrap(), "ep01.srt");
    let srt = std::fs::read_to_string(&files.srt).unwrap();
    assert!(srt.starts_with("1\n00:00:00,000 --> "));
    assert!(srt.contains("\n\n2\n"));

    let ass = std::fs::read_to_string(&files.ass).unwrap();
    assert_eq!(ass.matches("Dialogue:").count(), 2);
    // boxed preset draws an opaque box
    assert!(ass.contains(",0,3,"));
}

#[tokio::test]
async fn overrides_flow_into_rendered_script() {
    let overrides: CaptionStyleOverrides =
        serde_json::from_str(r#"{"fontFamily": "Roboto", "animationDuration": 0.5}"#).unwrap();
    let job = CaptionJob::new("one two three", 3.0).with_overrides(Some(overrides));

    let ass = job.render_ass();
    assert!(ass.contains("Style: Default,Roboto,48,"));
    assert!(ass.contains("{\\fad(500,250)}one two three"));
}

#[tokio::test]
async fn empty_narration_copies_video_through() {
    let dir = TempDir::new().unwrap();
    let video = dir.path().join("in.mp4");
    let out = dir.path().join("out.mp4");
    std::fs::write(&video, b"not really a video").unwrap();

    let scratch = TempDir::new().unwrap();
    let composer = Composer::with_scratch_root(scratch.path());
    let count = composer
        .caption_video(&CaptionJob::new("   ", 5.0), &video, &out)
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert_eq!(std::fs::read(&out).unwrap(), b"not really a video");
    assert_eq!(entries(scratch.path()), 0);
}

#[tokio::test]
async fn scratch_dir_removed_when_burn_in_fails() {
    let dir = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let composer = Composer::with_scratch_root(scratch.path());

    let result = composer
        .caption_video(
            &CaptionJob::new("this video does not exist", 2.0),
            &dir.path().join("missing.mp4"),
            &dir.path().join("out.mp4"),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(entries(scratch.path()), 0);
}

#[tokio::test]
async fn synthesis_failure_stops_before_ffmpeg() {
    let dir = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let composer = Composer::with_scratch_root(scratch.path());

    let err = composer
        .narrate_and_caption(
            &RejectingVoice,
            &dir.path().join("in.mp4"),
            CaptionJob::new("hello there", 0.0),
            &dir.path().join("out.mp4"),
        )
        .await
        .unwrap_err();

    let tts = err.downcast_ref::<TtsError>().unwrap();
    assert!(matches!(tts, TtsError::Status { status: 401, .. }));
    assert_eq!(entries(scratch.path()), 0);
    assert!(!dir.path().join("out.mp4").exists());
}
