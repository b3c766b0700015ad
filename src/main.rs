use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueHint};
use influencer_media::api::elevenlabs::ElevenLabsClient;
use influencer_media::captions::{self, CaptionStyleOverrides, SegmentationMode};
use influencer_media::compose::{CaptionJob, Composer};
use influencer_media::config::Config;
use influencer_media::init;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "influencer-media",
    version,
    about = "Caption timing and media composition for persona videos"
)]
struct Cli {
    /// JSON config file; missing means defaults
    #[arg(long, global = true, default_value = "config.json", value_hint = ValueHint::FilePath)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print timed caption segments as JSON
    Segments(CaptionArgs),
    /// Render an SRT document
    Srt(RenderArgs),
    /// Render an ASS script
    Ass(RenderArgs),
    /// List caption style presets
    Presets,
    /// Burn captions into an existing video
    Burn(BurnArgs),
    /// Synthesize narration, lay it over a video and burn in captions
    Narrate(NarrateArgs),
}

#[derive(Args, Debug)]
struct CaptionArgs {
    /// Narration text
    text: String,

    /// Spoken length of the narration in seconds
    #[arg(short, long)]
    duration: f64,

    /// Segmentation mode: word, sentence or timed
    #[arg(short, long)]
    mode: Option<String>,
}

#[derive(Args, Debug)]
struct StyleArgs {
    /// Caption preset id (see `presets`)
    #[arg(short, long)]
    preset: Option<String>,

    /// Style overrides as camelCase JSON, e.g. '{"fontSize": 40}'
    #[arg(long)]
    style: Option<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    caption: CaptionArgs,

    #[command(flatten)]
    style: StyleArgs,

    /// Write to this file instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BurnArgs {
    /// Source video
    #[arg(value_hint = ValueHint::FilePath)]
    video: PathBuf,

    #[command(flatten)]
    caption: CaptionArgs,

    #[command(flatten)]
    style: StyleArgs,

    /// Captioned output video
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct NarrateArgs {
    /// Source video; its audio track is replaced by the narration
    #[arg(value_hint = ValueHint::FilePath)]
    video: PathBuf,

    /// Narration text
    text: String,

    /// Segmentation mode: word, sentence or timed
    #[arg(short, long)]
    mode: Option<String>,

    #[command(flatten)]
    style: StyleArgs,

    /// Narrated, captioned output video
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    out: PathBuf,
}

fn parse_overrides(style: &StyleArgs) -> Result<Option<CaptionStyleOverrides>> {
    style
        .style
        .as_deref()
        .map(|json| serde_json::from_str(json).context("--style is not valid style JSON"))
        .transpose()
}

fn resolve_mode(mode: Option<&str>, cfg: &Config) -> SegmentationMode {
    mode.map(SegmentationMode::parse_lossy)
        .unwrap_or(cfg.caption_mode)
}

fn build_job(
    text: &str,
    duration: f64,
    mode: Option<&str>,
    style: &StyleArgs,
    cfg: &Config,
) -> Result<CaptionJob> {
    Ok(CaptionJob::new(text, duration)
        .with_mode(resolve_mode(mode, cfg))
        .with_preset(style.preset.clone().or_else(|| cfg.caption_preset.clone()))
        .with_overrides(parse_overrides(style)?))
}

async fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => tokio::fs::write(path, text)
            .await
            .with_context(|| format!("write {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

async fn prepare_video_work(cfg: &Config) -> Result<()> {
    init::ensure_directories(&cfg.output_dir).await?;
    if !init::check_ffmpeg().await {
        tracing::warn!("FFmpeg/ffprobe not found in PATH. Please install FFmpeg.");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = Config::load_or_default(&cli.config).await?;

    match cli.command {
        Commands::Segments(args) => {
            let mode = resolve_mode(args.mode.as_deref(), &cfg);
            let segments = captions::generate_segments(&args.text, args.duration, mode);
            println!("{}", serde_json::to_string_pretty(&segments)?);
        }
        Commands::Srt(args) => {
            let job = build_job(
                &args.caption.text,
                args.caption.duration,
                args.caption.mode.as_deref(),
                &args.style,
                &cfg,
            )?;
            emit(&job.render_srt(), args.out.as_deref()).await?;
        }
        Commands::Ass(args) => {
            let job = build_job(
                &args.caption.text,
                args.caption.duration,
                args.caption.mode.as_deref(),
                &args.style,
                &cfg,
            )?;
            emit(&job.render_ass(), args.out.as_deref()).await?;
        }
        Commands::Presets => {
            for preset in captions::presets() {
                println!(
                    "{:<16} {:<16} {}",
                    preset.id,
                    preset.name,
                    preset.style.position.as_str()
                );
            }
        }
        Commands::Burn(args) => {
            prepare_video_work(&cfg).await?;
            let job = build_job(
                &args.caption.text,
                args.caption.duration,
                args.caption.mode.as_deref(),
                &args.style,
                &cfg,
            )?;
            let count = Composer::new()
                .caption_video(&job, &args.video, &args.out)
                .await?;
            println!("{} ({} caption segments)", args.out.display(), count);
        }
        Commands::Narrate(args) => {
            prepare_video_work(&cfg).await?;
            let job = build_job(&args.text, 0.0, args.mode.as_deref(), &args.style, &cfg)?;
            let tts = ElevenLabsClient::from_config(&cfg)?;
            let outcome = Composer::new()
                .narrate_and_caption(&tts, &args.video, job, &args.out)
                .await?;
            println!(
                "{} ({:.2}s narration, {} caption segments)",
                args.out.display(),
                outcome.duration,
                outcome.segments
            );
        }
    }

    Ok(())
}
