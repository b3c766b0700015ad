use crate::logi;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

const REQUIRED_DIRS: &[&str] = &["captions", "rendered"];

/// Creates the working folders under `output_dir`.
pub async fn ensure_directories(output_dir: &Path) -> Result<()> {
    for dir in REQUIRED_DIRS {
        let path = output_dir.join(dir);
        if !path.exists() {
            fs::create_dir_all(&path)
                .await
                .with_context(|| format!("Failed to create dir {}", path.display()))?;
            logi(format!("Created directory: {}", path.display()));
        }
    }
    Ok(())
}

async fn tool_runs(program: &str) -> bool {
    match tokio::process::Command::new(program)
        .arg("-version")
        .output()
        .await
    {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

/// Both `ffmpeg` and `ffprobe` are needed for any video work.
pub async fn check_ffmpeg() -> bool {
    tool_runs("ffmpeg").await && tool_runs("ffprobe").await
}
