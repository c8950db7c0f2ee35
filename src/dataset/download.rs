// Dataset download helper.
//
// The regional CSVs are published on Google Drive. A file is fetched once
// into the data directory and read from disk on every later run; deleting
// the cached file forces a fresh download.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Direct-download endpoint for publicly shared Drive files.
const DRIVE_DOWNLOAD_URL: &str = "https://drive.google.com/uc";

/// Returns the default directory for cached datasets.
/// Uses the platform cache directory: ~/.cache/dcx/datasets/ on Linux.
pub fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dcx")
        .join("datasets")
}

/// Build the download URL for a Drive file id.
pub fn drive_url(file_id: &str) -> String {
    format!("{DRIVE_DOWNLOAD_URL}?export=download&confirm=t&id={file_id}")
}

/// Download a Drive file to `dest`, creating parent directories as needed.
pub async fn fetch_drive_file(file_id: &str, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }
    download_file(&drive_url(file_id), dest).await
}

/// Download a single file from a URL to a local path, with a progress bar.
async fn download_file(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::Client::new();
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = match response.content_length() {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .context("Invalid progress bar template")?
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .context("Invalid spinner template")?,
            );
            pb
        }
    };

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed to read response body")?
    {
        body.extend_from_slice(&chunk);
        pb.set_position(body.len() as u64);
    }
    pb.finish_and_clear();

    // Drive answers unknown or private ids with an HTML page, not an error status
    if body.starts_with(b"<!DOCTYPE html") || body.starts_with(b"<html") {
        anyhow::bail!("Download of {} returned an HTML page instead of a CSV", url);
    }

    std::fs::write(dest, &body).with_context(|| format!("Failed to write {}", dest.display()))?;

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}
