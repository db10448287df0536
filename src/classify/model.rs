//! Model artifact resolution
//!
//! Finds the ONNX model on disk, downloading it into the platform data
//! directory when a source URL is configured. Downloads stream to a temp
//! file with byte progress reported to the caller, optionally verify a
//! SHA-256 pin, and only then move into place, so a torn download never
//! masquerades as a model.

use anyhow::{bail, Context, Result};
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::ClassifierConfig;

/// Default model: the ONNX model zoo MNIST convnet (emits logits).
pub const DEFAULT_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/classification/mnist/model/mnist-8.onnx";

/// Filename used inside the cache directory
const CACHED_MODEL_NAME: &str = "mnist.onnx";

/// Path the model should live at: the configured override, or a stable
/// spot in the platform data directory.
pub fn model_cache_path(config: &ClassifierConfig) -> Result<PathBuf> {
    if let Some(path) = &config.model_path {
        return Ok(path.clone());
    }
    let dir = crate::config::data_dir()?.join("models");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create model directory {dir:?}"))?;
    Ok(dir.join(CACHED_MODEL_NAME))
}

/// Returns the model path, downloading first when the file is absent.
/// `progress` receives (downloaded bytes, total bytes if known).
pub fn ensure_model<F>(config: &ClassifierConfig, mut progress: F) -> Result<PathBuf>
where
    F: FnMut(u64, Option<u64>),
{
    let path = model_cache_path(config)?;
    if path.exists() {
        debug!("model already cached at {:?}", path);
        return Ok(path);
    }

    let Some(url) = config.model_url.as_deref() else {
        bail!("model file {path:?} is missing and no download URL is configured");
    };

    info!("downloading model from {}", url);
    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    rt.block_on(download_file(
        url,
        &path,
        config.sha256.as_deref(),
        &mut progress,
    ))?;
    info!("model saved to {:?}", path);
    Ok(path)
}

async fn download_file(
    url: &str,
    dest: &Path,
    expected_sha256: Option<&str>,
    progress: &mut dyn FnMut(u64, Option<u64>),
) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()
        .context("failed to create HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("model download request failed: {url}"))?;
    if !response.status().is_success() {
        bail!("model download failed with status {}: {url}", response.status());
    }

    let total = response.content_length();
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {parent:?}"))?;
    }

    // Stream into a sibling temp file; rename only after verification.
    let temp_path = dest.with_extension("download");
    let mut file = std::fs::File::create(&temp_path)
        .with_context(|| format!("failed to create temp file {temp_path:?}"))?;
    let mut hasher = Sha256::new();
    let mut downloaded = 0u64;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("error while reading download stream")?;
        file.write_all(&chunk).context("failed to write model bytes")?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;
        progress(downloaded, total);
    }
    file.flush().context("failed to flush model file")?;
    drop(file);

    let actual = format!("{:x}", hasher.finalize());
    if let Some(expected) = expected_sha256 {
        if !actual.eq_ignore_ascii_case(expected) {
            if let Err(e) = std::fs::remove_file(&temp_path) {
                warn!("failed to remove bad download {temp_path:?}: {e}");
            }
            bail!("model checksum mismatch: expected {expected}, got {actual}");
        }
        debug!("model checksum verified");
    }

    std::fs::rename(&temp_path, dest)
        .with_context(|| format!("failed to move model into place at {dest:?}"))?;
    Ok(())
}
