//! Image acquisition: populate the local image store from the index page.
//!
//! Every flag image on the index tables is saved as `{index:03}_{stem}{ext}`
//! in `config.flags_dir`. A file that already exists is left alone and no
//! request is made for it, so an interrupted run can simply be restarted.
//! Writes go through a temporary file in the same directory and are renamed
//! into place; a crash never leaves a truncated image behind.

use crate::config::PipelineConfig;
use crate::error::{EntityError, FlagDeckError};
use crate::model::FlagImage;
use crate::output::{DownloadOutcome, DownloadSummary};
use crate::pipeline::fetch::{fetch_index, HttpFetcher, PageFetcher};
use crate::pipeline::resize::prepare_image;
use crate::pipeline::table::extract_flag_images;
use crate::pipeline::text::sanitize_filename;
use reqwest::Url;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extension used when the image URL has none.
const DEFAULT_EXTENSION: &str = ".png";

/// Download every flag image listed on the index page.
///
/// # Errors
/// Fatal only when the store directory cannot be created, the index page is
/// unreachable, or no flag image is found. Individual download failures are
/// counted in [`DownloadSummary::failed`].
pub async fn download_flags(config: &PipelineConfig) -> Result<DownloadSummary, FlagDeckError> {
    let fetcher = HttpFetcher::new(&config.user_agent)
        .map_err(|e| FlagDeckError::Internal(format!("HTTP client: {e}")))?;
    download_flags_with(&fetcher, config).await
}

/// [`download_flags`] with an explicit fetcher.
pub async fn download_flags_with<F: PageFetcher>(
    fetcher: &F,
    config: &PipelineConfig,
) -> Result<DownloadSummary, FlagDeckError> {
    let total_start = Instant::now();

    std::fs::create_dir_all(&config.flags_dir).map_err(|e| FlagDeckError::CreateDirFailed {
        path: config.flags_dir.clone(),
        source: e,
    })?;

    let html = fetch_index(fetcher, config).await?;
    let images = extract_flag_images(&html, config);
    drop(html);
    info!("Found {} flag images", images.len());
    if images.is_empty() {
        return Err(FlagDeckError::NoFlagImages {
            url: config.index_url.clone(),
        });
    }

    let total = images.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    let mut summary = DownloadSummary {
        found: total,
        downloaded: 0,
        already_present: 0,
        failed: 0,
        flags_dir: config.flags_dir.clone(),
        total_duration_ms: 0,
    };

    for (i, image) in images.iter().enumerate() {
        let index = i + 1;
        let file_name = image_file_name(image, index);
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_start(index, total, &file_name);
        }

        let outcome = download_image(fetcher, image, index, config).await;
        match &outcome {
            DownloadOutcome::Downloaded(_) => summary.downloaded += 1,
            DownloadOutcome::AlreadyPresent(_) => summary.already_present += 1,
            DownloadOutcome::Failed(_) => summary.failed += 1,
        }

        if let Some(ref cb) = config.progress_callback {
            match &outcome {
                DownloadOutcome::Failed(e) => {
                    cb.on_item_skipped(index, total, &file_name, &e.to_string())
                }
                _ => cb.on_item_complete(index, total, &file_name),
            }
        }

        if outcome.hit_network() {
            tokio::time::sleep(config.request_delay()).await;
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, summary.downloaded + summary.already_present);
    }

    summary.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Download complete: {} downloaded, {} already present, {} failed, {}ms total",
        summary.downloaded, summary.already_present, summary.failed, summary.total_duration_ms
    );
    Ok(summary)
}

/// Fetch one image into the store unless its file already exists.
pub async fn download_image<F: PageFetcher>(
    fetcher: &F,
    image: &FlagImage,
    index: usize,
    config: &PipelineConfig,
) -> DownloadOutcome {
    let file_name = image_file_name(image, index);
    let path = config.flags_dir.join(&file_name);

    if path.exists() {
        info!("Skipping (already exists): {}", file_name);
        return DownloadOutcome::AlreadyPresent(path);
    }

    info!("Downloading: {}", file_name);
    let bytes = match fetcher
        .fetch_bytes(&image.url, Some(config.image_timeout()))
        .await
    {
        Ok(b) => b,
        Err(e) => {
            let err = EntityError::DownloadFailed {
                file: file_name,
                reason: e.to_string(),
            };
            warn!("{}", err);
            return DownloadOutcome::Failed(err);
        }
    };

    let bytes = if config.resize_images {
        match prepare_image(bytes, &file_name, config.max_image_dimension).await {
            Ok(b) => b,
            Err(e) => {
                warn!("{}", e);
                return DownloadOutcome::Failed(e);
            }
        }
    } else {
        bytes
    };

    match write_atomic(&config.flags_dir, &path, &bytes) {
        Ok(()) => {
            debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
            DownloadOutcome::Downloaded(path)
        }
        Err(reason) => {
            let err = EntityError::WriteFailed {
                file: file_name,
                reason,
            };
            warn!("{}", err);
            DownloadOutcome::Failed(err)
        }
    }
}

/// Store file name for the `index`-th (1-based) image.
///
/// The stem is the sanitised alt text, or the URL's base name when the alt
/// text is blank. The URL's extension (default `.png`) is appended unless the
/// stem already ends with it.
pub fn image_file_name(image: &FlagImage, index: usize) -> String {
    let url_base = url_basename(&image.url);
    let ext = extension_of(&url_base).unwrap_or(DEFAULT_EXTENSION);

    let stem = if image.alt_text.trim().is_empty() {
        url_base.clone()
    } else {
        sanitize_filename(&image.alt_text)
    };

    let name = if stem.ends_with(ext) {
        stem
    } else {
        format!("{stem}{ext}")
    };
    format!("{index:03}_{name}")
}

/// Last path segment of `url`, without query or fragment.
fn url_basename(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(u) => u.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    path.rsplit('/').next().unwrap_or_default().to_string()
}

/// Extension of a base name including the dot; leading dots do not count.
fn extension_of(base: &str) -> Option<&str> {
    let stripped = base.trim_start_matches('.');
    stripped.rfind('.').map(|i| &stripped[i..])
}

fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), String> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| e.to_string())?;
    tmp.write_all(bytes).map_err(|e| e.to_string())?;
    tmp.persist(target).map_err(|e| e.error.to_string())?;
    Ok(())
}
