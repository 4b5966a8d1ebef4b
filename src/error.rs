//! Error types for the flagdeck library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FlagDeckError`] - **Fatal**: the run cannot proceed at all (no local
//!   image store, unreachable index page, unwritable package). Returned as
//!   `Err(FlagDeckError)` from the top-level entry points; the CLI exits
//!   non-zero.
//!
//! * [`EntityError`] - **Non-fatal**: one entity lost its asset match, detail
//!   page or image download. Logged and counted; every other entity proceeds.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the flagdeck library.
#[derive(Debug, Error)]
pub enum FlagDeckError {
    // ── Local store errors ────────────────────────────────────────────────
    /// The image directory does not exist.
    #[error("Flags directory '{path}' not found!\nRun `flagdeck download` first to download flag images.")]
    AssetDirMissing { path: PathBuf },

    /// The image directory exists but cannot be listed.
    #[error("Cannot read flags directory '{path}': {source}")]
    AssetDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image directory exists but holds no files.
    #[error("No flag images found in '{path}'!\nRun `flagdeck download` first to download flag images.")]
    AssetDirEmpty { path: PathBuf },

    /// The image directory could not be created.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Index page errors ─────────────────────────────────────────────────
    /// The index page could not be fetched.
    #[error("Error fetching index page '{url}': {reason}")]
    IndexFetchFailed { url: String, reason: String },

    /// The index page parsed but no table row yielded a candidate.
    #[error("No countries found on '{url}'")]
    NoCandidates { url: String },

    /// The index page parsed but no flag image was found.
    #[error("No flag images found on '{url}'")]
    NoFlagImages { url: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The package file could not be produced.
    #[error("Failed to write package '{path}': {reason}")]
    PackageWriteFailed { path: PathBuf, reason: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single entity or image.
///
/// The run continues; callers see these in logs, progress events and
/// the [`crate::stream::RecordStream`] items.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum EntityError {
    /// No local image file matched the entity.
    #[error("Could not find flag image for {entity}")]
    NoAsset { entity: String },

    /// The detail page was unreachable or returned a non-success status.
    #[error("Could not fetch details for {entity} from {url}: {reason}")]
    DetailUnavailable {
        entity: String,
        url: String,
        reason: String,
    },

    /// An image download failed.
    #[error("Error downloading {file}: {reason}")]
    DownloadFailed { file: String, reason: String },

    /// A downloaded image could not be written to the store.
    #[error("Error writing {file}: {reason}")]
    WriteFailed { file: String, reason: String },
}
