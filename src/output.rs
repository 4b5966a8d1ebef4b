//! Run results returned by the top-level entry points.

use crate::error::EntityError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of a deck-creation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSummary {
    /// Candidates extracted from the index page.
    pub candidates: usize,
    /// Candidates paired with a local image.
    pub matched: usize,
    /// Candidates with no local image.
    pub unmatched: usize,
    /// Matched records that received at least one detail field.
    pub enriched: usize,
    pub cards_added: usize,
    pub cards_skipped: usize,
    /// Media files bundled into the package.
    pub media_files: usize,
    pub output_file: PathBuf,
    pub total_duration_ms: u64,
}

/// Summary of an image-download run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSummary {
    /// Flag images found on the index page.
    pub found: usize,
    pub downloaded: usize,
    /// Files already in the store; not fetched again.
    pub already_present: usize,
    pub failed: usize,
    pub flags_dir: PathBuf,
    pub total_duration_ms: u64,
}

/// Result of one image download attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadOutcome {
    /// Fetched, transformed and written.
    Downloaded(PathBuf),
    /// The file existed; no request was made.
    AlreadyPresent(PathBuf),
    Failed(EntityError),
}

impl DownloadOutcome {
    /// True when a network request was issued.
    pub fn hit_network(&self) -> bool {
        !matches!(self, DownloadOutcome::AlreadyPresent(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_present_makes_no_request() {
        let o = DownloadOutcome::AlreadyPresent(PathBuf::from("flags/001_a.png"));
        assert!(!o.hit_network());
    }

    #[test]
    fn failed_download_counts_as_request() {
        let o = DownloadOutcome::Failed(EntityError::DownloadFailed {
            file: "001_a.png".into(),
            reason: "HTTP 500".into(),
        });
        assert!(o.hit_network());
    }

    #[test]
    fn summary_serialises_to_json() {
        let s = DeckSummary {
            candidates: 3,
            matched: 2,
            unmatched: 1,
            enriched: 2,
            cards_added: 2,
            cards_skipped: 0,
            media_files: 2,
            output_file: PathBuf::from("National_Flags.apkg"),
            total_duration_ms: 12,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"cards_added\":2"));
    }
}
