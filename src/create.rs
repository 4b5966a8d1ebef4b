//! Deck-creation entry points.
//!
//! [`create_deck`] runs the whole flow against the live site and writes an
//! Anki package. [`create_deck_with`] takes the fetcher and writer explicitly
//! so the same orchestration runs against canned pages in tests.
//!
//! Fatal conditions (missing or empty image store, unreachable index page, no
//! candidates, unwritable package) abort with a [`FlagDeckError`]. Everything
//! per-entity is logged, counted and skipped.

use crate::config::PipelineConfig;
use crate::error::{EntityError, FlagDeckError};
use crate::output::DeckSummary;
use crate::package::{ApkgWriter, PackageWriter};
use crate::pipeline::deck::assemble_deck;
use crate::pipeline::fetch::{fetch_index, HttpFetcher, PageFetcher};
use crate::pipeline::matcher::AssetStore;
use crate::pipeline::table::extract_candidates;
use crate::stream::{collect_records, enrich_stream};
use std::time::Instant;
use tracing::{debug, info};

/// Build the flag deck from the local image store and write it to
/// `config.output_file`.
///
/// # Errors
/// Returns `Err(FlagDeckError)` only for fatal errors:
/// - image store missing or empty
/// - index page unreachable
/// - no candidates on the index page
/// - package could not be written
pub async fn create_deck(config: &PipelineConfig) -> Result<DeckSummary, FlagDeckError> {
    let fetcher = HttpFetcher::new(&config.user_agent)
        .map_err(|e| FlagDeckError::Internal(format!("HTTP client: {e}")))?;
    create_deck_with(&fetcher, &ApkgWriter, config).await
}

/// [`create_deck`] with an explicit fetcher and package writer.
pub async fn create_deck_with<F, W>(
    fetcher: &F,
    writer: &W,
    config: &PipelineConfig,
) -> Result<DeckSummary, FlagDeckError>
where
    F: PageFetcher,
    W: PackageWriter,
{
    let total_start = Instant::now();
    info!("Creating deck '{}'", config.deck_title);

    // ── Step 1: Local image store ────────────────────────────────────────
    let store = AssetStore::open(&config.flags_dir, config.sort_assets)?;
    info!(
        "Found {} flag images in {}",
        store.len(),
        store.dir().display()
    );

    // ── Step 2: Index page ───────────────────────────────────────────────
    let html = fetch_index(fetcher, config).await?;

    // ── Step 3: Candidates ───────────────────────────────────────────────
    let candidates = extract_candidates(&html, config);
    drop(html);
    info!("Found {} countries", candidates.len());
    if candidates.is_empty() {
        return Err(FlagDeckError::NoCandidates {
            url: config.index_url.clone(),
        });
    }

    // ── Step 4: Match and enrich ─────────────────────────────────────────
    let total = candidates.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    let (records, errors) =
        collect_records(enrich_stream(fetcher, candidates, &store, config)).await;

    let unmatched = errors
        .iter()
        .filter(|e| matches!(e, EntityError::NoAsset { .. }))
        .count();
    let enriched = records
        .iter()
        .filter(|r| !r.description.is_empty() || !r.adoption_date.is_empty())
        .count();
    info!(
        "Successfully processed {} countries with flag images ({} enriched, {} unmatched)",
        records.len(),
        enriched,
        unmatched
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, records.len());
    }

    // ── Step 5: Assemble ─────────────────────────────────────────────────
    let assembled = assemble_deck(&records, config);
    debug!(
        "Assembled {} cards ({} skipped)",
        assembled.added, assembled.skipped
    );

    // ── Step 6: Write package ────────────────────────────────────────────
    writer.write(&assembled.deck, &assembled.media_files, &config.output_file)?;

    let summary = DeckSummary {
        candidates: total,
        matched: records.len(),
        unmatched,
        enriched,
        cards_added: assembled.added,
        cards_skipped: assembled.skipped,
        media_files: assembled.media_files.len(),
        output_file: config.output_file.clone(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Deck complete: {} cards added, {} skipped, {}ms total",
        summary.cards_added, summary.cards_skipped, summary.total_duration_ms
    );
    Ok(summary)
}

/// Synchronous wrapper around [`create_deck`].
///
/// Creates a temporary tokio runtime internally.
pub fn create_deck_sync(config: &PipelineConfig) -> Result<DeckSummary, FlagDeckError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FlagDeckError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(create_deck(config))
}
