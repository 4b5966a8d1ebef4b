//! Streaming enrichment: emit joined records as each candidate is processed.
//!
//! Candidates are handled strictly one at a time and in order. For each one
//! the stream yields either `Ok(JoinedRecord)` (a local image matched, detail
//! enrichment attempted, fixed delay observed) or
//! `Err(EntityError::NoAsset)`. A failed detail fetch never surfaces as an
//! item error: the record is still yielded with empty detail fields.

use crate::config::PipelineConfig;
use crate::error::EntityError;
use crate::model::{Candidate, JoinedRecord};
use crate::pipeline::detail::fetch_detail;
use crate::pipeline::fetch::PageFetcher;
use crate::pipeline::matcher::AssetStore;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::{debug, info, warn};

/// A boxed stream of per-candidate results.
pub type RecordStream<'a> =
    Pin<Box<dyn Stream<Item = Result<JoinedRecord, EntityError>> + Send + 'a>>;

/// Match each candidate against `store` and enrich the matches.
///
/// # Example
/// ```rust,no_run
/// use flagdeck::pipeline::{fetch::{fetch_index, HttpFetcher}, matcher::AssetStore, table};
/// use flagdeck::{enrich_stream, PipelineConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PipelineConfig::default();
/// let fetcher = HttpFetcher::new(&config.user_agent)?;
/// let store = AssetStore::open(&config.flags_dir, true)?;
/// let html = fetch_index(&fetcher, &config).await?;
/// let candidates = table::extract_candidates(&html, &config);
///
/// let mut records = enrich_stream(&fetcher, candidates, &store, &config);
/// while let Some(item) = records.next().await {
///     match item {
///         Ok(r) => println!("{} → {}", r.entity_name, r.local_image_path.display()),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn enrich_stream<'a, F>(
    fetcher: &'a F,
    candidates: Vec<Candidate>,
    store: &'a AssetStore,
    config: &'a PipelineConfig,
) -> RecordStream<'a>
where
    F: PageFetcher + 'a,
{
    let total = candidates.len();
    let s = stream::iter(candidates.into_iter().enumerate()).then(move |(i, candidate)| {
        enrich_one(fetcher, candidate, i + 1, total, store, config)
    });
    Box::pin(s)
}

async fn enrich_one<F: PageFetcher>(
    fetcher: &F,
    candidate: Candidate,
    index: usize,
    total: usize,
    store: &AssetStore,
    config: &PipelineConfig,
) -> Result<JoinedRecord, EntityError> {
    let name = candidate.entity_name.clone();
    info!("[{}/{}] Processing {}", index, total, name);
    if let Some(ref cb) = config.progress_callback {
        cb.on_item_start(index, total, &name);
    }

    let Some(path) = store.find_match(&candidate) else {
        let err = EntityError::NoAsset { entity: name };
        warn!("{}", err);
        if let Some(ref cb) = config.progress_callback {
            cb.on_item_skipped(index, total, &candidate.entity_name, &err.to_string());
        }
        return Err(err);
    };
    debug!("Matched {} → {}", name, path.display());

    let detail = match fetch_detail(fetcher, &name, config).await {
        Ok(d) => Some(d),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };

    tokio::time::sleep(config.request_delay()).await;

    if let Some(ref cb) = config.progress_callback {
        cb.on_item_complete(index, total, &name);
    }
    Ok(JoinedRecord::new(name, path).with_detail(detail))
}

/// Drain a [`RecordStream`] into matched records and per-entity errors.
pub async fn collect_records(
    mut stream: RecordStream<'_>,
) -> (Vec<JoinedRecord>, Vec<EntityError>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(r) => records.push(r),
            Err(e) => errors.push(e),
        }
    }
    (records, errors)
}
