//! # flagdeck
//!
//! Build an Anki flashcard deck of national flags from Wikipedia.
//!
//! A run has two phases. The download phase reads the flag tables on the
//! index page and stores every flag image locally. The deck phase reads the
//! same tables again, pairs each country with a stored image by filename
//! heuristics, scrapes a short description and adoption date from the
//! country's flag page, and writes an `.apkg` package.
//!
//! ## Pipeline Overview
//!
//! ```text
//! index page
//!  │
//!  ├─ 1. Download  flag images → flags/NNN_<alt text>.<ext>   (acquire)
//!  ├─ 2. Extract   (country, image) candidates                 (table)
//!  ├─ 3. Match     candidate → local file, first rule wins     (matcher)
//!  ├─ 4. Enrich    adoption date + description, best effort    (detail)
//!  ├─ 5. Assemble  one card per matched country                (deck)
//!  └─ 6. Package   .apkg with bundled media                    (package)
//! ```
//!
//! Requests are strictly sequential with a fixed pause between them; one
//! failed detail page or image costs one data point, never the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flagdeck::{create_deck, download_flags, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let downloads = download_flags(&config).await?;
//!     eprintln!("{} images downloaded", downloads.downloaded);
//!
//!     let deck = create_deck(&config).await?;
//!     println!("{} cards written to {}", deck.cards_added, deck.output_file.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `flagdeck` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! flagdeck = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod acquire;
pub mod config;
pub mod create;
pub mod error;
pub mod model;
pub mod output;
pub mod package;
pub mod pipeline;
pub mod progress;
pub mod stream;
pub mod template;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use acquire::{download_flags, download_flags_with, download_image, image_file_name};
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use create::{create_deck, create_deck_sync, create_deck_with};
pub use error::{EntityError, FlagDeckError};
pub use model::{Candidate, Card, DetailRecord, FlagImage, FlashcardDeck, JoinedRecord};
pub use output::{DeckSummary, DownloadOutcome, DownloadSummary};
pub use package::{ApkgWriter, PackageWriter};
pub use pipeline::fetch::{FetchError, HttpFetcher, PageFetcher};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback};
pub use stream::{collect_records, enrich_stream, RecordStream};
