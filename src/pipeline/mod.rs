//! Pipeline stages for building a flag deck.
//!
//! Each submodule implements one transformation step and is testable on its
//! own with canned markup or a temporary directory.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ table ──▶ matcher ──▶ detail ──▶ deck
//! (HTTP)   (index)   (local files) (per entity) (cards)
//!             │
//!             └──▶ resize (download stage only)
//! ```
//!
//! 1. [`fetch`] - the only stage with network I/O; one attempt per URL
//! 2. [`table`] - candidates and downloadable images from the index tables
//! 3. [`matcher`] - pair a candidate with a file in the image store
//! 4. [`detail`] - adoption date and description from the detail page
//! 5. [`deck`] - cards and media list for the package writer
//!
//! [`text`] holds the cleanup rules shared by the extractors and the download
//! stage; [`resize`] bounds and flattens downloaded images.

pub mod deck;
pub mod detail;
pub mod fetch;
pub mod matcher;
pub mod resize;
pub mod table;
pub mod text;
