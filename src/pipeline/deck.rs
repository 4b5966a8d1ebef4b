//! Deck assembly: joined records → cards plus the media list to bundle.

use crate::config::PipelineConfig;
use crate::model::{file_name_of, Card, FlashcardDeck, JoinedRecord};
use crate::template::image_markup;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Assembled deck and everything the package writer needs alongside it.
#[derive(Debug, Clone)]
pub struct AssembledDeck {
    pub deck: FlashcardDeck,
    /// Every image referenced by a card, in card order.
    pub media_files: Vec<PathBuf>,
    pub added: usize,
    /// Records dropped because their image file is gone or unnamed.
    pub skipped: usize,
}

/// Turn each record whose image still exists into one card.
///
/// The image field references the file by base name only; the file itself is
/// added to `media_files` so the writer can bundle it. A record whose file
/// has vanished since matching is skipped with a warning.
pub fn assemble_deck(records: &[JoinedRecord], config: &PipelineConfig) -> AssembledDeck {
    let mut deck = FlashcardDeck::new(config.deck_title.clone());
    let mut media_files = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for record in records {
        let path = &record.local_image_path;
        let file_name = match file_name_of(path) {
            Some(name) if path.is_file() => name,
            _ => {
                warn!("Skipping {}: image {} not found", record.entity_name, path.display());
                skipped += 1;
                continue;
            }
        };

        deck.cards.push(Card {
            name: record.entity_name.clone(),
            image: image_markup(file_name),
            description: record.description.clone(),
            adoption_date: record.adoption_date.clone(),
        });
        media_files.push(path.clone());
        debug!("Added card for {}", record.entity_name);
    }

    let added = deck.len();
    AssembledDeck {
        deck,
        media_files,
        added,
        skipped,
    }
}
