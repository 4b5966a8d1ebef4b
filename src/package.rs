//! Package writer: serialise a deck and its media into an importable file.
//!
//! [`PackageWriter`] is the seam the deck-creation run writes through, so the
//! orchestration can be tested without producing a real package.
//! [`ApkgWriter`] produces an Anki `.apkg` archive with genanki-rs.

use crate::error::FlagDeckError;
use crate::model::FlashcardDeck;
use crate::template::{
    stable_id, BACK_TEMPLATE, CARD_CSS, FIELD_NAMES, FRONT_TEMPLATE, MODEL_NAME, TEMPLATE_NAME,
};
use genanki_rs::{Deck, Field, Model, Note, Package, Template};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes a finished deck to `output`.
pub trait PackageWriter: Send + Sync {
    /// Write `deck` and bundle every file in `media` by base name.
    fn write(
        &self,
        deck: &FlashcardDeck,
        media: &[PathBuf],
        output: &Path,
    ) -> Result<(), FlagDeckError>;
}

/// Anki package writer.
///
/// Model and deck ids are derived from the deck title, so regenerating the
/// same deck updates an existing import instead of duplicating it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApkgWriter;

impl ApkgWriter {
    fn model(title: &str) -> Model {
        let fields = FIELD_NAMES.iter().map(|name| Field::new(name)).collect();
        let template = Template::new(TEMPLATE_NAME)
            .qfmt(FRONT_TEMPLATE)
            .afmt(BACK_TEMPLATE);

        Model::new_with_options(
            stable_id(&format!("{title}::{MODEL_NAME}")),
            MODEL_NAME,
            fields,
            vec![template],
            Some(CARD_CSS),
            None,
            None,
            None,
            None,
        )
    }
}

impl PackageWriter for ApkgWriter {
    fn write(
        &self,
        deck: &FlashcardDeck,
        media: &[PathBuf],
        output: &Path,
    ) -> Result<(), FlagDeckError> {
        let fail = |reason: String| FlagDeckError::PackageWriteFailed {
            path: output.to_path_buf(),
            reason,
        };

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| FlagDeckError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let model = Self::model(&deck.title);
        let mut anki_deck = Deck::new(stable_id(&deck.title), &deck.title, "");
        for card in &deck.cards {
            let note = Note::new(model.clone(), card.fields().to_vec())
                .map_err(|e| fail(format!("card '{}': {e}", card.name)))?;
            anki_deck.add_note(note);
        }

        let media_paths = media
            .iter()
            .map(|p| {
                p.to_str()
                    .ok_or_else(|| fail(format!("non UTF-8 media path {}", p.display())))
            })
            .collect::<Result<Vec<&str>, _>>()?;

        let mut tmp = output.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let tmp_str = tmp
            .to_str()
            .ok_or_else(|| fail("non UTF-8 output path".into()))?;

        let mut package =
            Package::new(vec![anki_deck], media_paths).map_err(|e| fail(e.to_string()))?;
        package.write_to_file(tmp_str).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            fail(e.to_string())
        })?;
        debug!("Wrote temporary package {}", tmp.display());

        std::fs::rename(&tmp, output).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            fail(e.to_string())
        })?;

        info!(
            "Package written: {} ({} cards, {} media files)",
            output.display(),
            deck.len(),
            media.len()
        );
        Ok(())
    }
}
