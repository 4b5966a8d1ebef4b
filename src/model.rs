//! Data model shared by the pipeline stages.
//!
//! All values are transient: they live for one run and are only persisted
//! through the image store and the final package.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A raw `(entity, image)` pair recovered from one index-table row.
///
/// No identity beyond its position in the candidate sequence; duplicates are
/// kept as found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Link text naming the entity: more than 3 chars, never a stop word.
    pub entity_name: String,
    /// `alt` attribute of the accepted image, possibly empty.
    pub image_alt_text: String,
    /// `src` attribute of the accepted image, as written in the markup.
    pub image_source_ref: String,
}

/// An image selected for download from the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagImage {
    /// Absolute URL resolved against the index page.
    pub url: String,
    pub alt_text: String,
    /// Raw `width` attribute, if any.
    pub width: Option<String>,
}

/// Fields scraped from an entity's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub adoption_date: Option<String>,
    /// At most `max_description_chars`, trimmed at a sentence boundary where possible.
    pub description: Option<String>,
}

impl DetailRecord {
    pub fn is_empty(&self) -> bool {
        self.adoption_date.is_none() && self.description.is_none()
    }
}

/// A candidate paired with a local image and optional detail text.
///
/// Only built after a successful asset match; detail fields default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub entity_name: String,
    pub local_image_path: PathBuf,
    pub description: String,
    pub adoption_date: String,
}

impl JoinedRecord {
    pub fn new(entity_name: impl Into<String>, local_image_path: impl Into<PathBuf>) -> Self {
        Self {
            entity_name: entity_name.into(),
            local_image_path: local_image_path.into(),
            description: String::new(),
            adoption_date: String::new(),
        }
    }

    /// Merge best-effort detail fields; absent fields stay empty.
    pub fn with_detail(mut self, detail: Option<DetailRecord>) -> Self {
        if let Some(d) = detail {
            self.description = d.description.unwrap_or_default();
            self.adoption_date = d.adoption_date.unwrap_or_default();
        }
        self
    }
}

/// One flashcard: four field values in template order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    /// Embedded-image markup referencing the bundled file by base name.
    pub image: String,
    pub description: String,
    pub adoption_date: String,
}

impl Card {
    /// Field values in the order of [`crate::template::FIELD_NAMES`].
    pub fn fields(&self) -> [&str; 4] {
        [&self.name, &self.image, &self.description, &self.adoption_date]
    }
}

/// The named collection handed to the package writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardDeck {
    pub title: String,
    pub cards: Vec<Card>,
}

impl FlashcardDeck {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cards: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Base file name of `path` as UTF-8, if it has one.
pub(crate) fn file_name_of(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_record_with_missing_detail_keeps_empty_fields() {
        let r = JoinedRecord::new("Chad", "flags/001_Flag_of_Chad.svg.png").with_detail(None);
        assert!(r.description.is_empty());
        assert!(r.adoption_date.is_empty());
    }

    #[test]
    fn joined_record_takes_partial_detail() {
        let detail = DetailRecord {
            adoption_date: Some("6 November 1959".into()),
            description: None,
        };
        let r = JoinedRecord::new("Chad", "x.png").with_detail(Some(detail));
        assert_eq!(r.adoption_date, "6 November 1959");
        assert_eq!(r.description, "");
    }

    #[test]
    fn card_fields_follow_template_order() {
        let card = Card {
            name: "France".into(),
            image: r#"<img src="002_Flag_of_France.svg.png">"#.into(),
            description: "Tricolour.".into(),
            adoption_date: "15 February 1794".into(),
        };
        assert_eq!(card.fields()[0], "France");
        assert_eq!(card.fields()[3], "15 February 1794");
    }
}
