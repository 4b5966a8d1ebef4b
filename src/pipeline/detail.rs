//! Detail extraction: adoption date and description from an entity's page.
//!
//! The page address is derived by naming convention only (spaces → `_` in a
//! URL template). A display name that does not follow the convention produces
//! a failed fetch, not a wrong page, and the entity simply gets no detail.
//!
//! Parsing is synchronous and separate from fetching: `scraper::Html` is not
//! `Send`, so it never lives across an await point.

use crate::config::{PipelineConfig, NAME_PLACEHOLDER};
use crate::error::EntityError;
use crate::model::DetailRecord;
use crate::pipeline::fetch::PageFetcher;
use crate::pipeline::text::{clean_text, truncate_description};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static INFOBOX_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("table.infobox").unwrap());
static ROW_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static TH_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());
static TD_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static CONTENT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.mw-parser-output").unwrap());

/// Info-table header fragments that mark the adoption row.
const DATE_HEADER_MARKERS: [&str; 2] = ["adopt", "design"];

/// Paragraph prefixes that are never prose.
const NON_PROSE_PREFIXES: [&str; 1] = ["Coordinates:"];

/// Build the detail page URL for `entity_name`.
pub fn detail_url(template: &str, entity_name: &str) -> String {
    template.replace(NAME_PLACEHOLDER, &entity_name.replace(' ', "_"))
}

/// Fetch and parse the detail page for `entity_name`.
///
/// Any fetch failure (network error, timeout, non-success status) becomes
/// [`EntityError::DetailUnavailable`]; callers treat it as "no detail data".
pub async fn fetch_detail<F: PageFetcher>(
    fetcher: &F,
    entity_name: &str,
    config: &PipelineConfig,
) -> Result<DetailRecord, EntityError> {
    let url = detail_url(&config.detail_url_template, entity_name);
    debug!("Fetching details for {} from {}", entity_name, url);

    let html = fetcher
        .fetch_text(&url, Some(config.detail_timeout()))
        .await
        .map_err(|e| EntityError::DetailUnavailable {
            entity: entity_name.to_string(),
            url: url.clone(),
            reason: e.to_string(),
        })?;

    Ok(parse_detail_page(&html, config))
}

/// Extract a [`DetailRecord`] from detail-page markup.
pub fn parse_detail_page(html: &str, config: &PipelineConfig) -> DetailRecord {
    let document = Html::parse_document(html);
    DetailRecord {
        adoption_date: extract_adoption_date(&document),
        description: extract_description(&document, config),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Adjacent data cell of the first info-table row whose header mentions
/// adoption or design.
fn extract_adoption_date(document: &Html) -> Option<String> {
    let infobox = document.select(&INFOBOX_SEL).next()?;

    infobox.select(&ROW_SEL).find_map(|row| {
        let header = row.select(&TH_SEL).next()?;
        let header_text = element_text(header).trim().to_lowercase();
        if !DATE_HEADER_MARKERS.iter().any(|m| header_text.contains(m)) {
            return None;
        }
        let data = row.select(&TD_SEL).next()?;
        Some(clean_text(&element_text(data)))
    })
}

fn is_prose(text: &str, min_chars: usize) -> bool {
    text.chars().count() > min_chars && !NON_PROSE_PREFIXES.iter().any(|p| text.starts_with(p))
}

/// Leading prose paragraphs of the main content block, joined and capped.
///
/// Only direct-child `p` elements are considered; nested paragraphs inside
/// infoboxes, navboxes or figures are ignored.
fn extract_description(document: &Html, config: &PipelineConfig) -> Option<String> {
    let content = document.select(&CONTENT_SEL).next()?;

    let paragraphs = content
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "p")
        .take(config.paragraph_scan_limit);

    let mut parts: Vec<String> = Vec::new();
    for p in paragraphs {
        let raw = element_text(p);
        let raw = raw.trim();
        if !is_prose(raw, config.min_paragraph_chars) {
            continue;
        }
        parts.push(clean_text(raw));

        let joined_len = parts.iter().map(|s| s.chars().count()).sum::<usize>() + parts.len() - 1;
        if parts.len() >= config.max_description_paragraphs
            || joined_len > config.description_context_chars
        {
            break;
        }
    }

    if parts.is_empty() {
        return None;
    }

    Some(truncate_description(
        &parts.join(" "),
        config.max_description_chars,
    ))
}
