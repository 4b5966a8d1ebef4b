//! Table extraction: recover flag rows from the index page.
//!
//! The index page has no schema, only conventions: flags sit in
//! `table.wikitable` rows, flag images are wide (declared `width` ≥ 100) or
//! follow the `Flag_of_` file naming, and the entity name is the first
//! meaningful link text in the row. Rows that fit neither convention are
//! dropped silently; output follows document order and is never sorted.
//!
//! Two extractors share the image heuristics:
//! - [`extract_candidates`] - one [`Candidate`] per row with a flag and a name
//!   (deck stage)
//! - [`extract_flag_images`] - every flag image in every row, with an absolute
//!   URL (download stage)

use crate::config::PipelineConfig;
use crate::model::{Candidate, FlagImage};
use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Alt-text marker accepted by the download stage when width is unusable.
const ALT_MARKER: &str = "flag of";

static TABLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("table.wikitable").unwrap());
static ROW_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static IMG_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static LINK_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// Accept or reject from the declared width alone.
///
/// `None` when the attribute is absent or not an integer, leaving the
/// decision to the fallback rules.
fn width_verdict(width: Option<&str>, min_width: u32) -> Option<bool> {
    width
        .and_then(|w| w.trim().parse::<i64>().ok())
        .map(|w| w >= i64::from(min_width))
}

/// Flag heuristic for the deck stage: width, else the source marker.
fn is_candidate_image(src: &str, width: Option<&str>, config: &PipelineConfig) -> bool {
    width_verdict(width, config.min_image_width).unwrap_or_else(|| src.contains(&config.flag_marker))
}

/// Flag heuristic for the download stage: width, else source or alt marker.
fn is_downloadable_image(url: &str, alt: &str, width: Option<&str>, config: &PipelineConfig) -> bool {
    width_verdict(width, config.min_image_width).unwrap_or_else(|| {
        url.contains(&config.flag_marker) || alt.to_lowercase().contains(ALT_MARKER)
    })
}

/// First accepted image inside `cell`.
fn find_flag_image<'a>(
    cell: ElementRef<'a>,
    config: &PipelineConfig,
) -> Option<ElementRef<'a>> {
    cell.select(&IMG_SEL).find(|img| {
        let attrs = img.value();
        match attrs.attr("src") {
            Some(src) if !src.is_empty() => is_candidate_image(src, attrs.attr("width"), config),
            _ => false,
        }
    })
}

/// First link text, in cell order, longer than 3 chars and not a stop word.
fn find_entity_name(cells: &[ElementRef<'_>], config: &PipelineConfig) -> Option<String> {
    cells
        .iter()
        .flat_map(|cell| cell.select(&LINK_SEL))
        .map(|link| link.text().collect::<String>().trim().to_string())
        .find(|text| text.chars().count() > 3 && !config.is_stop_word(text))
}

/// Extract `(entity, image)` candidates from index-page markup.
///
/// Only rows with at least two `td` cells are considered. The image is
/// searched cell by cell; once one is accepted, every cell of the row (not just
/// the image's) is searched for the name.
pub fn extract_candidates(html: &str, config: &PipelineConfig) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    for table in document.select(&TABLE_SEL) {
        for row in table.select(&ROW_SEL) {
            let cells: Vec<ElementRef<'_>> = row.select(&CELL_SEL).collect();
            if cells.len() < 2 {
                continue;
            }

            let Some(img) = cells
                .iter()
                .find_map(|cell| find_flag_image(*cell, config))
            else {
                continue;
            };

            let Some(entity_name) = find_entity_name(&cells, config) else {
                debug!("Row with flag image but no entity link dropped");
                continue;
            };

            let attrs = img.value();
            candidates.push(Candidate {
                entity_name,
                image_alt_text: attrs.attr("alt").unwrap_or_default().to_string(),
                image_source_ref: attrs.attr("src").unwrap_or_default().to_string(),
            });
        }
    }

    debug!("Extracted {} candidates", candidates.len());
    candidates
}

/// Resolve an image reference against the index page URL.
///
/// Protocol-relative references (`//upload.example.org/…`) inherit the base
/// scheme; unparseable references are returned as written.
pub fn resolve_image_url(base: Option<&Url>, src: &str) -> String {
    match base.map(|b| b.join(src)) {
        Some(Ok(url)) => url.to_string(),
        _ if src.starts_with("//") => format!("https:{src}"),
        _ => src.to_string(),
    }
}

/// Extract every flag image from index-page markup for downloading.
pub fn extract_flag_images(html: &str, config: &PipelineConfig) -> Vec<FlagImage> {
    let document = Html::parse_document(html);
    let base = Url::parse(&config.index_url).ok();

    let mut images = Vec::new();

    for table in document.select(&TABLE_SEL) {
        for row in table.select(&ROW_SEL) {
            for img in row.select(&IMG_SEL) {
                let attrs = img.value();
                let Some(src) = attrs.attr("src").filter(|s| !s.is_empty()) else {
                    continue;
                };
                let url = resolve_image_url(base.as_ref(), src);
                let alt = attrs.attr("alt").unwrap_or_default();
                let width = attrs.attr("width");

                if is_downloadable_image(&url, alt, width, config) {
                    images.push(FlagImage {
                        url,
                        alt_text: alt.to_string(),
                        width: width.map(str::to_string),
                    });
                }
            }
        }
    }

    debug!("Extracted {} flag images", images.len());
    images
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_HTML: &str = r#"
<html><body>
<table class="wikitable sortable">
  <tr><th>Country</th><th>Flag</th></tr>
  <tr>
    <td><a href="/wiki/Afghanistan">Afghanistan</a></td>
    <td><img src="//upload.wikimedia.org/wikipedia/commons/thumb/5/5c/Flag_of_Afghanistan.svg/125px-Flag_of_Afghanistan.svg.png"
         alt="Flag of Afghanistan" width="125" height="83" /></td>
  </tr>
  <tr>
    <td><a href="/wiki/Albania">Albania</a></td>
    <td><img src="//upload.wikimedia.org/wikipedia/commons/thumb/3/36/Flag_of_Albania.svg/140px-Flag_of_Albania.svg.png"
         alt="Flag of Albania" width="140" height="100" /></td>
  </tr>
  <tr>
    <td><a href="/wiki/Algeria">Algeria</a></td>
    <td><img src="//upload.wikimedia.org/wikipedia/commons/thumb/7/77/Flag_of_Algeria.svg/150px-Flag_of_Algeria.svg.png"
         alt="Flag of Algeria" width="150" height="100" /></td>
  </tr>
</table>
</body></html>
"#;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn fixture_with_three_entities_yields_three_candidates() {
        let candidates = extract_candidates(INDEX_HTML, &config());
        let names: Vec<&str> = candidates.iter().map(|c| c.entity_name.as_str()).collect();
        assert_eq!(names, vec!["Afghanistan", "Albania", "Algeria"]);
        assert_eq!(candidates[0].image_alt_text, "Flag of Afghanistan");
        assert!(candidates[0].image_source_ref.starts_with("//upload.wikimedia.org"));
    }

    #[test]
    fn name_may_come_from_a_cell_after_the_image() {
        let html = r#"<table class="wikitable"><tr>
            <td><img src="/a/Flag_of_Chad.svg.png" width="120"></td>
            <td><a href="/wiki/Chad">Chad</a></td>
        </tr></table>"#;
        let candidates = extract_candidates(html, &config());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].entity_name, "Chad");
    }

    #[test]
    fn short_and_stop_word_links_are_skipped() {
        let html = r##"<table class="wikitable"><tr>
            <td><a href="#">Flag</a> <a href="#">UK</a> <a href="#">edit</a></td>
            <td><a href="/wiki/Nauru">Nauru</a><img src="x/Flag_of_Nauru.svg.png" width="100"></td>
        </tr></table>"##;
        let candidates = extract_candidates(html, &config());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].entity_name, "Nauru");
    }

    #[test]
    fn missing_width_falls_back_to_source_marker() {
        let html = r#"<table class="wikitable"><tr>
            <td><a href="/wiki/Peru">Peru</a></td>
            <td><img src="//upload/Flag_of_Peru.svg.png"></td>
        </tr><tr>
            <td><a href="/wiki/Chile">Chile</a></td>
            <td><img src="//upload/Chile_map.png"></td>
        </tr></table>"#;
        let candidates = extract_candidates(html, &config());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].entity_name, "Peru");
    }

    #[test]
    fn unparseable_width_falls_back_to_source_marker() {
        let html = r#"<table class="wikitable"><tr>
            <td><a href="/wiki/Peru">Peru</a></td>
            <td><img src="//upload/Flag_of_Peru.svg.png" width="auto"></td>
        </tr></table>"#;
        assert_eq!(extract_candidates(html, &config()).len(), 1);
    }

    #[test]
    fn small_declared_width_rejects_icons() {
        let html = r#"<table class="wikitable"><tr>
            <td><a href="/wiki/Peru">Peru</a></td>
            <td><img src="//upload/23px-Flag_of_Peru.svg.png" width="23"></td>
        </tr></table>"#;
        assert!(extract_candidates(html, &config()).is_empty());
    }

    #[test]
    fn rows_with_one_cell_or_no_table_class_are_ignored() {
        let html = r#"
        <table class="wikitable"><tr><td><a href="/wiki/Chad">Chad</a><img src="Flag_of_Chad.png" width="200"></td></tr></table>
        <table class="infobox"><tr>
            <td><a href="/wiki/Mali">Mali</a></td><td><img src="Flag_of_Mali.png" width="200"></td>
        </tr></table>"#;
        assert!(extract_candidates(html, &config()).is_empty());
    }

    #[test]
    fn image_without_name_drops_row() {
        let html = r#"<table class="wikitable"><tr>
            <td>Chad</td><td><img src="Flag_of_Chad.png" width="200"></td>
        </tr></table>"#;
        assert!(extract_candidates(html, &config()).is_empty());
    }

    #[test]
    fn duplicates_are_kept_in_document_order() {
        let row = r#"<tr><td><a href="/wiki/Chad">Chad</a></td><td><img src="Flag_of_Chad.png" width="200"></td></tr>"#;
        let html = format!(r#"<table class="wikitable">{row}{row}</table>"#);
        assert_eq!(extract_candidates(&html, &config()).len(), 2);
    }

    #[test]
    fn flag_images_get_absolute_https_urls() {
        let images = extract_flag_images(INDEX_HTML, &config());
        assert_eq!(images.len(), 3);
        for img in &images {
            assert!(img.url.starts_with("https://upload.wikimedia.org/"), "{}", img.url);
            assert!(img.url.contains("Flag"));
        }
        assert_eq!(images[1].width.as_deref(), Some("140"));
    }

    #[test]
    fn download_stage_accepts_alt_marker_without_width() {
        let html = r#"<table class="wikitable">
            <tr><td>Tonga</td><td><img src="/media/tonga.png" alt="Flag of Tonga"></td></tr>
            <tr><td>Map</td><td><img src="/media/map.png" alt="Map"></td></tr>
        </table>"#;
        let images = extract_flag_images(html, &config());
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "https://en.wikipedia.org/media/tonga.png");
    }

    #[test]
    fn selectors_are_built_once_and_reused() {
        for sel in [&TABLE_SEL, &ROW_SEL, &CELL_SEL, &IMG_SEL, &LINK_SEL] {
            assert!(std::ptr::eq(Lazy::force(sel), Lazy::force(sel)));
        }
        // Repeated extraction goes through the same compiled selectors.
        let first = extract_candidates(INDEX_HTML, &config());
        let second = extract_candidates(INDEX_HTML, &config());
        assert_eq!(first, second);
    }

    #[test]
    fn resolve_without_base_handles_protocol_relative() {
        assert_eq!(
            resolve_image_url(None, "//upload.example.org/a.png"),
            "https://upload.example.org/a.png"
        );
        assert_eq!(resolve_image_url(None, "a.png"), "a.png");
    }
}
