//! Fixed card template for the flag deck.
//!
//! Field names, both card sides and the stylesheet live here so the deck
//! assembler and the package writer agree on one layout. The front shows only
//! the flag; the back repeats the flag, then the name, then description and
//! adoption date, each rendered only when non-empty.

/// Note-type name written into the package.
pub const MODEL_NAME: &str = "Flag Model";

/// Card-template name.
pub const TEMPLATE_NAME: &str = "Flag Recognition";

/// Field names in card order.
pub const FIELD_NAMES: [&str; 4] = ["Country", "FlagImage", "Description", "AdoptionDate"];

/// Front side: the image alone.
pub const FRONT_TEMPLATE: &str =
    r#"<div style="text-align: center; font-size: 24px; margin: 20px;">{{FlagImage}}</div>"#;

/// Back side: image, name, then the conditional sections.
pub const BACK_TEMPLATE: &str = r#"<div style="text-align: center; font-size: 24px; margin: 20px;">{{FlagImage}}</div>
<hr id="answer">
<div style="text-align: center; font-size: 36px; font-weight: bold; color: #2c3e50; margin: 20px;">{{Country}}</div>
{{#Description}}
<div style="text-align: left; font-size: 18px; line-height: 1.6; margin: 20px; padding: 15px; background-color: #f8f9fa; border-left: 4px solid #3498db;">
  {{Description}}
</div>
{{/Description}}
{{#AdoptionDate}}
<div style="text-align: center; font-size: 16px; color: #7f8c8d; margin: 15px;">
  <strong>Adopted:</strong> {{AdoptionDate}}
</div>
{{/AdoptionDate}}"#;

pub const CARD_CSS: &str = r#"
.card {
  font-family: Arial, sans-serif;
  text-align: center;
  color: #2c3e50;
  background-color: #ffffff;
}
img {
  max-width: 400px;
  max-height: 300px;
  border: 2px solid #34495e;
  box-shadow: 0 4px 8px rgba(0,0,0,0.1);
}
"#;

/// Embedded-image markup for a bundled media file.
pub fn image_markup(file_name: &str) -> String {
    format!(r#"<img src="{file_name}">"#)
}

/// Stable 31-bit id derived from `seed` (FNV-1a), in `[2^30, 2^31)`.
///
/// Anki identifies note types and decks by id; deriving them from the title
/// keeps re-generated packages importing over the previous one.
pub fn stable_id(seed: &str) -> i64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in seed.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    (1i64 << 30) + (hash % (1u64 << 30)) as i64
}
