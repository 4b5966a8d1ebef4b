//! Configuration types for the flag-deck pipeline.
//!
//! Every URL, threshold, delay and path used by any stage lives in
//! [`PipelineConfig`], built via its [`PipelineConfigBuilder`]. Stages receive
//! the config by reference; nothing reads ambient module state.

use crate::error::FlagDeckError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Index page listing every sovereign state's flag.
pub const DEFAULT_INDEX_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_national_flags_of_sovereign_states";

/// Detail page template; `{name}` is replaced by the entity name with spaces → `_`.
pub const DEFAULT_DETAIL_URL_TEMPLATE: &str = "https://en.wikipedia.org/wiki/Flag_of_{name}";

/// Identifying user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    "AnkiVexillologyBot/1.0 (Educational purposes; creating flashcards)";

/// Placeholder substituted in [`PipelineConfig::detail_url_template`].
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Configuration for a download or deck-creation run.
///
/// Built via [`PipelineConfig::builder()`] or using
/// [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use flagdeck::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .flags_dir("flags")
///     .request_delay_ms(250)
///     .build()
///     .unwrap();
/// assert_eq!(config.request_delay_ms, 250);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Page holding the flag tables. Default: [`DEFAULT_INDEX_URL`].
    pub index_url: String,

    /// Detail page URL template containing [`NAME_PLACEHOLDER`].
    pub detail_url_template: String,

    /// `User-Agent` header for every request.
    pub user_agent: String,

    /// Local image store: written by the download stage, read by the matcher. Default: `flags`.
    pub flags_dir: PathBuf,

    /// Package file written by the deck stage. Default: `National_Flags.apkg`.
    pub output_file: PathBuf,

    /// Title of the single collection inside the package.
    pub deck_title: String,

    /// Fixed pause after each detail fetch and each image download. Default: 500.
    ///
    /// There is no adaptive backoff; the pause applies whether the request
    /// succeeded or not.
    pub request_delay_ms: u64,

    /// Timeout for the index page. Default: none.
    pub index_timeout_secs: Option<u64>,

    /// Timeout for each detail page. Default: 10.
    pub detail_timeout_secs: u64,

    /// Timeout for each image download. Default: 10.
    pub image_timeout_secs: u64,

    /// Minimum declared `width` for a table image to count as a flag. Default: 100.
    pub min_image_width: u32,

    /// Source-reference marker accepted when an image has no usable width. Default: `Flag_of_`.
    pub flag_marker: String,

    /// Link texts that never name an entity (compared lowercase).
    pub stop_words: Vec<String>,

    /// Longest side of a stored flag image, in pixels. Default: 400.
    pub max_image_dimension: u32,

    /// Resize and flatten downloaded images. Default: true.
    pub resize_images: bool,

    /// Direct-child paragraphs inspected for the description. Default: 5.
    pub paragraph_scan_limit: usize,

    /// A paragraph must be longer than this to count as prose. Default: 50.
    pub min_paragraph_chars: usize,

    /// Paragraphs kept in a description. Default: 2.
    pub max_description_paragraphs: usize,

    /// Stop collecting paragraphs once the joined text exceeds this. Default: 300.
    pub description_context_chars: usize,

    /// Hard ceiling on description length. Default: 500.
    pub max_description_chars: usize,

    /// Sort the asset listing by file name before matching. Default: true.
    ///
    /// With `false` the storage layer's listing order decides ties.
    pub sort_assets: bool,

    /// Optional per-entity progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            detail_url_template: DEFAULT_DETAIL_URL_TEMPLATE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            flags_dir: PathBuf::from("flags"),
            output_file: PathBuf::from("National_Flags.apkg"),
            deck_title: "National Flags of Sovereign States".to_string(),
            request_delay_ms: 500,
            index_timeout_secs: None,
            detail_timeout_secs: 10,
            image_timeout_secs: 10,
            min_image_width: 100,
            flag_marker: "Flag_of_".to_string(),
            stop_words: ["flag", "edit", "view"].map(String::from).to_vec(),
            max_image_dimension: 400,
            resize_images: true,
            paragraph_scan_limit: 5,
            min_paragraph_chars: 50,
            max_description_paragraphs: 2,
            description_context_chars: 300,
            max_description_chars: 500,
            sort_assets: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("index_url", &self.index_url)
            .field("detail_url_template", &self.detail_url_template)
            .field("flags_dir", &self.flags_dir)
            .field("output_file", &self.output_file)
            .field("deck_title", &self.deck_title)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("detail_timeout_secs", &self.detail_timeout_secs)
            .field("max_image_dimension", &self.max_image_dimension)
            .field("resize_images", &self.resize_images)
            .field("max_description_chars", &self.max_description_chars)
            .field("sort_assets", &self.sort_assets)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn PipelineProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// The fixed inter-request pause.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn index_timeout(&self) -> Option<Duration> {
        self.index_timeout_secs.map(Duration::from_secs)
    }

    /// True when `text` (already trimmed) is one of the configured stop words.
    pub fn is_stop_word(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.stop_words.iter().any(|w| *w == lower)
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl fmt::Debug for PipelineConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl PipelineConfigBuilder {
    pub fn index_url(mut self, url: impl Into<String>) -> Self {
        self.config.index_url = url.into();
        self
    }

    pub fn detail_url_template(mut self, template: impl Into<String>) -> Self {
        self.config.detail_url_template = template.into();
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn flags_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.flags_dir = dir.into();
        self
    }

    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_file = path.into();
        self
    }

    pub fn deck_title(mut self, title: impl Into<String>) -> Self {
        self.config.deck_title = title.into();
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    pub fn index_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.index_timeout_secs = secs;
        self
    }

    pub fn detail_timeout_secs(mut self, secs: u64) -> Self {
        self.config.detail_timeout_secs = secs.max(1);
        self
    }

    pub fn image_timeout_secs(mut self, secs: u64) -> Self {
        self.config.image_timeout_secs = secs.max(1);
        self
    }

    pub fn min_image_width(mut self, px: u32) -> Self {
        self.config.min_image_width = px;
        self
    }

    pub fn flag_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.flag_marker = marker.into();
        self
    }

    pub fn stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.stop_words = words.into_iter().map(|w| w.into().to_lowercase()).collect();
        self
    }

    pub fn max_image_dimension(mut self, px: u32) -> Self {
        self.config.max_image_dimension = px.max(16);
        self
    }

    pub fn resize_images(mut self, v: bool) -> Self {
        self.config.resize_images = v;
        self
    }

    pub fn paragraph_scan_limit(mut self, n: usize) -> Self {
        self.config.paragraph_scan_limit = n;
        self
    }

    pub fn min_paragraph_chars(mut self, n: usize) -> Self {
        self.config.min_paragraph_chars = n;
        self
    }

    pub fn max_description_paragraphs(mut self, n: usize) -> Self {
        self.config.max_description_paragraphs = n.max(1);
        self
    }

    pub fn description_context_chars(mut self, n: usize) -> Self {
        self.config.description_context_chars = n;
        self
    }

    pub fn max_description_chars(mut self, n: usize) -> Self {
        self.config.max_description_chars = n;
        self
    }

    pub fn sort_assets(mut self, v: bool) -> Self {
        self.config.sort_assets = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, FlagDeckError> {
        let c = &self.config;
        if !c.detail_url_template.contains(NAME_PLACEHOLDER) {
            return Err(FlagDeckError::InvalidConfig(format!(
                "detail URL template must contain {NAME_PLACEHOLDER}, got '{}'",
                c.detail_url_template
            )));
        }
        if reqwest::Url::parse(&c.index_url).is_err() {
            return Err(FlagDeckError::InvalidConfig(format!(
                "index URL is not absolute: '{}'",
                c.index_url
            )));
        }
        if c.max_description_chars < 4 {
            return Err(FlagDeckError::InvalidConfig(
                "max description length must be ≥ 4".into(),
            ));
        }
        if c.deck_title.trim().is_empty() {
            return Err(FlagDeckError::InvalidConfig("deck title is empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_polite_and_bounded() {
        let c = PipelineConfig::default();
        assert_eq!(c.request_delay_ms, 500);
        assert_eq!(c.detail_timeout_secs, 10);
        assert_eq!(c.max_description_chars, 500);
        assert_eq!(c.output_file, PathBuf::from("National_Flags.apkg"));
        assert!(c.index_timeout().is_none());
    }

    #[test]
    fn stop_words_are_case_insensitive() {
        let c = PipelineConfig::default();
        assert!(c.is_stop_word("Edit"));
        assert!(c.is_stop_word("FLAG"));
        assert!(!c.is_stop_word("France"));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let err = PipelineConfig::builder()
            .detail_url_template("https://example.org/wiki/Flag")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("{name}"), "got: {err}");
    }

    #[test]
    fn relative_index_url_is_rejected() {
        assert!(PipelineConfig::builder().index_url("/wiki/List").build().is_err());
    }

    #[test]
    fn builder_clamps_values() {
        let c = PipelineConfig::builder()
            .detail_timeout_secs(0)
            .max_description_paragraphs(0)
            .stop_words(["Edit", "View"])
            .build()
            .unwrap();
        assert_eq!(c.detail_timeout_secs, 1);
        assert_eq!(c.max_description_paragraphs, 1);
        assert_eq!(c.stop_words, vec!["edit", "view"]);
    }
}
