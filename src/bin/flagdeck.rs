//! CLI binary for flagdeck.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig` and prints run summaries.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flagdeck::{
    create_deck, download_flags, DeckSummary, DownloadSummary, PipelineConfig,
    PipelineProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the whole run plus a log line for
/// every skipped item.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Noun shown next to the counter ("flags", "countries").
    unit: &'static str,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    fn new(unit: &'static str, prefix: &str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix(prefix.to_string());
        bar.set_message("Fetching index page…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            unit,
            skipped: AtomicUsize::new(0),
        })
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total: usize) {
        let template = format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {}  \
             ⏱ {{elapsed_precise}}  ETA {{eta_precise}}  {{msg}}",
            self.unit
        );
        let style = ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS);
        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.reset_eta();
    }

    fn on_item_start(&self, _index: usize, _total: usize, label: &str) {
        self.bar.set_message(label.to_string());
    }

    fn on_item_complete(&self, _index: usize, _total: usize, _label: &str) {
        self.bar.inc(1);
    }

    fn on_item_skipped(&self, index: usize, total: usize, label: &str, reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            label,
            dim(reason),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total.saturating_sub(success_count);
        if failed == 0 {
            eprintln!("{} {} {} processed", green("✔"), bold(&success_count.to_string()), self.unit);
        } else {
            eprintln!(
                "{} {}/{} {} processed  ({} skipped)",
                cyan("⚠"),
                bold(&success_count.to_string()),
                total,
                self.unit,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Download every flag image into ./flags
  flagdeck download

  # Build the deck from ./flags
  flagdeck deck

  # Custom locations, faster pacing, JSON summary
  flagdeck --flags-dir /tmp/flags deck -o /tmp/Flags.apkg --delay-ms 250 --json

ENVIRONMENT VARIABLES:
  FLAGDECK_FLAGS_DIR      Local image store (default: flags)
  FLAGDECK_OUTPUT         Package path (default: National_Flags.apkg)
  FLAGDECK_DELAY_MS       Pause between requests in ms (default: 500)
  FLAGDECK_INDEX_URL      Page holding the flag tables
  RUST_LOG                Overrides the log filter

IMPORTING:
  1. Open Anki
  2. File > Import
  3. Select the generated .apkg file
"#;

/// Build an Anki flashcard deck of national flags from Wikipedia.
#[derive(Parser, Debug)]
#[command(
    name = "flagdeck",
    version,
    about = "Build an Anki flashcard deck of national flags from Wikipedia",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download flag images from the index page into the local store.
    Download {
        /// Keep images as downloaded (no resizing or flattening).
        #[arg(long, env = "FLAGDECK_NO_RESIZE")]
        no_resize: bool,

        /// Longest side of a stored image in pixels.
        #[arg(long, env = "FLAGDECK_MAX_DIMENSION", default_value_t = 400)]
        max_dimension: u32,
    },

    /// Build the deck package from the local store.
    Deck {
        /// Package file to write.
        #[arg(short, long, env = "FLAGDECK_OUTPUT", default_value = "National_Flags.apkg")]
        output: PathBuf,

        /// Deck title shown in Anki.
        #[arg(long, env = "FLAGDECK_TITLE", default_value = "National Flags of Sovereign States")]
        title: String,

        /// Match against the directory listing in storage order instead of sorting it.
        #[arg(long)]
        unsorted: bool,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Local image store.
    #[arg(long, global = true, env = "FLAGDECK_FLAGS_DIR", default_value = "flags")]
    flags_dir: PathBuf,

    /// Page holding the flag tables.
    #[arg(long, global = true, env = "FLAGDECK_INDEX_URL", default_value = flagdeck::config::DEFAULT_INDEX_URL)]
    index_url: String,

    /// Pause after each detail fetch or image download, in milliseconds.
    #[arg(long, global = true, env = "FLAGDECK_DELAY_MS", default_value_t = 500)]
    delay_ms: u64,

    /// Per-request timeout for detail pages and images, in seconds.
    #[arg(long, global = true, env = "FLAGDECK_TIMEOUT", default_value_t = 10)]
    timeout: u64,

    /// Output the run summary as JSON.
    #[arg(long, global = true, env = "FLAGDECK_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "FLAGDECK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "FLAGDECK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "FLAGDECK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let common = &cli.common;

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; verbose always wins.
    let show_progress = !common.quiet && !common.no_progress && !common.json;
    let filter = if common.verbose {
        "debug"
    } else if common.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Download {
            no_resize,
            max_dimension,
        } => {
            let progress = show_progress
                .then(|| CliProgressCallback::new("flags", "Downloading") as ProgressCallback);
            let config = base_builder(common, progress)
                .resize_images(!no_resize)
                .max_image_dimension(*max_dimension)
                .build()
                .context("Invalid configuration")?;

            let summary = download_flags(&config).await.context("Download failed")?;
            print_download_summary(&summary, common)?;
        }
        Command::Deck {
            output,
            title,
            unsorted,
        } => {
            let progress = show_progress
                .then(|| CliProgressCallback::new("countries", "Building deck") as ProgressCallback);
            let config = base_builder(common, progress)
                .output_file(output)
                .deck_title(title)
                .sort_assets(!unsorted)
                .build()
                .context("Invalid configuration")?;

            let summary = create_deck(&config).await.context("Deck creation failed")?;
            print_deck_summary(&summary, common)?;
        }
    }

    Ok(())
}

/// Map the shared flags onto a config builder.
fn base_builder(
    common: &CommonArgs,
    progress: Option<ProgressCallback>,
) -> flagdeck::PipelineConfigBuilder {
    let mut builder = PipelineConfig::builder()
        .flags_dir(&common.flags_dir)
        .index_url(&common.index_url)
        .request_delay_ms(common.delay_ms)
        .detail_timeout_secs(common.timeout)
        .image_timeout_secs(common.timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder
}

fn print_download_summary(summary: &DownloadSummary, common: &CommonArgs) -> Result<()> {
    if common.json {
        println!(
            "{}",
            serde_json::to_string_pretty(summary).context("Failed to serialise summary")?
        );
        return Ok(());
    }
    if common.quiet {
        return Ok(());
    }

    eprintln!(
        "{}  {} found  {} downloaded  {} already present  {} failed  {}ms",
        if summary.failed == 0 { green("✔") } else { cyan("⚠") },
        summary.found,
        bold(&summary.downloaded.to_string()),
        summary.already_present,
        if summary.failed == 0 {
            summary.failed.to_string()
        } else {
            red(&summary.failed.to_string())
        },
        summary.total_duration_ms,
    );
    eprintln!("   Images saved to {}", bold(&summary.flags_dir.display().to_string()));
    Ok(())
}

fn print_deck_summary(summary: &DeckSummary, common: &CommonArgs) -> Result<()> {
    if common.json {
        println!(
            "{}",
            serde_json::to_string_pretty(summary).context("Failed to serialise summary")?
        );
        return Ok(());
    }
    if common.quiet {
        return Ok(());
    }

    eprintln!(
        "{}  {} cards added  {} skipped  {}ms  →  {}",
        if summary.cards_skipped == 0 { green("✔") } else { cyan("⚠") },
        bold(&summary.cards_added.to_string()),
        summary.cards_skipped,
        summary.total_duration_ms,
        bold(&summary.output_file.display().to_string()),
    );
    eprintln!(
        "   {} candidates  /  {} matched  /  {} with details",
        dim(&summary.candidates.to_string()),
        dim(&summary.matched.to_string()),
        dim(&summary.enriched.to_string()),
    );
    eprintln!();
    eprintln!("To use the deck:");
    eprintln!("  1. Open Anki");
    eprintln!("  2. File > Import");
    eprintln!("  3. Select {}", summary.output_file.display());
    Ok(())
}
