//! # Wishcard Studio
//!
//! Command-line host for Wishcard: collects the user's name and photo,
//! fetches a wish, lays out the card and exports it as PNG (and optionally a
//! print PDF).
//!
//! ## Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run -p card-studio -- --name "Wali Ullah Shuvo" --photo me.jpg
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `StudioConfig` - Resolved configuration for the provider and exports
//! - `Studio` - Async shell driving generate, export and print
//! - `GeminiWishProvider` - Hosted wish generation with a fixed fallback

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod app;
pub mod wish;

pub use app::{load_photo, Studio, StudioError};
pub use wish::{GeminiWishProvider, StaticWish, WishError, WishProvider};

use std::path::PathBuf;
use std::time::Duration;

use card_core::{ImageScale, Theme};
use card_renderer::WorkflowConfig;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for card-studio.
#[derive(Debug, Clone, Parser)]
#[command(name = "card-studio")]
#[command(about = "Generate a personalised New Year card and export it as PNG")]
#[command(version)]
pub struct CliArgs {
    /// Name printed on the card
    #[arg(long)]
    pub name: String,

    /// Headshot image file
    #[arg(long)]
    pub photo: Option<PathBuf>,

    /// Photo zoom (0.5 to 2.5)
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// Card theme (midnight, gold, nebula)
    #[arg(long, default_value = "gold")]
    pub theme: Theme,

    /// Directory the PNG (and PDF) is written to
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini API host
    #[arg(long, env = "GEMINI_ENDPOINT", default_value = wish::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = wish::DEFAULT_MODEL)]
    pub model: String,

    /// Extra wait before rasterizing, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub settle_ms: u64,

    /// Also write a print-ready PDF
    #[arg(long)]
    pub print: bool,

    /// Generate and preview only; skip the PNG export
    #[arg(long)]
    pub no_export: bool,
}

/// Studio configuration.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Name printed on the card.
    pub name: String,
    /// Headshot image file.
    pub photo: Option<PathBuf>,
    /// Photo zoom, already clamped into range.
    pub scale: ImageScale,
    /// Card theme.
    pub theme: Theme,
    /// Output directory.
    pub out_dir: PathBuf,
    /// Gemini API key.
    pub api_key: Option<String>,
    /// Gemini API host.
    pub endpoint: String,
    /// Gemini model name.
    pub model: String,
    /// Export workflow tuning.
    pub workflow: WorkflowConfig,
    /// Write a print PDF.
    pub print: bool,
    /// Export the PNG.
    pub export: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StudioConfig {
    /// Create a configuration with default values and no name.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: String::new(),
            photo: None,
            scale: ImageScale::default(),
            theme: Theme::default(),
            out_dir: PathBuf::from("."),
            api_key: None,
            endpoint: wish::DEFAULT_ENDPOINT.to_string(),
            model: wish::DEFAULT_MODEL.to_string(),
            workflow: WorkflowConfig::default(),
            print: false,
            export: true,
        }
    }
}

impl From<CliArgs> for StudioConfig {
    fn from(args: CliArgs) -> Self {
        // API_KEY is honoured as a secondary source.
        let api_key = args
            .api_key
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty());

        Self {
            name: args.name,
            photo: args.photo,
            scale: ImageScale::from_slider(args.scale),
            theme: args.theme,
            out_dir: args.out_dir,
            api_key,
            endpoint: args.endpoint,
            model: args.model,
            workflow: WorkflowConfig {
                settle_delay: Duration::from_millis(args.settle_ms),
                ..WorkflowConfig::default()
            },
            print: args.print,
            export: !args.no_export,
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter; `RUST_LOG_FORMAT=json` switches
/// to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,card_studio=debug,card_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}
