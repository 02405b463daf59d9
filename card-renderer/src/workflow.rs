//! Export workflow: primary rasterization, fallback, and file save.
//!
//! ```text
//! Idle ──export()──► Exporting ──► primary ok ─────────────┐
//!                        │                                 ├─► save ─► Succeeded
//!                        ├──► primary err ─► fallback ok ──┘     │
//!                        │                     │                 └─ err ─► Failed
//!                        │                     └─ err ─────────────────► Failed
//!                        └──► no card ─────────────────────────────────► Failed
//! ```

use std::path::PathBuf;
use std::time::Duration;

use card_core::RenderedCard;
use serde::Serialize;

use crate::error::{RenderError, RenderResult};
use crate::image::png_data_url;
use crate::sink::FileSink;
use crate::strategy::{Rasterize, RasterCompositor, StrategyKind, VectorRasterizer};

/// Shown when export is requested before a card exists.
pub const MISSING_CARD_MESSAGE: &str = "Card element not found. Please generate the card first.";

/// Shown when every rasterization strategy failed.
pub const DOWNLOAD_FAILED_MESSAGE: &str =
    "Download failed. Please take a high-quality screenshot of your card!";

/// Shortest PNG data URL accepted as a real render.
pub const MIN_DATA_URL_LEN: usize = 2000;

/// Progress of an export action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExportState {
    /// No export has run.
    #[default]
    Idle,
    /// An export is in flight.
    Exporting,
    /// A PNG was produced and saved.
    Succeeded {
        /// Strategy that produced the image.
        strategy: StrategyKind,
        /// Where the file was saved.
        path: PathBuf,
        /// Size of the PNG in bytes.
        bytes: usize,
    },
    /// The export was abandoned.
    Failed {
        /// User-facing explanation.
        message: String,
    },
}

impl ExportState {
    /// Whether this is a terminal success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    fn failed(message: &str) -> Self {
        Self::Failed {
            message: message.to_string(),
        }
    }
}

/// Workflow tuning.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Extra wait after the card is handed over and before rasterizing.
    pub settle_delay: Duration,
    /// Primary outputs whose PNG data URL is shorter than this count as failures.
    pub min_data_url_len: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            min_data_url_len: MIN_DATA_URL_LEN,
        }
    }
}

/// Runs the two-strategy PNG export and saves the result.
pub struct ExportWorkflow {
    primary: Box<dyn Rasterize>,
    fallback: Box<dyn Rasterize>,
    sink: Box<dyn FileSink>,
    config: WorkflowConfig,
    state: ExportState,
}

impl ExportWorkflow {
    /// Create a workflow from explicit strategies.
    #[must_use]
    pub fn new(
        primary: Box<dyn Rasterize>,
        fallback: Box<dyn Rasterize>,
        sink: Box<dyn FileSink>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            sink,
            config,
            state: ExportState::Idle,
        }
    }

    /// Create a workflow with the SVG rasterizer first and the compositor second.
    #[must_use]
    pub fn with_defaults(sink: Box<dyn FileSink>, config: WorkflowConfig) -> Self {
        Self::new(
            Box::new(VectorRasterizer::new()),
            Box::new(RasterCompositor::new()),
            sink,
            config,
        )
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ExportState {
        &self.state
    }

    /// Export `target` as PNG under `filename`.
    ///
    /// Never returns an error; failures end in [`ExportState::Failed`].
    pub async fn export(&mut self, target: Option<&RenderedCard>, filename: &str) -> ExportState {
        let Some(card) = target.filter(|card| card.root_element().is_some()) else {
            tracing::warn!("export requested without a rendered card");
            self.state = ExportState::failed(MISSING_CARD_MESSAGE);
            return self.state.clone();
        };

        self.state = ExportState::Exporting;
        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        self.state = match self.rasterize(card) {
            Some((strategy, png)) => match self.sink.save(filename, &png) {
                Ok(path) => ExportState::Succeeded {
                    strategy,
                    path,
                    bytes: png.len(),
                },
                Err(e) => {
                    tracing::error!(error = %e, "saving export failed");
                    ExportState::failed(DOWNLOAD_FAILED_MESSAGE)
                }
            },
            None => ExportState::failed(DOWNLOAD_FAILED_MESSAGE),
        };
        self.state.clone()
    }

    /// Try each strategy once, in order.
    fn rasterize(&self, card: &RenderedCard) -> Option<(StrategyKind, Vec<u8>)> {
        let chain: [(StrategyKind, &dyn Rasterize); 2] = [
            (StrategyKind::Primary, self.primary.as_ref()),
            (StrategyKind::Fallback, self.fallback.as_ref()),
        ];

        for (kind, strategy) in chain {
            match self.attempt(kind, strategy, card) {
                Ok(png) => {
                    tracing::info!(strategy = %kind, rasterizer = strategy.name(), bytes = png.len(), "card rasterized");
                    return Some((kind, png));
                }
                Err(e) => {
                    tracing::warn!(strategy = %kind, rasterizer = strategy.name(), error = %e, "rasterization failed");
                }
            }
        }
        None
    }

    /// Only the primary output is checked for plausibility; the fallback
    /// fails only by erroring.
    fn attempt(
        &self,
        kind: StrategyKind,
        strategy: &dyn Rasterize,
        card: &RenderedCard,
    ) -> RenderResult<Vec<u8>> {
        let png = strategy.rasterize(card)?;
        if kind == StrategyKind::Fallback {
            return Ok(png);
        }
        let url_len = png_data_url(&png).len();
        if url_len < self.config.min_data_url_len {
            return Err(RenderError::Export(format!(
                "output too small ({url_len} < {} characters)",
                self.config.min_data_url_len
            )));
        }
        Ok(png)
    }
}
