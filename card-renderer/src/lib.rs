//! # Wishcard Renderer
//!
//! Turns a rendered card scene into a downloadable PNG (or a print PDF).
//!
//! ## Export Chain
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            ExportWorkflow                   │
//! ├──────────────────────┬──────────────────────┤
//! │ VectorRasterizer     │ RasterCompositor     │
//! │ SVG → resvg (x3)     │ tiny-skia (x2)       │
//! │ tried first          │ tried on failure     │
//! ├──────────────────────┴──────────────────────┤
//! │            FileSink (DirectorySink)         │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;
pub mod sink;
pub mod strategy;
pub mod workflow;

pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, SceneExporter};
pub use image::{encode_data_uri, load_image_from_data_uri, png_data_url, ImageFormat};
pub use sink::{DirectorySink, FileSink};
pub use strategy::{RasterCompositor, Rasterize, StrategyKind, VectorRasterizer};
pub use workflow::{
    ExportState, ExportWorkflow, WorkflowConfig, DOWNLOAD_FAILED_MESSAGE, MISSING_CARD_MESSAGE,
};

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
