//! Rasterization strategies tried by the export workflow.

pub mod compositor;
pub mod vector;

pub use compositor::RasterCompositor;
pub use vector::VectorRasterizer;

use card_core::RenderedCard;
use serde::{Deserialize, Serialize};

use crate::RenderResult;

/// Position of a strategy in the export fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Tried first.
    Primary,
    /// Tried only after the primary strategy fails.
    Fallback,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Trait for card rasterizers.
pub trait Rasterize: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Rasterize a rendered card to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the card cannot be painted or encoded.
    fn rasterize(&self, card: &RenderedCard) -> RenderResult<Vec<u8>>;
}
