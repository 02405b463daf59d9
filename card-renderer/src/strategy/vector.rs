//! Primary strategy: serialize the card to SVG and rasterize it with resvg.

use card_core::RenderedCard;

use crate::export::{ensure_embeddable_photos, ExportConfig, SceneExporter};
use crate::RenderResult;

use super::Rasterize;

/// Pixel density of the primary export.
pub const VECTOR_SCALE: f32 = 3.0;

/// SVG + resvg rasterizer.
pub struct VectorRasterizer {
    exporter: SceneExporter,
}

impl VectorRasterizer {
    /// Create a rasterizer at the default pixel density on the card background.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ExportConfig {
            scale: VECTOR_SCALE,
            ..ExportConfig::default()
        })
    }

    /// Create a rasterizer with a custom export configuration.
    #[must_use]
    pub fn with_config(config: ExportConfig) -> Self {
        Self {
            exporter: SceneExporter::new(config),
        }
    }
}

impl Default for VectorRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterize for VectorRasterizer {
    fn name(&self) -> &'static str {
        "svg-resvg"
    }

    fn rasterize(&self, card: &RenderedCard) -> RenderResult<Vec<u8>> {
        ensure_embeddable_photos(&card.scene)?;
        tracing::debug!(
            elements = card.scene.element_count(),
            scale = self.exporter.config().scale,
            "rasterizing card via SVG"
        );
        self.exporter.render_to_png(&card.scene)
    }
}
