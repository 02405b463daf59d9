//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rasterization and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Rendering or encoding an export failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// An embedded image cannot be handled by this rasterization path.
    #[error("Unsupported embedded image: {0}")]
    UnsupportedImage(String),

    /// Writing the exported file failed.
    #[error("Failed to save export: {0}")]
    Save(#[from] std::io::Error),
}
