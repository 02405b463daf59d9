//! The studio shell: form state, wish generation, preview and export.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use card_core::{
    render, CardError, ExportStatus, FormAction, FormState, RenderedCard, FALLBACK_WISH,
};
use card_renderer::{
    encode_data_uri, DirectorySink, ExportConfig, ExportState, ExportWorkflow, FileSink,
    RenderError, SceneExporter,
};
use thiserror::Error;
use tokio::sync::watch;

use crate::wish::WishProvider;

/// Pixel density of the print PDF raster.
const PRINT_SCALE: f32 = 2.0;

/// Errors surfaced by the studio shell.
#[derive(Debug, Error)]
pub enum StudioError {
    /// The form rejected the action.
    #[error(transparent)]
    Card(#[from] CardError),
    /// Rendering the print document failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Reading an input file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Async shell driving one card from form input to exported file.
pub struct Studio {
    form: FormState,
    provider: Box<dyn WishProvider>,
    workflow: ExportWorkflow,
    preview: watch::Sender<Option<Arc<RenderedCard>>>,
}

impl Studio {
    /// Create a studio around a wish provider and an export workflow.
    #[must_use]
    pub fn new(provider: Box<dyn WishProvider>, workflow: ExportWorkflow) -> Self {
        let (preview, _) = watch::channel(None);
        Self {
            form: FormState::new(),
            provider,
            workflow,
            preview,
        }
    }

    /// Current form state.
    #[must_use]
    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Apply a form edit.
    ///
    /// # Errors
    ///
    /// Returns the form's rejection, see [`FormState::apply`].
    pub fn apply(&mut self, action: FormAction) -> Result<(), StudioError> {
        self.form.apply(action)?;
        Ok(())
    }

    /// Watch for rendered previews. Holds `None` until the first card renders.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<RenderedCard>>> {
        self.preview.subscribe()
    }

    /// Generate the wish, build the card and publish the preview.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::EmptyName`] for a blank name and
    /// [`CardError::Busy`] while another action runs.
    pub async fn submit(&mut self) -> Result<Arc<RenderedCard>, StudioError> {
        self.form.apply(FormAction::BeginGenerate)?;
        let user = self.form.user_info().clone();

        let wish = self.provider.generate_wish(&user).await;
        self.form.apply(FormAction::FinishGenerate(wish))?;

        let card = self.form.card().ok_or(CardError::NoCard)?;
        let rendered = Arc::new(render(card));
        self.preview.send_replace(Some(Arc::clone(&rendered)));

        tracing::info!(
            name = %card.user_info().name,
            photo = card.user_info().has_photo(),
            fallback_wish = card.wish() == FALLBACK_WISH,
            elements = rendered.scene.element_count(),
            file = %card.filename(),
            "preview is ready"
        );
        Ok(rendered)
    }

    /// Export the current card as PNG.
    ///
    /// Rasterization failures are reported in the returned state.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::Busy`] while another action runs.
    pub async fn export(&mut self) -> Result<ExportState, StudioError> {
        match self.form.apply(FormAction::BeginExport) {
            Ok(()) => {}
            Err(CardError::NoCard) => return Ok(self.workflow.export(None, "").await),
            Err(e) => return Err(e.into()),
        }

        let filename = self
            .form
            .card()
            .map(card_core::CardData::filename)
            .unwrap_or_default();

        // Hand over the card only once its preview has been published.
        let mut ready = self.preview.subscribe();
        let rendered = ready
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|card| card.clone());

        let state = self.workflow.export(rendered.as_deref(), &filename).await;
        let status = if state.is_success() {
            ExportStatus::Succeeded
        } else {
            ExportStatus::Failed
        };
        self.form.apply(FormAction::FinishExport(status))?;

        match &state {
            ExportState::Succeeded { strategy, path, .. } => {
                tracing::info!(%strategy, path = %path.display(), "card downloaded");
            }
            ExportState::Failed { message } => tracing::error!(%message, "card export failed"),
            ExportState::Idle | ExportState::Exporting => {}
        }
        Ok(state)
    }

    /// Write a print-ready PDF of the current card into `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`CardError::NoCard`] before a card exists, or the render/save
    /// error.
    pub fn print(&self, dir: &Path) -> Result<PathBuf, StudioError> {
        let card = self.form.card().ok_or(CardError::NoCard)?;
        let rendered = self.preview.borrow().clone().ok_or(CardError::NoCard)?;

        let pdf = SceneExporter::new(ExportConfig {
            scale: PRINT_SCALE,
            ..ExportConfig::default()
        })
        .render_to_pdf(&rendered.scene)?;

        let filename = Path::new(&card.filename()).with_extension("pdf");
        let path = DirectorySink::new(dir).save(&filename.to_string_lossy(), &pdf)?;
        tracing::info!(path = %path.display(), "print document written");
        Ok(path)
    }
}

/// Read a photo from disk as a data URI.
///
/// # Errors
///
/// Returns [`StudioError::Io`] if the file cannot be read.
pub async fn load_photo(path: &Path) -> Result<String, StudioError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| StudioError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "photo loaded");
    Ok(encode_data_uri(&bytes))
}
