//! # Wishcard Studio
//!
//! Generates one personalised New Year card and exports it.

use anyhow::Context;
use card_core::FormAction;
use card_renderer::{DirectorySink, ExportState, ExportWorkflow};
use card_studio::{init_tracing, load_photo, CliArgs, GeminiWishProvider, Studio, StudioConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = StudioConfig::from(CliArgs::parse());
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        out_dir = %config.out_dir.display(),
        model = %config.model,
        "starting card studio"
    );
    if config.api_key.is_none() {
        tracing::warn!("no API key set (GEMINI_API_KEY or API_KEY); the fixed wish will be used");
    }

    let provider = GeminiWishProvider::new(
        &config.endpoint,
        config.model.clone(),
        config.api_key.clone(),
    )
    .context("failed to create wish provider")?;
    let workflow = ExportWorkflow::with_defaults(
        Box::new(DirectorySink::new(&config.out_dir)),
        config.workflow.clone(),
    );
    let mut studio = Studio::new(Box::new(provider), workflow);

    studio.apply(FormAction::SetName(config.name.clone()))?;
    if let Some(path) = &config.photo {
        let uri = load_photo(path).await?;
        studio.apply(FormAction::SetPhoto(Some(uri)))?;
    }
    studio.apply(FormAction::SetScale(config.scale.get()))?;
    studio.apply(FormAction::SetTheme(config.theme))?;

    let rendered = studio.submit().await.context("failed to generate card")?;
    tracing::debug!(elements = rendered.scene.element_count(), "card rendered");

    if config.export {
        match studio.export().await? {
            ExportState::Succeeded { path, .. } => println!("{}", path.display()),
            ExportState::Failed { message } => anyhow::bail!(message),
            ExportState::Idle | ExportState::Exporting => {}
        }
    }

    if config.print {
        let path = studio
            .print(&config.out_dir)
            .context("failed to write print document")?;
        println!("{}", path.display());
    }

    Ok(())
}
