mod api;
mod app;
mod config;
mod logging;
mod models;
mod search;
mod tasks;
mod tui;

use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::AppConfig::default();
    config.ensure_filesystem()?;
    logging::init(&config)?;
    info!(client_id = config.client_id(), "starting coverart-finder");

    let (msg_tx, msg_rx) = tokio::sync::mpsc::unbounded_channel();

    let client = api::musicbrainz::MusicBrainzClient::new(&config)?;
    let orchestrator = search::SearchOrchestrator::new(client, msg_tx.clone());
    let saver = tasks::cover_art::spawn(&config, msg_tx);

    let controller = tui::AppController::new(orchestrator, saver);

    let app = tui::App::new(controller, msg_rx);
    tui::run(app).await
}
