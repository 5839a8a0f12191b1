use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use crate::app::AppMessage;
use crate::config::AppConfig;
use crate::models::{CoverArt, SearchRequest};

#[derive(Clone)]
pub struct CoverArtSaverHandle {
    tx: UnboundedSender<SaveJob>,
}

impl CoverArtSaverHandle {
    pub fn enqueue(&self, request: SearchRequest, art: CoverArt) -> Result<()> {
        self.tx
            .send(SaveJob { request, art })
            .context("failed to enqueue cover art save")
    }
}

/// Starts the single writer task that stores found cover art on disk.
pub fn spawn(config: &AppConfig, message_tx: UnboundedSender<AppMessage>) -> CoverArtSaverHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let cover_art_dir = PathBuf::from(config.cover_art_dir());

    tokio::spawn(async move {
        run_saver(message_tx, cover_art_dir, rx).await;
    });

    CoverArtSaverHandle { tx }
}

struct SaveJob {
    request: SearchRequest,
    art: CoverArt,
}

async fn run_saver(
    message_tx: UnboundedSender<AppMessage>,
    cover_art_dir: PathBuf,
    mut rx: UnboundedReceiver<SaveJob>,
) {
    while let Some(job) = rx.recv().await {
        let label = job.request.label();

        match save_cover_art(&job, &cover_art_dir).await {
            Ok(path) => {
                info!(path = %path.display(), "saved cover art");
                let _ = message_tx.send(AppMessage::SaveLog(format!(
                    "Saved cover art for {label} to {}",
                    path.display()
                )));
            }
            Err(err) => {
                warn!("failed to save cover art for {label}: {err:#}");
                let _ = message_tx.send(AppMessage::SaveLog(format!(
                    "Failed to save cover art for {label}: {err}"
                )));
            }
        }
    }
}

fn cover_art_filename(request: &SearchRequest, art: &CoverArt) -> String {
    sanitize_filename::sanitize(format!("{}.{}", request.label(), art.extension()))
}

async fn save_cover_art(job: &SaveJob, cover_art_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(cover_art_dir)
        .await
        .context("failed to ensure cover art directory exists")?;
    let path = cover_art_dir.join(cover_art_filename(&job.request, &job.art));
    tokio::fs::write(&path, &job.art.bytes)
        .await
        .with_context(|| format!("failed to write cover art to {}", path.display()))?;
    Ok(path)
}
