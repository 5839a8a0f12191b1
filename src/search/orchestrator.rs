use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::app::AppMessage;
use crate::models::{CoverArt, SearchCompletion, SearchOutcome, SearchRequest};

use super::lookup::{LookupClient, LookupError};
use super::validator::validate;

pub const SEARCHING_MESSAGE: &str = "Searching for cover art ... please wait.";
pub const FOUND_MESSAGE: &str = "Found cover art !";
pub const NOT_FOUND_MESSAGE: &str = "Sorry, no cover art was found.";

/// Presentation-side sink for search progress. Only ever called from the
/// foreground event loop.
pub trait ResultReporter {
    fn on_validation_error(&mut self, message: &str);
    fn on_searching(&mut self, message: &str);
    fn on_found(&mut self, art: CoverArt);
    fn on_not_found(&mut self);
    fn on_error(&mut self, message: &str);
}

/// Drives each search from raw form input to a reported outcome.
///
/// `submit` runs on the foreground loop and only spawns the lookup; the
/// spawned task posts a [`SearchCompletion`] on the app channel and the loop
/// hands it back through [`SearchOrchestrator::complete`]. Completions are
/// applied in arrival order, so the last one to arrive is what stays on screen.
pub struct SearchOrchestrator<C> {
    client: Arc<C>,
    message_tx: UnboundedSender<AppMessage>,
    last_id: u64,
}

impl<C: LookupClient> SearchOrchestrator<C> {
    pub fn new(client: C, message_tx: UnboundedSender<AppMessage>) -> Self {
        Self {
            client: Arc::new(client),
            message_tx,
            last_id: 0,
        }
    }

    /// Returns the id and validated request of the spawned search, or `None`
    /// if the input was rejected.
    pub fn submit(
        &mut self,
        artist_raw: &str,
        release_raw: &str,
        reporter: &mut impl ResultReporter,
    ) -> Option<(u64, SearchRequest)> {
        let request = match validate(artist_raw, release_raw) {
            Ok(request) => request,
            Err(err) => {
                debug!("rejected search input: {err}");
                reporter.on_validation_error(&err.to_string());
                return None;
            }
        };

        reporter.on_searching(SEARCHING_MESSAGE);

        self.last_id += 1;
        let id = self.last_id;
        let client = Arc::clone(&self.client);
        let tx = self.message_tx.clone();
        let submitted = request.clone();

        info!(id, request = %request.label(), "starting cover art lookup");

        tokio::spawn(
            async move {
                let result = client
                    .lookup(request.artist(), request.release_title())
                    .await;
                let outcome = SearchOutcome::from(result);

                let completion = SearchCompletion {
                    id,
                    request,
                    outcome,
                };
                if tx.send(AppMessage::SearchFinished(completion)).is_err() {
                    warn!("event loop is gone, dropping lookup result");
                }
            }
            .instrument(info_span!("lookup", id)),
        );

        Some((id, submitted))
    }

    /// Reports a finished search. Must be called from the foreground loop.
    pub fn complete(&self, completion: SearchCompletion, reporter: &mut impl ResultReporter) {
        let SearchCompletion {
            id,
            request,
            outcome,
        } = completion;

        if id < self.last_id {
            debug!(id, latest = self.last_id, "older search finished after a newer one was submitted");
        }

        match outcome {
            SearchOutcome::Found(art) => {
                info!(
                    id,
                    request = %request.label(),
                    source = %art.source_url,
                    "found cover art"
                );
                reporter.on_found(art);
            }
            SearchOutcome::NotFound => {
                info!(id, request = %request.label(), "no cover art");
                reporter.on_not_found();
            }
            SearchOutcome::Failed(err) => {
                warn!(id, request = %request.label(), "lookup failed: {err}");
                reporter.on_error(&failure_message(&err));
            }
        }
    }
}

pub fn failure_message(err: &LookupError) -> String {
    match err {
        LookupError::Protocol { code, description } => {
            format!("Sorry, an HTTP error occurred: {description} (code: {code})")
        }
        LookupError::Other(message) => format!("Sorry, an error occurred: {message}"),
    }
}
