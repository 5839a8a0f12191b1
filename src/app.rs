use crate::models::SearchCompletion;

/// Everything background tasks send back to the foreground event loop.
#[derive(Debug, Clone)]
pub enum AppMessage {
    SearchFinished(SearchCompletion),
    SaveLog(String),
}
