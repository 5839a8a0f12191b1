use std::future::Future;

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::CoverArt;

/// Failure of a single lookup, classified at the client boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("{description} (code: {code})")]
    Protocol { code: u16, description: String },
    #[error("{0}")]
    Other(String),
}

impl LookupError {
    pub fn from_status(status: StatusCode) -> Self {
        Self::Protocol {
            code: status.as_u16(),
            description: status
                .canonical_reason()
                .unwrap_or("Unknown Status")
                .to_string(),
        }
    }
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::from_status(status),
            None => Self::Other(err.to_string()),
        }
    }
}

/// Finds cover art for an artist / release pair. `Ok(None)` means the
/// service answered but had no art.
pub trait LookupClient: Send + Sync + 'static {
    fn lookup(
        &self,
        artist: &str,
        release_title: &str,
    ) -> impl Future<Output = Result<Option<CoverArt>, LookupError>> + Send;
}
