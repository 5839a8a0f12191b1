use crate::search::LookupError;

use super::CoverArt;

/// A validated pair of search terms, both non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    artist: String,
    release_title: String,
}

impl SearchRequest {
    /// Only the validator constructs requests, which keeps the non-empty invariant.
    pub(crate) fn new(artist: String, release_title: String) -> Self {
        Self {
            artist,
            release_title,
        }
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn release_title(&self) -> &str {
        &self.release_title
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.release_title)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(CoverArt),
    NotFound,
    Failed(LookupError),
}

impl From<Result<Option<CoverArt>, LookupError>> for SearchOutcome {
    fn from(result: Result<Option<CoverArt>, LookupError>) -> Self {
        match result {
            Ok(Some(art)) => SearchOutcome::Found(art),
            Ok(None) => SearchOutcome::NotFound,
            Err(err) => SearchOutcome::Failed(err),
        }
    }
}

/// What a background lookup hands back to the foreground loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCompletion {
    pub id: u64,
    pub request: SearchRequest,
    pub outcome: SearchOutcome,
}
