use thiserror::Error;

use crate::models::SearchRequest;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter both artist and album / title !")]
    Empty,
}

/// Trims both fields and rejects the pair if either ends up empty.
pub fn validate(artist_raw: &str, release_raw: &str) -> Result<SearchRequest, ValidationError> {
    let artist = artist_raw.trim();
    let release = release_raw.trim();

    if artist.is_empty() || release.is_empty() {
        return Err(ValidationError::Empty);
    }

    Ok(SearchRequest::new(artist.to_string(), release.to_string()))
}
