use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use uuid::Uuid;

/// Static configuration and filesystem paths used throughout the application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    data_dir: PathBuf,
    cover_art_dir: PathBuf,
    log_path: PathBuf,
    user_agent: String,
    client_id: String,
    musicbrainz_base: String,
    cover_art_base: String,
    request_timeout: Duration,
    connect_timeout: Duration,
    musicbrainz_interval: Duration,
    search_limit: usize,
    max_candidates: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let base = PathBuf::from("data");
        let cover_art = base.join("cover_art");
        let log_path = base.join("coverart-finder.log");

        let client_id = format!("coverart-finder-{}", Uuid::new_v4());
        let user_agent = format!(
            "coverart-finder/{} ( https://musicbrainz.org ; unique-id={client_id} )",
            env!("CARGO_PKG_VERSION")
        );

        Self {
            data_dir: base,
            cover_art_dir: cover_art,
            log_path,
            user_agent,
            client_id,
            musicbrainz_base: String::from("https://musicbrainz.org/ws/2"),
            cover_art_base: String::from("https://coverartarchive.org"),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            musicbrainz_interval: Duration::from_millis(1100),
            search_limit: 10,
            max_candidates: 5,
        }
    }
}

impl AppConfig {
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn cover_art_dir(&self) -> &Path {
        &self.cover_art_dir
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn musicbrainz_base(&self) -> &str {
        &self.musicbrainz_base
    }

    pub fn cover_art_base(&self) -> &str {
        &self.cover_art_base
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Minimum spacing between MusicBrainz requests; the service allows one per second.
    pub fn musicbrainz_interval(&self) -> Duration {
        self.musicbrainz_interval
    }

    /// Number of releases requested from a single MusicBrainz search.
    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    /// Upper bound on releases checked against the Cover Art Archive per lookup.
    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    /// Relocates every on-disk path under `base`.
    #[cfg(test)]
    pub fn with_data_dir(mut self, base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        self.cover_art_dir = base.join("cover_art");
        self.log_path = base.join("coverart-finder.log");
        self.data_dir = base;
        self
    }

    /// Points the lookup client at other MusicBrainz / Cover Art Archive hosts.
    #[cfg(test)]
    pub fn with_endpoints(
        mut self,
        musicbrainz_base: impl Into<String>,
        cover_art_base: impl Into<String>,
    ) -> Self {
        self.musicbrainz_base = musicbrainz_base.into();
        self.cover_art_base = cover_art_base.into();
        self
    }

    #[cfg(test)]
    pub fn with_musicbrainz_interval(mut self, interval: Duration) -> Self {
        self.musicbrainz_interval = interval;
        self
    }

    /// Ensures that required directories exist.
    pub fn ensure_filesystem(&self) -> Result<()> {
        for path in [self.data_dir(), self.cover_art_dir()] {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }

        Ok(())
    }
}
