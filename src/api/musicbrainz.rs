use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, Url, header};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

use crate::config::AppConfig;
use crate::models::{CoverArt, CoverEntity};
use crate::search::{LookupClient, LookupError};

/// Finds cover art by searching MusicBrainz for matching releases and checking
/// the Cover Art Archive for each candidate in score order.
#[derive(Clone)]
pub struct MusicBrainzClient {
    http: Client,
    musicbrainz_base: String,
    cover_art_base: String,
    search_limit: usize,
    max_candidates: usize,
    interval: Duration,
    throttle: Arc<Mutex<Option<Instant>>>,
}

impl MusicBrainzClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, image/jpeg, image/png"),
        );
        headers.insert(
            "X-Client-Id",
            header::HeaderValue::from_str(config.client_id())
                .context("invalid client identifier header value")?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent())
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .context("unable to construct http client")?;

        Ok(Self {
            http,
            musicbrainz_base: config.musicbrainz_base().trim_end_matches('/').to_string(),
            cover_art_base: config.cover_art_base().trim_end_matches('/').to_string(),
            search_limit: config.search_limit(),
            max_candidates: config.max_candidates(),
            interval: config.musicbrainz_interval(),
            throttle: Arc::new(Mutex::new(None)),
        })
    }

    async fn search_releases(
        &self,
        artist: &str,
        release_title: &str,
    ) -> Result<Candidates, LookupError> {
        let query = format!(
            "artist:{} AND release:{}",
            quote_term(artist),
            quote_term(release_title)
        );
        let body: ReleaseSearchResponse = self.get_json("release", &query).await?;
        Ok(Candidates::from_releases(body.releases, self.max_candidates))
    }

    /// Fallback for when the title is a track rather than an album.
    async fn search_recordings(
        &self,
        artist: &str,
        recording_title: &str,
    ) -> Result<Candidates, LookupError> {
        let query = format!(
            "recording:{} AND artist:{}",
            quote_term(recording_title),
            quote_term(artist)
        );
        let body: RecordingSearchResponse = self.get_json("recording", &query).await?;
        Ok(Candidates::from_recordings(body.recordings, self.max_candidates))
    }

    async fn get_json<T>(&self, entity: &str, query: &str) -> Result<T, LookupError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let limit = self.search_limit.to_string();
        let url = Url::parse_with_params(
            &format!("{}/{entity}", self.musicbrainz_base),
            [("query", query), ("fmt", "json"), ("limit", limit.as_str())],
        )
        .map_err(|err| LookupError::Other(format!("invalid search url: {err}")))?;

        self.await_throttle().await;
        debug!(%url, "querying musicbrainz");
        let response = self.http.get(url).send().await?.error_for_status()?;

        response
            .json()
            .await
            .map_err(|err| LookupError::Other(format!("failed to parse response: {err}")))
    }

    /// `Ok(None)` when the archive has no front image for this entity.
    async fn fetch_front(
        &self,
        entity: CoverEntity,
        id: &str,
    ) -> Result<Option<CoverArt>, LookupError> {
        let url = format!(
            "{}/{}/{id}/front",
            self.cover_art_base,
            entity.path_segment()
        );
        debug!(%url, "requesting cover art archive front image");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LookupError::from_status(status));
        }

        let mime = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        let id = id.to_string();
        let art = tokio::task::spawn_blocking(move || {
            CoverArt::decode(entity, id, url, mime, bytes)
        })
        .await
        .map_err(|err| LookupError::Other(format!("image decoding task failed: {err}")))?
        .map_err(|err| LookupError::Other(format!("invalid cover art image: {err}")))?;

        Ok(Some(art))
    }

    async fn await_throttle(&self) {
        let mut guard = self.throttle.lock().await;
        if let Some(last) = *guard {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }
        *guard = Some(Instant::now());
    }
}

impl LookupClient for MusicBrainzClient {
    async fn lookup(
        &self,
        artist: &str,
        release_title: &str,
    ) -> Result<Option<CoverArt>, LookupError> {
        let mut candidates = self.search_releases(artist, release_title).await?;
        if candidates.is_empty() {
            debug!("no matching releases, trying recordings");
            candidates = self.search_recordings(artist, release_title).await?;
        }
        if candidates.is_empty() {
            return Ok(None);
        }

        for id in &candidates.releases {
            if let Some(art) = self.fetch_front(CoverEntity::Release, id).await? {
                return Ok(Some(art));
            }
        }
        for id in &candidates.release_groups {
            if let Some(art) = self.fetch_front(CoverEntity::ReleaseGroup, id).await? {
                return Ok(Some(art));
            }
        }

        Ok(None)
    }
}

/// Wraps user text in a Lucene phrase.
fn quote_term(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Release and release-group ids worth checking, best match first.
#[derive(Debug, Default, PartialEq, Eq)]
struct Candidates {
    releases: Vec<String>,
    release_groups: Vec<String>,
}

impl Candidates {
    fn from_releases(mut releases: Vec<ReleaseItem>, max: usize) -> Self {
        releases.sort_by(|a, b| b.score.cmp(&a.score));

        let mut candidates = Self::default();
        for release in releases {
            candidates.push(release, max);
        }
        candidates
    }

    fn from_recordings(mut recordings: Vec<RecordingItem>, max: usize) -> Self {
        recordings.sort_by(|a, b| b.score.cmp(&a.score));

        let mut candidates = Self::default();
        for release in recordings.into_iter().flat_map(|recording| recording.releases) {
            candidates.push(release, max);
        }
        candidates
    }

    fn push(&mut self, release: ReleaseItem, max: usize) {
        if !release.id.is_empty()
            && self.releases.len() < max
            && !self.releases.contains(&release.id)
        {
            self.releases.push(release.id);
        }

        let group_id = release.release_group.id;
        if !group_id.is_empty()
            && self.release_groups.len() < max
            && !self.release_groups.contains(&group_id)
        {
            self.release_groups.push(group_id);
        }
    }

    fn is_empty(&self) -> bool {
        self.releases.is_empty() && self.release_groups.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ReleaseSearchResponse {
    releases: Vec<ReleaseItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RecordingSearchResponse {
    recordings: Vec<RecordingItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RecordingItem {
    score: i32,
    releases: Vec<ReleaseItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ReleaseItem {
    id: String,
    score: i32,
    #[serde(rename = "release-group")]
    release_group: ReleaseGroupRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ReleaseGroupRef {
    id: String,
}
