use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::models::{CatalogAnime, CatalogCharacter, CharacterRole, Envelope};

pub const DEFAULT_CATALOG_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Page size of a popular batch
pub const POPULAR_BATCH_SIZE: u32 = 25;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only anime metadata provider.
///
/// Lookups never fail: an unreachable or misbehaving provider yields an
/// empty list or `None`.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn top_anime(&self, limit: u32, page: u32) -> Vec<CatalogAnime>;
    async fn random_character(&self) -> Option<CatalogCharacter>;
    async fn random_anime(&self) -> Option<CatalogAnime>;
    async fn search_anime(&self, query: &str, limit: u32) -> Vec<CatalogAnime>;
    async fn anime_characters(&self, anime_id: i64) -> Vec<CharacterRole>;

    async fn popular_batch(&self, page: u32) -> Vec<CatalogAnime> {
        self.top_anime(POPULAR_BATCH_SIZE, page).await
    }
}

/// Jikan v4 client
pub struct JikanCatalog {
    base_url: String,
    http: reqwest::Client,
}

impl JikanCatalog {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Option<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "Querying catalog");

        let response = match self.http.get(&url).query(query).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Catalog unreachable");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Catalog returned an error status");
            return None;
        }

        match response.json::<Envelope<T>>().await {
            Ok(envelope) => envelope.data,
            Err(e) => {
                warn!(url = %url, error = %e, "Catalog payload could not be parsed");
                None
            }
        }
    }
}

#[async_trait]
impl CatalogService for JikanCatalog {
    #[instrument(skip(self))]
    async fn top_anime(&self, limit: u32, page: u32) -> Vec<CatalogAnime> {
        self.fetch(
            "top/anime",
            &[("limit", limit.to_string()), ("page", page.to_string())],
        )
        .await
        .unwrap_or_default()
    }

    #[instrument(skip(self))]
    async fn random_character(&self) -> Option<CatalogCharacter> {
        self.fetch("random/characters", &[]).await
    }

    #[instrument(skip(self))]
    async fn random_anime(&self) -> Option<CatalogAnime> {
        self.fetch("random/anime", &[]).await
    }

    #[instrument(skip(self))]
    async fn search_anime(&self, query: &str, limit: u32) -> Vec<CatalogAnime> {
        self.fetch(
            "anime",
            &[("q", query.to_string()), ("limit", limit.to_string())],
        )
        .await
        .unwrap_or_default()
    }

    #[instrument(skip(self))]
    async fn anime_characters(&self, anime_id: i64) -> Vec<CharacterRole> {
        self.fetch(&format!("anime/{}/characters", anime_id), &[])
            .await
            .unwrap_or_default()
    }
}
