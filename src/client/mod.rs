use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use thiserror::Error;

use crate::config::ApiEndpoints;

mod stats;
mod ugc;

pub use stats::{FilmInfo, MatchInfo, MatchStats, VariantReference};

const SPARTAN_TOKEN_HEADER: &str = "x-343-authorization-spartan";
const USER_AGENT: &str = concat!("infinite-bookmarker/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("asset not found")]
    NotFound,
    #[error("API error ({status}): {body}")]
    Status { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Which UGC sub-resource a bookmark targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkCategory {
    Maps,
    UgcGameVariants,
    Films,
}

impl BookmarkCategory {
    /// Path segment used by the Waypoint UGC services.
    pub fn as_str(self) -> &'static str {
        match self {
            BookmarkCategory::Maps => "maps",
            BookmarkCategory::UgcGameVariants => "ugcgamevariants",
            BookmarkCategory::Films => "films",
        }
    }

    /// `AssetKind` value sent with favorites.
    pub fn asset_kind(self) -> &'static str {
        match self {
            BookmarkCategory::Maps => "Map",
            BookmarkCategory::UgcGameVariants => "UgcGameVariant",
            BookmarkCategory::Films => "Film",
        }
    }

    /// Label printed in match summaries.
    pub fn label(self) -> &'static str {
        match self {
            BookmarkCategory::Maps => "MapVariant",
            BookmarkCategory::UgcGameVariants => "UgcGameVariant",
            BookmarkCategory::Films => "Film",
        }
    }
}

impl fmt::Display for BookmarkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The calls the bookmark flow needs from Halo Waypoint.
#[async_trait]
pub trait GamePlatform: Send + Sync {
    async fn match_stats(&self, spartan_token: &str, match_id: &str)
        -> Result<MatchStats, ApiError>;

    async fn match_film(&self, spartan_token: &str, match_id: &str) -> Result<FilmInfo, ApiError>;

    /// `Err(ApiError::NotFound)` when the asset is not published.
    async fn ping_published_asset(
        &self,
        spartan_token: &str,
        category: BookmarkCategory,
        asset_id: &str,
    ) -> Result<(), ApiError>;

    async fn clone_asset(
        &self,
        xuid: &str,
        spartan_token: &str,
        category: BookmarkCategory,
        asset_id: &str,
        version_id: &str,
    ) -> Result<(), ApiError>;

    async fn bookmark(
        &self,
        xuid: &str,
        spartan_token: &str,
        category: BookmarkCategory,
        asset_id: &str,
        version_id: Option<&str>,
    ) -> Result<(), ApiError>;
}

pub struct HaloClient {
    client: Client,
    stats_url: String,
    discovery_url: String,
    authoring_url: String,
}

impl HaloClient {
    pub fn new(endpoints: &ApiEndpoints) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            stats_url: endpoints.stats_url.trim_end_matches('/').to_string(),
            discovery_url: endpoints.discovery_url.trim_end_matches('/').to_string(),
            authoring_url: endpoints.authoring_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_request(
        &self,
        method: Method,
        base_url: &str,
        path: &str,
        spartan_token: &str,
    ) -> RequestBuilder {
        let url = format!("{}{}", base_url, path);
        tracing::debug!(%method, %url, "sending request");

        self.client
            .request(method, &url)
            .header(SPARTAN_TOKEN_HEADER, spartan_token)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

/// Map a non-success response to an [`ApiError`], 404 becoming `NotFound`.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    tracing::debug!(%status, url = %response.url(), "received response");

    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    tracing::warn!(%status, %body, "request rejected");
    Err(ApiError::Status { status, body })
}
