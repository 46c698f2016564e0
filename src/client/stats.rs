use reqwest::Method;
use serde::Deserialize;

use super::{ensure_success, ApiError, HaloClient};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariantReference {
    pub asset_id: String,
    pub version_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchInfo {
    pub map_variant: VariantReference,
    pub ugc_game_variant: VariantReference,
}

/// The subset of `/hi/matches/{id}/stats` the bookmarker reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchStats {
    pub match_id: String,
    pub match_info: MatchInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilmInfo {
    pub asset_id: String,
}

impl HaloClient {
    pub async fn get_match_stats(
        &self,
        spartan_token: &str,
        match_id: &str,
    ) -> Result<MatchStats, ApiError> {
        let response = self
            .build_request(
                Method::GET,
                &self.stats_url,
                &format!("/hi/matches/{}/stats", match_id),
                spartan_token,
            )
            .send()
            .await?;

        let stats = ensure_success(response).await?.json().await?;
        Ok(stats)
    }

    pub async fn get_match_film(
        &self,
        spartan_token: &str,
        match_id: &str,
    ) -> Result<FilmInfo, ApiError> {
        let response = self
            .build_request(
                Method::GET,
                &self.discovery_url,
                &format!("/hi/films/matches/{}/spectate", match_id),
                spartan_token,
            )
            .send()
            .await?;

        let film = ensure_success(response).await?.json().await?;
        Ok(film)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::client_for;
    use super::*;

    const MATCH_ID: &str = "ae4daed6-251a-4c2f-bc6f-eb25eac1bfd1";

    #[tokio::test]
    async fn test_get_match_stats_parses_variants() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", format!("/stats/hi/matches/{}/stats", MATCH_ID).as_str())
            .match_header("x-343-authorization-spartan", "token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "MatchId": "ae4daed6-251a-4c2f-bc6f-eb25eac1bfd1",
                    "MatchInfo": {
                        "StartTime": "2023-01-01T00:00:00Z",
                        "MapVariant": {
                            "AssetKind": 2,
                            "AssetId": "map-asset",
                            "VersionId": "map-version"
                        },
                        "UgcGameVariant": {
                            "AssetKind": 6,
                            "AssetId": "mode-asset",
                            "VersionId": "mode-version"
                        }
                    },
                    "Players": []
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let stats = client.get_match_stats("token", MATCH_ID).await.unwrap();

        mock.assert_async().await;
        assert_eq!(stats.match_id, MATCH_ID);
        assert_eq!(stats.match_info.map_variant.asset_id, "map-asset");
        assert_eq!(stats.match_info.map_variant.version_id, "map-version");
        assert_eq!(stats.match_info.ugc_game_variant.asset_id, "mode-asset");
        assert_eq!(stats.match_info.ugc_game_variant.version_id, "mode-version");
    }

    #[tokio::test]
    async fn test_get_match_stats_unknown_match_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/stats/hi/matches/{}/stats", MATCH_ID).as_str())
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.get_match_stats("token", MATCH_ID).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn test_get_match_film_reads_asset_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                format!("/discovery/hi/films/matches/{}/spectate", MATCH_ID).as_str(),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"FilmStatusBond": 1, "AssetId": "film-asset"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let film = client.get_match_film("token", MATCH_ID).await.unwrap();
        assert_eq!(film.asset_id, "film-asset");
    }

    #[tokio::test]
    async fn test_get_match_film_server_error_keeps_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                format!("/discovery/hi/films/matches/{}/spectate", MATCH_ID).as_str(),
            )
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = client_for(&server);
        match client.get_match_film("token", MATCH_ID).await {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }
}
