use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use super::{
    ensure_success, ApiError, BookmarkCategory, FilmInfo, GamePlatform, HaloClient, MatchStats,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct FavoriteRequest<'a> {
    asset_id: &'a str,
    asset_kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_id: Option<&'a str>,
}

impl HaloClient {
    pub async fn check_published(
        &self,
        spartan_token: &str,
        category: BookmarkCategory,
        asset_id: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .build_request(
                Method::GET,
                &self.discovery_url,
                &format!("/hi/{}/{}", category, asset_id),
                spartan_token,
            )
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    pub async fn clone_version(
        &self,
        xuid: &str,
        spartan_token: &str,
        category: BookmarkCategory,
        asset_id: &str,
        version_id: &str,
    ) -> Result<(), ApiError> {
        tracing::info!(%xuid, %category, %asset_id, %version_id, "cloning asset");

        let response = self
            .build_request(
                Method::POST,
                &self.authoring_url,
                &format!("/hi/{}/{}/versions/{}/clone", category, asset_id, version_id),
                spartan_token,
            )
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    pub async fn put_favorite(
        &self,
        xuid: &str,
        spartan_token: &str,
        category: BookmarkCategory,
        asset_id: &str,
        version_id: Option<&str>,
    ) -> Result<(), ApiError> {
        tracing::info!(%xuid, %category, %asset_id, ?version_id, "bookmarking asset");

        let payload = FavoriteRequest {
            asset_id,
            asset_kind: category.asset_kind(),
            version_id,
        };

        let response = self
            .build_request(
                Method::PUT,
                &self.authoring_url,
                &format!("/hi/players/xuid({})/favorites/{}/{}", xuid, category, asset_id),
                spartan_token,
            )
            .json(&payload)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl GamePlatform for HaloClient {
    async fn match_stats(
        &self,
        spartan_token: &str,
        match_id: &str,
    ) -> Result<MatchStats, ApiError> {
        self.get_match_stats(spartan_token, match_id).await
    }

    async fn match_film(&self, spartan_token: &str, match_id: &str) -> Result<FilmInfo, ApiError> {
        self.get_match_film(spartan_token, match_id).await
    }

    async fn ping_published_asset(
        &self,
        spartan_token: &str,
        category: BookmarkCategory,
        asset_id: &str,
    ) -> Result<(), ApiError> {
        self.check_published(spartan_token, category, asset_id).await
    }

    async fn clone_asset(
        &self,
        xuid: &str,
        spartan_token: &str,
        category: BookmarkCategory,
        asset_id: &str,
        version_id: &str,
    ) -> Result<(), ApiError> {
        self.clone_version(xuid, spartan_token, category, asset_id, version_id).await
    }

    async fn bookmark(
        &self,
        xuid: &str,
        spartan_token: &str,
        category: BookmarkCategory,
        asset_id: &str,
        version_id: Option<&str>,
    ) -> Result<(), ApiError> {
        self.put_favorite(xuid, spartan_token, category, asset_id, version_id).await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::super::tests::client_for;
    use super::*;

    const ASSET_ID: &str = "ae4daed6-251a-4c2f-bc6f-eb25eac1bfd1";
    const VERSION_ID: &str = "0b1a7c3e-9f2d-4e8a-a6b5-c4d3e2f1a0b9";

    #[tokio::test]
    async fn test_ping_published_asset_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", format!("/discovery/hi/maps/{}", ASSET_ID).as_str())
            .match_header("x-343-authorization-spartan", "token")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(&server);
        client
            .check_published("token", BookmarkCategory::Maps, ASSET_ID)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ping_unpublished_asset_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                format!("/discovery/hi/ugcgamevariants/{}", ASSET_ID).as_str(),
            )
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .check_published("token", BookmarkCategory::UgcGameVariants, ASSET_ID)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn test_ping_forbidden_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", format!("/discovery/hi/maps/{}", ASSET_ID).as_str())
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .check_published("token", BookmarkCategory::Maps, ASSET_ID)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { .. }));
    }

    #[tokio::test]
    async fn test_clone_asset_posts_to_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                format!("/authoring/hi/maps/{}/versions/{}/clone", ASSET_ID, VERSION_ID).as_str(),
            )
            .with_status(201)
            .create_async()
            .await;

        let client = client_for(&server);
        client
            .clone_version(
                "2533274800000000",
                "token",
                BookmarkCategory::Maps,
                ASSET_ID,
                VERSION_ID,
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bookmark_sends_favorite_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "PUT",
                format!(
                    "/authoring/hi/players/xuid(2533274800000000)/favorites/maps/{}",
                    ASSET_ID
                )
                .as_str(),
            )
            .match_body(Matcher::Json(serde_json::json!({
                "AssetId": ASSET_ID,
                "AssetKind": "Map",
                "VersionId": VERSION_ID,
            })))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server);
        client
            .put_favorite(
                "2533274800000000",
                "token",
                BookmarkCategory::Maps,
                ASSET_ID,
                Some(VERSION_ID),
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_bookmark_film_omits_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "PUT",
                format!(
                    "/authoring/hi/players/xuid(2533274800000000)/favorites/films/{}",
                    ASSET_ID
                )
                .as_str(),
            )
            .match_body(Matcher::Json(serde_json::json!({
                "AssetId": ASSET_ID,
                "AssetKind": "Film",
            })))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&server);
        client
            .put_favorite(
                "2533274800000000",
                "token",
                BookmarkCategory::Films,
                ASSET_ID,
                None,
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
