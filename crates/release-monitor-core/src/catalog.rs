//! Game catalog API client
//!
//! Talks to an IGDB-style REST endpoint: every request is a GET with the API
//! key in a `user-key` header and a `fields` selection, and every response
//! is a JSON array.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::models::{Game, Platform};

pub const DEFAULT_API_URL: &str = "https://api-endpoint.igdb.com";
pub const DEFAULT_IMAGE_HOST: &str = "https://images.igdb.com/igdb/image/upload";

const PLATFORM_FIELDS: &str = "id,name";
const GAME_SEARCH_FIELDS: &str = "id,name,release_dates,cover,summary,screenshots";
const GAME_LOOKUP_FIELDS: &str = "id,name,release_dates,cover,summary,websites,screenshots";
const PLATFORM_FILTER: &str = "filter[release_dates.platform][eq]";

/// Catalog API configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub api_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Read-only view of the remote catalog used by the stores
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search_platforms(&self, query: &str) -> Result<Vec<Platform>>;

    /// Games matching `query` that have a release date on `platform_id`
    async fn search_games(&self, query: &str, platform_id: i64) -> Result<Vec<Game>>;

    /// A single game, with release dates filtered to `platform_id`
    async fn fetch_game(&self, game_id: i64, platform_id: i64) -> Result<Game>;
}

/// HTTP implementation of [`Catalog`]
pub struct CatalogClient {
    config: CatalogConfig,
    client: reqwest::Client,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ReleaseMonitor/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    /// Check if an API key is configured
    pub fn has_credentials(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.endpoint(path))
            .header("user-key", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn platform_search_request(&self, query: &str) -> reqwest::RequestBuilder {
        self.get("platforms/")
            .query(&[("search", query), ("fields", PLATFORM_FIELDS)])
    }

    fn game_search_request(&self, query: &str, platform_id: i64) -> reqwest::RequestBuilder {
        let platform = platform_id.to_string();
        self.get("games/").query(&[
            ("search", query),
            (PLATFORM_FILTER, platform.as_str()),
            ("fields", GAME_SEARCH_FIELDS),
        ])
    }

    fn game_lookup_request(&self, game_id: i64, platform_id: i64) -> reqwest::RequestBuilder {
        let platform = platform_id.to_string();
        self.get(&format!("games/{}", game_id)).query(&[
            (PLATFORM_FILTER, platform.as_str()),
            ("fields", GAME_LOOKUP_FIELDS),
        ])
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<Vec<T>> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Catalog API error: {} - {}", status, body);
            return Err(Error::Api { status, body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(Error::Decode)
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn search_platforms(&self, query: &str) -> Result<Vec<Platform>> {
        tracing::debug!(query, "Searching platforms");
        self.send(self.platform_search_request(query)).await
    }

    async fn search_games(&self, query: &str, platform_id: i64) -> Result<Vec<Game>> {
        tracing::debug!(query, platform_id, "Searching games");
        self.send(self.game_search_request(query, platform_id)).await
    }

    async fn fetch_game(&self, game_id: i64, platform_id: i64) -> Result<Game> {
        tracing::debug!(game_id, platform_id, "Fetching game");
        let games: Vec<Game> = self.send(self.game_lookup_request(game_id, platform_id)).await?;
        games.into_iter().next().ok_or(Error::GameNotFound {
            game_id,
            platform_id,
        })
    }
}

/// Image sizes served by the image host
/// See: https://api-docs.igdb.com/#images
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageSize {
    CoverSmall,
    #[default]
    CoverBig,
    ScreenshotMed,
    ScreenshotBig,
    ScreenshotHuge,
    Thumb,
    Micro,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::CoverSmall => "cover_small",
            ImageSize::CoverBig => "cover_big",
            ImageSize::ScreenshotMed => "screenshot_med",
            ImageSize::ScreenshotBig => "screenshot_big",
            ImageSize::ScreenshotHuge => "screenshot_huge",
            ImageSize::Thumb => "thumb",
            ImageSize::Micro => "micro",
        }
    }
}

/// Build the display URL of an image. No network access involved.
pub fn image_url(host: &str, cloudinary_id: &str, size: ImageSize) -> String {
    format!(
        "{}/t_{}/{}.jpg",
        host.trim_end_matches('/'),
        size.as_str(),
        cloudinary_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client() -> CatalogClient {
        CatalogClient::new(CatalogConfig {
            api_url: "https://catalog.test/".to_string(),
            api_key: "key123".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn query_of(request: &reqwest::Request) -> HashMap<String, String> {
        request.url().query_pairs().into_owned().collect()
    }

    /// Serve a single canned HTTP response and return a client pointed at it
    async fn serve_once(status: &'static str, body: &'static str) -> CatalogClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        CatalogClient {
            config: CatalogConfig {
                api_url: format!("http://{}", addr),
                api_key: "key123".to_string(),
                ..Default::default()
            },
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_search_decodes_response() {
        let client = serve_once("200 OK", r#"[{"id":130,"name":"Nintendo Switch"}]"#).await;

        let platforms = client.search_platforms("switch").await.unwrap();

        assert_eq!(platforms, vec![Platform { id: 130, name: "Nintendo Switch".to_string() }]);
    }

    #[tokio::test]
    async fn test_error_status_maps_to_api_error() {
        let client = serve_once("403 Forbidden", "invalid user-key").await;

        let err = client.search_games("zelda", 130).await.unwrap_err();

        match err {
            Error::Api { status, body } => {
                assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
                assert_eq!(body, "invalid user-key");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_decode_error() {
        let client = serve_once("200 OK", r#"{"message": "not a list"}"#).await;

        let err = client.search_platforms("switch").await.unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn test_empty_lookup_maps_to_game_not_found() {
        let client = serve_once("200 OK", "[]").await;

        let err = client.fetch_game(1942, 6).await.unwrap_err();

        assert!(matches!(err, Error::GameNotFound { game_id: 1942, platform_id: 6 }));
    }

    #[tokio::test]
    async fn test_lookup_returns_first_game() {
        let client = serve_once("200 OK", r#"[{"id":1942,"name":"The Witcher 3"}]"#).await;

        let game = client.fetch_game(1942, 6).await.unwrap();

        assert_eq!(game.id, 1942);
        assert_eq!(game.name, "The Witcher 3");
    }

    #[test]
    fn test_config_default() {
        let config = CatalogConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.api_key.is_empty());
        assert!(!CatalogClient::new(config).unwrap().has_credentials());
    }

    #[test]
    fn test_platform_search_request() {
        let request = client().platform_search_request("play station").build().unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/platforms/");
        let query = query_of(&request);
        assert_eq!(query["search"], "play station");
        assert_eq!(query["fields"], "id,name");
        assert_eq!(request.headers()["user-key"], "key123");
        assert_eq!(request.headers()["accept"], "application/json");
    }

    #[test]
    fn test_game_search_request_is_scoped_to_platform() {
        let request = client().game_search_request("zelda", 130).build().unwrap();

        assert_eq!(request.url().path(), "/games/");
        let query = query_of(&request);
        assert_eq!(query["search"], "zelda");
        assert_eq!(query["filter[release_dates.platform][eq]"], "130");
        assert_eq!(query["fields"], GAME_SEARCH_FIELDS);
    }

    #[test]
    fn test_game_lookup_request() {
        let request = client().game_lookup_request(1942, 6).build().unwrap();

        assert_eq!(request.url().path(), "/games/1942");
        let query = query_of(&request);
        assert!(!query.contains_key("search"));
        assert_eq!(query["filter[release_dates.platform][eq]"], "6");
        assert!(query["fields"].contains("websites"));
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url(DEFAULT_IMAGE_HOST, "abc123", ImageSize::default()),
            "https://images.igdb.com/igdb/image/upload/t_cover_big/abc123.jpg"
        );
        assert_eq!(
            image_url("https://img.test/", "shot1", ImageSize::ScreenshotMed),
            "https://img.test/t_screenshot_med/shot1.jpg"
        );
    }
}
