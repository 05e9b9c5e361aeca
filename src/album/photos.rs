//! Google Photos Library API album source
//!
//! Resolves an album by title and pages through its media items via the
//! Photos Library REST API. Authentication uses stored credentials only:
//! `<credentials_dir>/credentials.json` (OAuth client id/secret) plus
//! `<credentials_dir>/token.json` (a previously obtained refresh token)
//! are exchanged for a short-lived access token at the OAuth2 token
//! endpoint. Obtaining the refresh token in the first place (the browser
//! consent flow) is outside this library's scope.

use crate::album::{AlbumSource, ensure_unique_filenames};
use crate::error::{Error, Result};
use crate::types::MediaItemDescriptor;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// OAuth client secrets file inside the credentials directory
const CREDENTIALS_FILE: &str = "credentials.json";
/// Stored token file inside the credentials directory
const TOKEN_FILE: &str = "token.json";

/// Default Photos Library API base URL
const PHOTOS_API_BASE: &str = "https://photoslibrary.googleapis.com";
/// Default OAuth2 token endpoint
const OAUTH_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Albums fetched per page when resolving the album id
const ALBUM_PAGE_SIZE: u32 = 50;
/// Media items fetched per search page
const MEDIA_PAGE_SIZE: u32 = 100;

/// [`AlbumSource`] backed by the Google Photos Library REST API
pub struct PhotosAlbumClient {
    /// HTTP client shared across token exchange and API paging
    http: reqwest::Client,
    /// Album title to resolve (matched case-insensitively)
    album_name: String,
    /// Directory holding `credentials.json` and `token.json`
    credentials_dir: PathBuf,
    /// API base URL (overridden in tests)
    api_base: String,
    /// Token endpoint URL (overridden in tests)
    token_endpoint: String,
}

// --- Wire formats ---

#[derive(Debug, Deserialize)]
struct ClientSecrets {
    installed: ClientSecretDetails,
}

#[derive(Debug, Deserialize)]
struct ClientSecretDetails {
    client_id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct StoredToken {
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlbumListResponse {
    #[serde(default)]
    albums: Vec<WireAlbum>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAlbum {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaSearchResponse {
    #[serde(default)]
    media_items: Vec<WireMediaItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMediaItem {
    id: String,
    filename: String,
    base_url: String,
    #[serde(default)]
    media_metadata: WireMediaMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct WireMediaMetadata {
    video: Option<serde_json::Value>,
}

impl PhotosAlbumClient {
    /// Create a client for the given album and credentials directory
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(album_name: &str, credentials_dir: &Path) -> Result<Self> {
        Self::with_endpoints(
            album_name,
            credentials_dir,
            PHOTOS_API_BASE,
            OAUTH_TOKEN_ENDPOINT,
        )
    }

    /// Create a client against custom API endpoints
    ///
    /// Used by tests to point the client at a local mock server.
    pub fn with_endpoints(
        album_name: &str,
        credentials_dir: &Path,
        api_base: &str,
        token_endpoint: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("album-sync")
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            album_name: album_name.to_string(),
            credentials_dir: credentials_dir.to_path_buf(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token_endpoint: token_endpoint.to_string(),
        })
    }

    /// Exchange the stored refresh token for an access token
    async fn fetch_access_token(&self) -> Result<String> {
        let secrets_path = self.credentials_dir.join(CREDENTIALS_FILE);
        let secrets_raw = tokio::fs::read_to_string(&secrets_path).await.map_err(|e| {
            Error::Auth(format!(
                "Cannot read client secrets at '{}': {}",
                secrets_path.display(),
                e
            ))
        })?;
        let secrets: ClientSecrets = serde_json::from_str(&secrets_raw)
            .map_err(|e| Error::Auth(format!("Malformed client secrets file: {}", e)))?;

        let token_path = self.credentials_dir.join(TOKEN_FILE);
        let token_raw = tokio::fs::read_to_string(&token_path).await.map_err(|e| {
            Error::Auth(format!(
                "Cannot read stored token at '{}' (run the consent flow first): {}",
                token_path.display(),
                e
            ))
        })?;
        let stored: StoredToken = serde_json::from_str(&token_raw)
            .map_err(|e| Error::Auth(format!("Malformed token file: {}", e)))?;

        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", secrets.installed.client_id.as_str()),
                ("client_secret", secrets.installed.client_secret.as_str()),
                ("refresh_token", stored.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Auth(format!(
                "Token exchange refused with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Page through the album list and resolve the configured title to an id
    async fn resolve_album_id(&self, access_token: &str) -> Result<String> {
        let url = format!("{}/v1/albums", self.api_base);
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(access_token)
                .query(&[("pageSize", ALBUM_PAGE_SIZE.to_string())]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?.error_for_status()?;
            let page: AlbumListResponse = response.json().await?;

            if let Some(album) = page
                .albums
                .iter()
                .find(|a| a.title.eq_ignore_ascii_case(&self.album_name))
            {
                return Ok(album.id.clone());
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Err(Error::AlbumNotFound(self.album_name.clone())),
            }
        }
    }

    /// Page through `mediaItems:search` for the given album
    async fn search_media_items(
        &self,
        access_token: &str,
        album_id: &str,
    ) -> Result<Vec<MediaItemDescriptor>> {
        let url = format!("{}/v1/mediaItems:search", self.api_base);
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut body = serde_json::json!({
                "albumId": album_id,
                "pageSize": MEDIA_PAGE_SIZE,
            });
            if let Some(ref token) = page_token {
                body["pageToken"] = serde_json::Value::String(token.clone());
            }

            let response = self
                .http
                .post(&url)
                .bearer_auth(access_token)
                .json(&body)
                .send()
                .await?
                .error_for_status()?;
            let page: MediaSearchResponse = response.json().await?;

            items.extend(page.media_items.into_iter().map(|item| {
                let is_video = item.media_metadata.video.is_some();
                MediaItemDescriptor {
                    id: item.id,
                    filename: item.filename,
                    download_url: item.base_url,
                    is_video,
                }
            }));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(items),
            }
        }
    }
}

#[async_trait]
impl AlbumSource for PhotosAlbumClient {
    async fn items(&self) -> Result<Vec<MediaItemDescriptor>> {
        let access_token = self.fetch_access_token().await?;
        tracing::info!("Init complete");

        tracing::info!(album = %self.album_name, "Resolving album");
        let album_id = self.resolve_album_id(&access_token).await?;

        let items = self.search_media_items(&access_token, &album_id).await?;
        tracing::info!(
            album = %self.album_name,
            count = items.len(),
            "Got media items for album"
        );

        ensure_unique_filenames(&items)?;
        Ok(items)
    }
}
