use crate::config::StorageConfig;
use crate::domain::model::{Blob, BlobContent, Listing};
use crate::domain::ports::BlobStorage;
use crate::utils::error::{Result, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Timeout for payload-carrying operations (upload, download).
const TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for metadata and control operations.
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

// Escape every reserved character when a blob name becomes a path
// segment, '/' included; only unreserved characters pass through.
const BLOB_NAME_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Blob store backed by a remote HTTP gateway.
///
/// Every operation is one request against the gateway API: `/upload`,
/// `/download-stream/{name}`, `/delete/{name}`, `/exists/{name}`,
/// `/download/{name}` (signed URL), `/info/{name}` and `/list`. The
/// adapter holds a single connection-pooling [`Client`] for its whole
/// lifetime and no other state, so one instance can be shared freely
/// across tasks.
pub struct GatewayStorage {
    config: StorageConfig,
    client: Client,
}

impl GatewayStorage {
    pub fn new(config: StorageConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(StorageConfig::from_env()?)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path)
    }

    fn blob_endpoint(&self, operation: &str, name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url(),
            operation,
            encode_blob_name(name)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.api_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Single round trip against the gateway. Logs endpoint, status and
    /// elapsed wall-clock time on success and on failure; the log line is
    /// the only side effect.
    async fn execute(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> std::result::Result<Response, reqwest::Error> {
        let started = Instant::now();
        let outcome = self.authorize(request).send().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Ok(response) => tracing::debug!(
                endpoint = %endpoint,
                status = %response.status(),
                elapsed_ms,
                "gateway request completed"
            ),
            Err(e) => tracing::warn!(
                endpoint = %endpoint,
                error = %e,
                elapsed_ms,
                "gateway request failed"
            ),
        }

        outcome
    }

    async fn fetch_info(&self, name: &str) -> Option<InfoResponse> {
        let endpoint = self.blob_endpoint("info", name);
        let request = self.client.get(&endpoint).timeout(CONTROL_TIMEOUT);

        let response = self.execute(request, &endpoint).await.ok()?;
        if response.status() != StatusCode::OK {
            return None;
        }
        response.json::<InfoResponse>().await.ok()
    }
}

#[async_trait]
impl BlobStorage for GatewayStorage {
    async fn save(&self, name: &str, content: BlobContent) -> Result<String> {
        let endpoint = self.endpoint("upload");
        let content_type = resolve_content_type(name, &content);

        let part = Part::bytes(content.bytes().to_vec())
            .file_name(name.to_string())
            .mime_str(&content_type)
            .map_err(|e| StorageError::UploadFailed {
                message: format!("Invalid content type '{}': {}", content_type, e),
            })?;
        let form = Form::new()
            .part("file", part)
            .text("folder", self.config.folder().to_string());

        let request = self
            .client
            .post(&endpoint)
            .multipart(form)
            .timeout(TRANSFER_TIMEOUT);

        let response =
            self.execute(request, &endpoint)
                .await
                .map_err(|e| StorageError::UploadFailed {
                    message: format!("Upload request failed: {}", e),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::UploadFailed {
                message: format!("Gateway returned {}", status),
            });
        }

        let body: UploadResponse =
            response
                .json()
                .await
                .map_err(|e| StorageError::UploadFailed {
                    message: format!("Malformed upload response: {}", e),
                })?;

        if body.status.as_deref() == Some("success") {
            // The gateway may rename (folder prefix, collision suffix); its
            // blob_path is the canonical name from here on.
            Ok(body.blob_path.unwrap_or_else(|| name.to_string()))
        } else {
            Err(StorageError::UploadFailed {
                message: body
                    .message
                    .unwrap_or_else(|| "Unknown error".to_string()),
            })
        }
    }

    async fn open(&self, name: &str) -> Result<Blob> {
        let endpoint = self.blob_endpoint("download-stream", name);
        let request = self.client.get(&endpoint).timeout(TRANSFER_TIMEOUT);

        let response =
            self.execute(request, &endpoint)
                .await
                .map_err(|e| StorageError::DownloadFailed {
                    name: name.to_string(),
                    message: format!("Download request failed: {}", e),
                })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            return Err(StorageError::DownloadFailed {
                name: name.to_string(),
                message: format!("Gateway returned {}", status),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed {
                name: name.to_string(),
                message: format!("Failed to read response body: {}", e),
            })?;

        Ok(Blob::new(name, bytes))
    }

    async fn delete(&self, name: &str) {
        let endpoint = self.blob_endpoint("delete", name);
        let request = self.client.delete(&endpoint).timeout(CONTROL_TIMEOUT);

        let response = match self.execute(request, &endpoint).await {
            Ok(response) => response,
            // Best-effort: the failure is already logged by execute.
            Err(_) => return,
        };

        // 404 means the blob is already gone, which is what delete wanted.
        if response.status() == StatusCode::NOT_FOUND {
            return;
        }

        // The remote delete endpoint may be partially implemented and
        // report an error body; tolerate it.
        if let Ok(body) = response.json::<DeleteResponse>().await {
            if body.status.as_deref() == Some("error") {
                tracing::debug!(endpoint = %endpoint, "delete reported an error body, ignoring");
            }
        }
    }

    async fn exists(&self, name: &str) -> bool {
        let endpoint = self.blob_endpoint("exists", name);
        let request = self.client.get(&endpoint).timeout(CONTROL_TIMEOUT);

        let response = match self.execute(request, &endpoint).await {
            Ok(response) => response,
            Err(_) => return false,
        };
        if response.status() != StatusCode::OK {
            return false;
        }

        match response.json::<ExistsResponse>().await {
            Ok(body) => body.exists,
            Err(_) => false,
        }
    }

    async fn url(&self, name: &str) -> Option<String> {
        let endpoint = self.blob_endpoint("download", name);
        let request = self.client.get(&endpoint).timeout(CONTROL_TIMEOUT);

        let response = self.execute(request, &endpoint).await.ok()?;
        if response.status() != StatusCode::OK {
            return None;
        }

        response.json::<SignedUrlResponse>().await.ok()?.url
    }

    async fn size(&self, name: &str) -> u64 {
        self.fetch_info(name).await.map(|info| info.size).unwrap_or(0)
    }

    async fn accessed_time(&self, _name: &str) -> Option<DateTime<Utc>> {
        // The backing store does not track access time.
        None
    }

    async fn created_time(&self, name: &str) -> Option<DateTime<Utc>> {
        let info = self.fetch_info(name).await?;
        let last_modified = info.last_modified?;

        match DateTime::parse_from_rfc2822(&last_modified) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(e) => {
                tracing::debug!(
                    last_modified = %last_modified,
                    error = %e,
                    "unparseable last_modified from gateway"
                );
                None
            }
        }
    }

    async fn modified_time(&self, name: &str) -> Option<DateTime<Utc>> {
        self.created_time(name).await
    }

    async fn list_dir(&self, prefix: &str) -> Listing {
        let endpoint = self.endpoint("list");
        let mut request = self.client.get(&endpoint).timeout(CONTROL_TIMEOUT);
        if !prefix.is_empty() {
            request = request.query(&[("folder", prefix)]);
        }

        let response = match self.execute(request, &endpoint).await {
            Ok(response) => response,
            Err(_) => return Listing::empty(),
        };
        if response.status() != StatusCode::OK {
            return Listing::empty();
        }

        match response.json::<ListResponse>().await {
            Ok(body) => strip_listing_prefix(prefix, body),
            Err(_) => Listing::empty(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    status: Option<String>,
    blob_path: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    #[serde(default)]
    exists: bool,
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    #[serde(default)]
    size: u64,
    last_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    folders: Vec<String>,
    #[serde(default)]
    files: Vec<String>,
}

fn encode_blob_name(name: &str) -> String {
    utf8_percent_encode(name, &BLOB_NAME_ENCODE_SET).to_string()
}

fn resolve_content_type(name: &str, content: &BlobContent) -> String {
    match content.content_type() {
        Some(declared) => declared.to_string(),
        None => guess_content_type(name).to_string(),
    }
}

fn guess_content_type(name: &str) -> &'static str {
    let extension = std::path::Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("txt") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz") => "application/gzip",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

fn strip_listing_prefix(prefix: &str, body: ListResponse) -> Listing {
    if prefix.is_empty() {
        return Listing {
            folders: body.folders,
            files: body.files,
        };
    }

    let prefix = format!("{}/", prefix.trim_end_matches('/'));
    let strip = |entry: &String| -> String {
        entry
            .strip_prefix(&prefix)
            .unwrap_or(entry.as_str())
            .to_string()
    };

    Listing {
        folders: body
            .folders
            .iter()
            .map(|folder| strip(folder).trim_end_matches('/').to_string())
            .collect(),
        files: body.files.iter().map(strip).collect(),
    }
}
