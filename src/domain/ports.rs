use crate::domain::model::{Blob, BlobContent, Listing};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Capability contract every blob store implements.
///
/// Two failure policies, visible in the signatures: `save` and `open` fail
/// loudly with a `Result`, because a calling workflow must stop when a
/// transfer breaks. Everything else degrades silently to a benign default
/// (false, `None`, 0, empty listing) so a transient backend hiccup does
/// not take unrelated flows down with it. Silent failures are still
/// logged by implementations.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `content` under `name`. Returns the canonical name assigned
    /// by the backend, which callers must use for every later operation
    /// on the blob.
    async fn save(&self, name: &str, content: BlobContent) -> Result<String>;

    /// Fetch the full content of `name`. Fails with
    /// [`StorageError::NotFound`](crate::StorageError::NotFound) when the
    /// blob is absent, so callers can tell a missing blob from a
    /// transient transfer failure.
    async fn open(&self, name: &str) -> Result<Blob>;

    /// Best-effort removal. Deleting a blob that is already gone is not
    /// an error, and backend failures are swallowed.
    async fn delete(&self, name: &str);

    /// `true` only when the backend positively confirms the blob exists.
    async fn exists(&self, name: &str) -> bool;

    /// Time-limited access URL issued by the backend, if it can produce
    /// one.
    async fn url(&self, name: &str) -> Option<String>;

    /// Size in bytes; 0 when the blob is absent or the backend cannot
    /// answer.
    async fn size(&self, name: &str) -> u64;

    /// Last access time. Blob backends do not track this; always `None`.
    async fn accessed_time(&self, name: &str) -> Option<DateTime<Utc>>;

    async fn created_time(&self, name: &str) -> Option<DateTime<Utc>>;

    /// Identical to [`created_time`](Self::created_time); the backing
    /// store does not distinguish the two.
    async fn modified_time(&self, name: &str) -> Option<DateTime<Utc>>;

    /// List subfolders and blobs under `prefix` (empty prefix lists the
    /// root). Entries come back relative to the prefix. Failures yield an
    /// empty listing.
    async fn list_dir(&self, prefix: &str) -> Listing;
}
