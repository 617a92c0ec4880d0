use crate::domain::model::{Blob, BlobContent, Listing};
use crate::domain::ports::BlobStorage;
use crate::utils::error::{Result, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

/// How long a minted access URL claims to stay valid.
const URL_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Bytes,
    modified: DateTime<Utc>,
}

/// In-process [`BlobStorage`] implementation.
///
/// Backs test harnesses and local demos without a running gateway.
/// Unlike the gateway adapter it resolves name collisions itself: saving
/// `report.txt` twice keeps both blobs, the second under `report_1.txt`.
/// Access URLs carry the same `signature`/`expires`/`path` query
/// structure the gateway issues, so URL-consuming code can be exercised
/// against it unchanged.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    base_url: String,
    blobs: Arc<Mutex<HashMap<String, StoredBlob>>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_base_url("memory://blobs")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            blobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.lock().await.is_empty()
    }
}

/// First free variant of `requested`: the name itself, then
/// `stem_1.ext`, `stem_2.ext`, ...
fn available_name(taken: &HashMap<String, StoredBlob>, requested: &str) -> String {
    if !taken.contains_key(requested) {
        return requested.to_string();
    }

    let (dir, file) = match requested.rfind('/') {
        Some(i) => requested.split_at(i + 1),
        None => ("", requested),
    };
    let (stem, ext) = match file.rfind('.') {
        Some(i) if i > 0 => file.split_at(i),
        _ => (file, ""),
    };

    let mut n = 1;
    loop {
        let candidate = format!("{}{}_{}{}", dir, stem, n, ext);
        if !taken.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

// Stand-in signature so minted URLs are shaped like the gateway's. Not a
// cryptographic signature.
fn pseudo_signature(name: &str, expires: i64) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes().chain(expires.to_be_bytes()) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    format!("{:016x}", hash)
}

#[async_trait]
impl BlobStorage for MemoryStorage {
    async fn save(&self, name: &str, content: BlobContent) -> Result<String> {
        if name.is_empty() {
            return Err(StorageError::UploadFailed {
                message: "Blob name cannot be empty".to_string(),
            });
        }

        let mut blobs = self.blobs.lock().await;
        let assigned = available_name(&blobs, name);
        blobs.insert(
            assigned.clone(),
            StoredBlob {
                bytes: content.bytes().clone(),
                modified: Utc::now(),
            },
        );

        tracing::debug!(name = %name, assigned = %assigned, "stored blob in memory");
        Ok(assigned)
    }

    async fn open(&self, name: &str) -> Result<Blob> {
        let blobs = self.blobs.lock().await;
        match blobs.get(name) {
            Some(stored) => Ok(Blob::new(name, stored.bytes.clone())),
            None => Err(StorageError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    async fn delete(&self, name: &str) {
        self.blobs.lock().await.remove(name);
    }

    async fn exists(&self, name: &str) -> bool {
        self.blobs.lock().await.contains_key(name)
    }

    async fn url(&self, name: &str) -> Option<String> {
        let blobs = self.blobs.lock().await;
        if !blobs.contains_key(name) {
            return None;
        }

        let expires = Utc::now().timestamp() + URL_TTL_SECS;
        let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
        Some(format!(
            "{}/{}?signature={}&expires={}&path={}",
            self.base_url,
            encoded,
            pseudo_signature(name, expires),
            expires,
            encoded
        ))
    }

    async fn size(&self, name: &str) -> u64 {
        let blobs = self.blobs.lock().await;
        blobs
            .get(name)
            .map(|stored| stored.bytes.len() as u64)
            .unwrap_or(0)
    }

    async fn accessed_time(&self, _name: &str) -> Option<DateTime<Utc>> {
        None
    }

    async fn created_time(&self, name: &str) -> Option<DateTime<Utc>> {
        let blobs = self.blobs.lock().await;
        blobs.get(name).map(|stored| stored.modified)
    }

    async fn modified_time(&self, name: &str) -> Option<DateTime<Utc>> {
        self.created_time(name).await
    }

    async fn list_dir(&self, prefix: &str) -> Listing {
        let normalized = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", prefix.trim_end_matches('/'))
        };

        let blobs = self.blobs.lock().await;
        let mut folders = BTreeSet::new();
        let mut files = Vec::new();

        for name in blobs.keys() {
            let relative = match name.strip_prefix(&normalized) {
                Some(rest) if !rest.is_empty() => rest,
                _ => continue,
            };
            match relative.split_once('/') {
                Some((folder, _)) => {
                    folders.insert(folder.to_string());
                }
                None => files.push(relative.to_string()),
            }
        }

        files.sort();
        Listing {
            folders: folders.into_iter().collect(),
            files,
        }
    }
}
