//! Revocable temporary URLs for binary results.
//!
//! Generated images are kept in memory under a `blob:playground/<uuid>` URL
//! for as long as the [`ObjectUrl`] handle lives. Dropping the handle
//! revokes the URL and frees the bytes.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;

const URL_PREFIX: &str = "blob:playground/";

#[derive(Debug, Clone)]
pub struct Blob {
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    blobs: Arc<DashMap<String, Blob>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, bytes: Bytes, content_type: &str) -> ObjectUrl {
        let url = format!("{}{}", URL_PREFIX, uuid::Uuid::new_v4());
        self.blobs.insert(
            url.clone(),
            Blob {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        tracing::debug!("Registered object URL {}", url);
        ObjectUrl {
            url,
            blobs: self.blobs.clone(),
        }
    }

    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.blobs.get(url).map(|entry| entry.value().clone())
    }

    pub fn live_count(&self) -> usize {
        self.blobs.len()
    }
}

/// Owning handle for a registered URL. Not `Clone`: exactly one owner
/// decides when the URL is released.
#[derive(Debug)]
pub struct ObjectUrl {
    url: String,
    blobs: Arc<DashMap<String, Blob>>,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if self.blobs.remove(&self.url).is_some() {
            tracing::debug!("Revoked object URL {}", self.url);
        }
    }
}
