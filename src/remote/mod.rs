//! Remote document store client.

pub mod http;

pub use http::HttpRemoteStore;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteStoreError {
    #[error("sync not configured. Set sync.server_url in config and log in.")]
    NotConfigured,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server rejected write ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Create-or-overwrite document writes keyed by collection and document id.
/// Upserts are idempotent: repeating a write for the same id is harmless.
pub trait RemoteStore {
    async fn upsert(
        &self,
        collection: &str,
        document_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), RemoteStoreError>;
}
