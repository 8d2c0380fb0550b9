//! HTTP client for the welltrack document store server.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{RemoteStore, RemoteStoreError};

/// Remote store backed by the `welltrack-server` HTTP API.
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpRemoteStore {
    pub fn new(server_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(server_url),
            api_key: api_key.into(),
        }
    }

    fn document_url(&self, collection: &str, document_id: &str) -> String {
        format!(
            "{}/collections/{}/documents/{}",
            self.base_url, collection, document_id
        )
    }
}

/// Error body returned by the server.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl RemoteStore for HttpRemoteStore {
    async fn upsert(
        &self,
        collection: &str,
        document_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), RemoteStoreError> {
        let response = self
            .client
            .put(self.document_url(collection, document_id))
            .bearer_auth(&self.api_key)
            .json(fields)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| "unknown error".to_string());

        Err(RemoteStoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Accepts bare hosts as well as http(s) URLs; strips trailing slashes.
pub(crate) fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
