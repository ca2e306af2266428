//! Search index sinks.

use crate::error::{ProcessorError, Result};
use crate::models::KeyMetadata;
use async_trait::async_trait;
use tracing::{debug, error, info};

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Index one metadata document under `document_type`
    async fn index(&self, document_type: &str, body: &KeyMetadata) -> Result<()>;
}

/// Posts documents to an Elasticsearch-compatible REST endpoint
pub struct HttpSearchIndex {
    client: reqwest::Client,
    endpoint: String,
    index_name: String,
}

impl HttpSearchIndex {
    pub fn new(endpoint: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, index_name)
    }

    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            index_name: index_name.into(),
        }
    }

    /// Document URL; bare host names are reached over https
    pub fn document_url(&self, document_type: &str) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        let base = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("https://{}", endpoint)
        };
        format!("{}/{}/{}", base, self.index_name, document_type)
    }
}

#[async_trait]
impl SearchIndex for HttpSearchIndex {
    async fn index(&self, document_type: &str, body: &KeyMetadata) -> Result<()> {
        let url = self.document_url(document_type);
        let failure = |reason: String| {
            error!("Could not index in Elasticsearch: {}", reason);
            ProcessorError::SearchIndex {
                document_type: document_type.to_string(),
                reason,
            }
        };

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| failure(e.to_string()))?;

        debug!("Indexed metadata document at {}", url);
        Ok(())
    }
}

/// Logs documents instead of sending them
#[derive(Debug, Default)]
pub struct LogSearchIndex;

#[async_trait]
impl SearchIndex for LogSearchIndex {
    async fn index(&self, document_type: &str, body: &KeyMetadata) -> Result<()> {
        info!("metadata document [{}]: {}", document_type, body);
        Ok(())
    }
}
