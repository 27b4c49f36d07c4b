use crate::config::FigmaConfig;
use crate::error::{Result, ScoutError};
use crate::types::{DocumentNode, DocumentSource, FetchedDocument, SourceMetadata};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, instrument};

/// Client for the Figma REST API, acting as the document source.
pub struct FigmaClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "lastModified")]
    last_modified: Option<String>,
    document: DocumentNode,
}

#[derive(Debug, Deserialize)]
struct NodesResponse {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "lastModified")]
    last_modified: Option<String>,
    nodes: HashMap<String, NodeWrapper>,
}

#[derive(Debug, Deserialize)]
struct NodeWrapper {
    document: DocumentNode,
}

impl FigmaClient {
    pub fn new(token: String, config: &FigmaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Create from the FIGMA_TOKEN environment variable.
    pub fn from_env(config: &FigmaConfig) -> Result<Self> {
        let token = std::env::var("FIGMA_TOKEN")
            .map_err(|_| ScoutError::Config("FIGMA_TOKEN environment variable not set".into()))?;
        Ok(Self::new(token, config))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .header("X-Figma-Token", &self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::Source {
                status: Some(status.as_u16()),
                message: format!("Figma API request to {} failed: {}", url, body),
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl DocumentSource for FigmaClient {
    fn source_name(&self) -> &'static str {
        "figma"
    }

    #[instrument(skip(self))]
    async fn fetch_document(
        &self,
        file_key: &str,
        node_id: Option<&str>,
    ) -> Result<FetchedDocument> {
        match node_id {
            Some(node_id) => {
                let url = format!(
                    "{}/v1/files/{}/nodes?ids={}",
                    self.base_url, file_key, node_id
                );
                let parsed: NodesResponse = self.get(&url).await?.json().await?;
                let wrapper = parsed.nodes.into_iter().next().map(|(_, w)| w).ok_or_else(
                    || ScoutError::MissingField(format!("node {} not found in file", node_id)),
                )?;
                info!("Fetched node {} from file {}", node_id, file_key);
                Ok(FetchedDocument {
                    root: wrapper.document,
                    metadata: SourceMetadata {
                        file_key: file_key.to_string(),
                        document_name: parsed.name,
                        version: parsed.version,
                        last_modified: parsed.last_modified,
                    },
                })
            }
            None => {
                let url = format!("{}/v1/files/{}", self.base_url, file_key);
                let parsed: FileResponse = self.get(&url).await?.json().await?;
                info!("Fetched file {} ({})", file_key, parsed.name);
                Ok(FetchedDocument {
                    root: parsed.document,
                    metadata: SourceMetadata {
                        file_key: file_key.to_string(),
                        document_name: parsed.name,
                        version: parsed.version,
                        last_modified: parsed.last_modified,
                    },
                })
            }
        }
    }
}
