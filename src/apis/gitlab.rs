use crate::config::RegistryConfig;
use crate::error::{Result, ScoutError};
use crate::types::{CommitSink, GeneratedComponent, RegistrySource};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Client for a GitLab-style repository API. Serves two boundaries: the
/// registry source (tree listing + raw file fetch) and the commit sink
/// (branch creation + multi-file commit).
pub struct GitlabClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    token: String,
    branch: String,
    components_path: String,
    index_file: String,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

/// Pick the registry index file out of a tree listing.
fn find_index_path(entries: &[TreeEntry], index_file: &str) -> Option<String> {
    entries
        .iter()
        .find(|e| e.entry_type == "blob" && e.name == index_file)
        .map(|e| e.path.clone())
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    id: String,
}

impl GitlabClient {
    pub fn new(token: String, config: &RegistryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            token,
            branch: config.branch.clone(),
            components_path: config.components_path.trim_matches('/').to_string(),
            index_file: config.index_file.clone(),
            page_size: config.page_size,
        }
    }

    /// Create from the REGISTRY_TOKEN environment variable.
    pub fn from_env(config: &RegistryConfig) -> Result<Self> {
        let token = std::env::var("REGISTRY_TOKEN").map_err(|_| {
            ScoutError::Config("REGISTRY_TOKEN environment variable not set".into())
        })?;
        Ok(Self::new(token, config))
    }

    fn project_url(&self, tail: &str) -> String {
        format!(
            "{}/api/v4/projects/{}/{}",
            self.base_url, self.project_id, tail
        )
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;
        Ok(response)
    }

    fn source_error(url: &str, status: u16, body: String) -> ScoutError {
        ScoutError::Source {
            status: Some(status),
            message: format!("registry request to {} failed: {}", url, body),
        }
    }

    /// Fetch one page of the repository tree under the components path.
    async fn list_tree_page(&self, page: usize) -> Result<Vec<TreeEntry>> {
        let url = format!(
            "{}?path={}&ref={}&per_page={}&page={}",
            self.project_url("repository/tree"),
            self.components_path,
            self.branch,
            self.page_size,
            page
        );
        let response = self.get(&url).await?;
        let status = response.status();

        // A missing path lists as empty; absence of the registry directory
        // is a valid outcome, not an error.
        if status.as_u16() == 404 {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::source_error(&url, status.as_u16(), body));
        }
        let entries: Vec<TreeEntry> = response.json().await?;
        Ok(entries)
    }

    /// List the repository tree under the components path, fetching pages
    /// sequentially until the first empty page. Later pages depend on the
    /// previous page being non-empty, so this loop is ordered round trips.
    pub async fn list_tree(&self) -> Result<Vec<TreeEntry>> {
        let mut all = Vec::new();
        let mut page = 1usize;
        loop {
            let mut entries = self.list_tree_page(page).await?;
            if entries.is_empty() {
                break;
            }
            debug!("Registry tree page {} returned {} entries", page, entries.len());
            all.append(&mut entries);
            page += 1;
        }
        Ok(all)
    }

    /// Fetch the raw text of a repository file. `Ok(None)` when the file
    /// does not exist.
    pub async fn fetch_file_raw(&self, path: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/raw?ref={}",
            self.project_url(&format!("repository/files/{}", encode_path(path))),
            self.branch
        );
        let response = self.get(&url).await?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::source_error(&url, status.as_u16(), body));
        }
        Ok(Some(response.text().await?))
    }

    async fn post(&self, url: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::source_error(url, status.as_u16(), text));
        }
        Ok(response)
    }
}

/// Percent-encode a repository path for the files endpoint, which takes the
/// full path as a single URL segment.
fn encode_path(path: &str) -> String {
    path.replace('/', "%2F")
}

#[async_trait::async_trait]
impl RegistrySource for GitlabClient {
    #[instrument(skip(self))]
    async fn fetch_registry(&self) -> Result<Option<String>> {
        let entries = self.list_tree().await?;
        let index_path = match find_index_path(&entries, &self.index_file) {
            Some(path) => path,
            None => {
                warn!(
                    "Registry index '{}' not found under '{}' ({} entries listed)",
                    self.index_file,
                    self.components_path,
                    entries.len()
                );
                return Ok(None);
            }
        };

        info!("Fetching registry content from {}", index_path);
        self.fetch_file_raw(&index_path).await
    }
}

#[async_trait::async_trait]
impl CommitSink for GitlabClient {
    async fn create_branch(&self, branch: &str) -> Result<()> {
        let url = self.project_url("repository/branches");
        self.post(&url, json!({ "branch": branch, "ref": self.branch }))
            .await?;
        info!("Created branch {} from {}", branch, self.branch);
        Ok(())
    }

    async fn commit_files(
        &self,
        branch: &str,
        message: &str,
        files: &[GeneratedComponent],
    ) -> Result<String> {
        let actions: Vec<serde_json::Value> = files
            .iter()
            .map(|f| {
                json!({
                    "action": "create",
                    "file_path": f.file_path,
                    "content": f.source,
                })
            })
            .collect();

        let url = self.project_url("repository/commits");
        let response = self
            .post(
                &url,
                json!({
                    "branch": branch,
                    "commit_message": message,
                    "actions": actions,
                }),
            )
            .await?;
        let commit: CommitResponse = response.json().await?;
        info!("Committed {} files to {} ({})", files.len(), branch, commit.id);
        Ok(commit.id)
    }
}
