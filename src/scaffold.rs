use crate::error::Result;
use crate::types::{CodegenOracle, CommitSink, DiffReport, GeneratedComponent};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Turn a design-document component name into a source file name,
/// e.g. "user avatar / small" becomes "UserAvatarSmall.tsx".
pub fn component_file_name(name: &str) -> String {
    let pascal: String = NON_ALNUM
        .split(name)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    format!("{}.tsx", pascal)
}

/// Result of one scaffold run over a report's new components.
#[derive(Debug)]
pub struct ScaffoldResult {
    pub branch: String,
    pub committed_files: Vec<String>,
    pub commit_id: Option<String>,
    pub errors: Vec<String>,
}

/// Generates source for the report's new components and commits the
/// generated files to a fresh branch of the registry repository.
pub struct Scaffolder {
    oracle: Arc<dyn CodegenOracle>,
    sink: Arc<dyn CommitSink>,
    /// Repository directory the generated files land in.
    target_path: String,
}

impl Scaffolder {
    pub fn new(oracle: Arc<dyn CodegenOracle>, sink: Arc<dyn CommitSink>, target_path: String) -> Self {
        Self {
            oracle,
            sink,
            target_path: target_path.trim_matches('/').to_string(),
        }
    }

    /// Generate and commit every new component from the report. Generation
    /// failures are accumulated per component rather than aborting the run;
    /// the commit happens once for everything that generated cleanly.
    #[instrument(skip(self, report), fields(new_components = report.new_components.len()))]
    pub async fn scaffold_new_components(
        &self,
        report: &DiffReport,
        branch: Option<String>,
    ) -> Result<ScaffoldResult> {
        let branch =
            branch.unwrap_or_else(|| format!("design-scout/{}", Uuid::new_v4()));

        if report.new_components.is_empty() {
            info!("No new components to scaffold");
            return Ok(ScaffoldResult {
                branch,
                committed_files: Vec::new(),
                commit_id: None,
                errors: Vec::new(),
            });
        }

        let mut files = Vec::new();
        let mut errors = Vec::new();
        for record in &report.new_components {
            match self.oracle.generate_component(record).await {
                Ok(source) => {
                    let file_path =
                        format!("{}/{}", self.target_path, component_file_name(&record.name));
                    info!("Generated {} for component '{}'", file_path, record.name);
                    files.push(GeneratedComponent { file_path, source });
                }
                Err(e) => {
                    error!("Generation failed for component '{}': {}", record.name, e);
                    errors.push(format!("{}: {}", record.name, e));
                }
            }
        }

        if files.is_empty() {
            warn!("Nothing generated; skipping branch creation");
            return Ok(ScaffoldResult {
                branch,
                committed_files: Vec::new(),
                commit_id: None,
                errors,
            });
        }

        self.sink.create_branch(&branch).await?;
        let message = format!("Add {} generated components", files.len());
        let commit_id = self.sink.commit_files(&branch, &message, &files).await?;

        Ok(ScaffoldResult {
            branch,
            committed_files: files.into_iter().map(|f| f.file_path).collect(),
            commit_id: Some(commit_id),
            errors,
        })
    }
}
