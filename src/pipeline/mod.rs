pub mod classifier;
pub mod matcher;
pub mod reporter;
pub mod walker;

use crate::error::Result;
use crate::types::{
    ComponentRecord, DiffReport, DocumentNode, DocumentSource, MatchOracle, RegistrySource,
    ScreenRecord,
};
use metrics::{counter, histogram};
use tracing::{info, instrument, warn};

pub struct Pipeline;

impl Pipeline {
    /// Walk the tree and classify every node. Synchronous pure core shared
    /// by the CLI catalog command and the full diff run.
    pub fn catalog(root: &DocumentNode) -> (Vec<ComponentRecord>, Vec<ScreenRecord>) {
        let mut components = Vec::new();
        let mut screens = Vec::new();

        for visit in walker::walk(root) {
            match classifier::classify(&visit) {
                classifier::Classification::Component(record) => components.push(record),
                classifier::Classification::Screen(record) => screens.push(record),
                classifier::Classification::Ignored => {}
            }
        }
        (components, screens)
    }

    /// Run the full pipeline: fetch the document, classify, fetch the
    /// registry, diff, assemble. Source failures abort the run; a missing
    /// registry file does not. No partial report is ever returned.
    #[instrument(skip_all, fields(file_key = %file_key))]
    pub async fn run(
        document_source: &dyn DocumentSource,
        registry_source: Option<&dyn RegistrySource>,
        oracle: Option<&dyn MatchOracle>,
        file_key: &str,
        node_id: Option<&str>,
    ) -> Result<DiffReport> {
        counter!("scout_pipeline_runs_total").increment(1);
        let t_pipeline = std::time::Instant::now();

        info!(
            "Fetching document from {} for file {}",
            document_source.source_name(),
            file_key
        );
        let t_fetch = std::time::Instant::now();
        let fetched = document_source.fetch_document(file_key, node_id).await?;
        histogram!("scout_document_fetch_duration_seconds")
            .record(t_fetch.elapsed().as_secs_f64());

        let (components, screens) = Self::catalog(&fetched.root);
        info!(
            "Classified {} atomic components and {} screens",
            components.len(),
            screens.len()
        );
        histogram!("scout_components_per_run").record(components.len() as f64);

        // Registry absence or failure degrades to the flagged all-new state;
        // only document-source failures abort the run.
        let registry_text = match registry_source {
            Some(source) => match source.fetch_registry().await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Registry fetch failed, proceeding without a registry check: {}", e);
                    counter!("scout_registry_fetch_failures_total").increment(1);
                    None
                }
            },
            None => None,
        };

        let outcome = matcher::match_catalogue(components, registry_text.as_deref(), oracle).await;
        info!(
            "Registry diff: {} existing, {} new (registry_checked={})",
            outcome.existing.len(),
            outcome.new_components.len(),
            outcome.registry_checked
        );
        counter!("scout_existing_components_total").increment(outcome.existing.len() as u64);
        counter!("scout_new_components_total").increment(outcome.new_components.len() as u64);

        let report = reporter::assemble_report(fetched.metadata, outcome, screens)?;
        histogram!("scout_pipeline_duration_seconds").record(t_pipeline.elapsed().as_secs_f64());
        Ok(report)
    }
}
