use anyhow::Result;
use design_scout::error::Result as ScoutResult;
use design_scout::pipeline::{reporter, Pipeline};
use design_scout::types::{
    Category, DocumentNode, DocumentSource, FetchedDocument, MatchOracle, OraclePartition,
    RegistrySource, SourceMetadata,
};
use serde_json::json;

/// Document source serving a fixed in-memory tree.
struct StaticDocumentSource {
    tree: serde_json::Value,
}

#[async_trait::async_trait]
impl DocumentSource for StaticDocumentSource {
    fn source_name(&self) -> &'static str {
        "static"
    }

    async fn fetch_document(
        &self,
        file_key: &str,
        _node_id: Option<&str>,
    ) -> ScoutResult<FetchedDocument> {
        let root: DocumentNode = serde_json::from_value(self.tree.clone())?;
        Ok(FetchedDocument {
            root,
            metadata: SourceMetadata {
                file_key: file_key.to_string(),
                document_name: "Home Redesign".to_string(),
                version: Some("12".to_string()),
                last_modified: Some("2024-05-01T09:30:00Z".to_string()),
            },
        })
    }
}

/// Registry source serving fixed text, or nothing at all.
struct StaticRegistry {
    content: Option<String>,
}

#[async_trait::async_trait]
impl RegistrySource for StaticRegistry {
    async fn fetch_registry(&self) -> ScoutResult<Option<String>> {
        Ok(self.content.clone())
    }
}

/// Oracle that classifies every name it is asked about as new.
struct ConservativeOracle;

#[async_trait::async_trait]
impl MatchOracle for ConservativeOracle {
    async fn match_names(
        &self,
        names: &[String],
        _registry_text: &str,
    ) -> ScoutResult<OraclePartition> {
        Ok(OraclePartition {
            existing: Vec::new(),
            new: names.to_vec(),
        })
    }
}

fn home_screen_tree() -> serde_json::Value {
    json!({
        "id": "0:0",
        "name": "Document",
        "type": "DOCUMENT",
        "children": [{
            "id": "1:0",
            "name": "HomeScreen",
            "type": "FRAME",
            "absoluteBoundingBox": { "width": 800.0, "height": 1200.0 },
            "children": [
                {
                    "id": "1:1",
                    "name": "PrimaryButton",
                    "type": "COMPONENT",
                    "absoluteBoundingBox": { "width": 120.0, "height": 40.0 }
                },
                {
                    "id": "1:2",
                    "name": "UserAvatar",
                    "type": "COMPONENT",
                    "absoluteBoundingBox": { "width": 48.0, "height": 48.0 }
                }
            ]
        }]
    })
}

#[tokio::test]
async fn end_to_end_diff_partitions_the_catalogue() -> Result<()> {
    let source = StaticDocumentSource {
        tree: home_screen_tree(),
    };
    let registry = StaticRegistry {
        content: Some("export { PrimaryButton } from './PrimaryButton';".to_string()),
    };

    let report = Pipeline::run(&source, Some(&registry), None, "file-1", None).await?;

    assert_eq!(report.screens.len(), 1);
    assert_eq!(report.screens[0].name, "HomeScreen");
    assert_eq!(report.screens[0].record_type, "SCREEN");

    assert_eq!(report.existing_components.len(), 1);
    let existing = &report.existing_components[0];
    assert_eq!(existing.component.name, "PrimaryButton");
    assert_eq!(existing.component.category, Category::Button);

    assert_eq!(report.new_components.len(), 1);
    assert_eq!(report.new_components[0].name, "UserAvatar");
    assert_eq!(report.new_components[0].category, Category::Avatar);

    assert!(report.registry_checked);
    assert_eq!(report.source.document_name, "Home Redesign");
    Ok(())
}

#[tokio::test]
async fn missing_registry_reports_every_component_new() -> Result<()> {
    let tree = json!({
        "id": "0:0",
        "name": "Document",
        "type": "DOCUMENT",
        "children": (1..=5).map(|i| json!({
            "id": format!("1:{}", i),
            "name": format!("Widget{}", i),
            "type": "COMPONENT",
            "absoluteBoundingBox": { "width": 100.0, "height": 40.0 }
        })).collect::<Vec<_>>()
    });
    let source = StaticDocumentSource { tree };
    let registry = StaticRegistry { content: None };

    let report = Pipeline::run(&source, Some(&registry), None, "file-2", None).await?;

    assert!(report.existing_components.is_empty());
    assert_eq!(report.new_components.len(), 5);
    assert!(!report.registry_checked);
    Ok(())
}

#[tokio::test]
async fn rerunning_on_unchanged_input_is_byte_identical() -> Result<()> {
    let source = StaticDocumentSource {
        tree: home_screen_tree(),
    };
    let registry = StaticRegistry {
        content: Some("primarybutton".to_string()),
    };

    let first = Pipeline::run(&source, Some(&registry), None, "file-3", None).await?;
    let second = Pipeline::run(&source, Some(&registry), None, "file-3", None).await?;

    assert_eq!(
        serde_json::to_vec(&first)?,
        serde_json::to_vec(&second)?
    );
    assert_eq!(first.content_digest, second.content_digest);
    Ok(())
}

/// Registry source whose backing store is unreachable.
struct BrokenRegistry;

#[async_trait::async_trait]
impl RegistrySource for BrokenRegistry {
    async fn fetch_registry(&self) -> ScoutResult<Option<String>> {
        Err(design_scout::error::ScoutError::Source {
            status: Some(503),
            message: "registry host unreachable".to_string(),
        })
    }
}

#[tokio::test]
async fn registry_failure_degrades_to_the_flagged_all_new_state() -> Result<()> {
    let source = StaticDocumentSource {
        tree: home_screen_tree(),
    };

    let report = Pipeline::run(&source, Some(&BrokenRegistry), None, "file-6", None).await?;

    assert!(report.existing_components.is_empty());
    assert_eq!(report.new_components.len(), 2);
    assert!(!report.registry_checked);
    Ok(())
}

#[tokio::test]
async fn conservative_oracle_output_keeps_the_partition_complete() -> Result<()> {
    let source = StaticDocumentSource {
        tree: home_screen_tree(),
    };
    let registry = StaticRegistry {
        content: Some("nothing relevant here".to_string()),
    };

    let report = Pipeline::run(
        &source,
        Some(&registry),
        Some(&ConservativeOracle),
        "file-4",
        None,
    )
    .await?;

    assert!(report.existing_components.is_empty());
    assert_eq!(report.new_components.len(), 2);
    assert!(report.registry_checked);
    Ok(())
}

#[tokio::test]
async fn report_persists_to_the_output_directory() -> Result<()> {
    let source = StaticDocumentSource {
        tree: home_screen_tree(),
    };
    let report = Pipeline::run(&source, None, None, "file-5", None).await?;

    let dir = tempfile::tempdir()?;
    let path = reporter::persist_report(&report, dir.path().to_str().unwrap())?;
    assert!(std::path::Path::new(&path).exists());
    assert!(path.contains("file-5"));
    Ok(())
}
