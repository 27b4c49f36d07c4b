use crate::error::Result;
use crate::pipeline::matcher::MatchOutcome;
use crate::types::{ComponentRecord, DiffReport, MatchedComponent, ScreenRecord, SourceMetadata};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Fields the content digest covers, in report serialization order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DigestPayload<'a> {
    source: &'a SourceMetadata,
    existing_components: &'a [MatchedComponent],
    new_components: &'a [ComponentRecord],
    screens: &'a [ScreenRecord],
    registry_checked: bool,
}

/// Assemble the terminal report. Pure assembly: no record is dropped, no
/// decision logic beyond computing the digest. The report carries no
/// wall-clock fields, so identical input produces identical bytes.
pub fn assemble_report(
    source: SourceMetadata,
    outcome: MatchOutcome,
    screens: Vec<ScreenRecord>,
) -> Result<DiffReport> {
    let payload = DigestPayload {
        source: &source,
        existing_components: &outcome.existing,
        new_components: &outcome.new_components,
        screens: &screens,
        registry_checked: outcome.registry_checked,
    };
    let bytes = serde_json::to_vec(&payload)?;
    let content_digest = hex::encode(Sha256::digest(&bytes));

    Ok(DiffReport {
        source,
        existing_components: outcome.existing,
        new_components: outcome.new_components,
        screens,
        registry_checked: outcome.registry_checked,
        content_digest,
    })
}

/// Persist a report to a timestamped JSON file under `output_dir`.
/// The timestamp lives in the file name only; report bytes stay
/// deterministic.
pub fn persist_report(report: &DiffReport, output_dir: &str) -> Result<String> {
    fs::create_dir_all(output_dir)?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}_{}.json", report.source.file_key, timestamp);
    let filepath = Path::new(output_dir).join(&filename);

    let json_content = serde_json::to_string_pretty(report)?;
    fs::write(&filepath, json_content)?;

    Ok(filepath.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, MatchMethod, NodeStyles, NodeType};

    fn sample_outcome() -> MatchOutcome {
        let record = ComponentRecord {
            name: "PrimaryButton".to_string(),
            id: "1:1".to_string(),
            path: vec!["Root".to_string(), "PrimaryButton".to_string()],
            node_type: NodeType::Component,
            category: Category::Button,
            description: None,
            width: Some(120.0),
            height: Some(40.0),
            child_count: 0,
            styles: NodeStyles::default(),
        };
        MatchOutcome {
            existing: vec![MatchedComponent {
                component: record.clone(),
                matched_name: "PrimaryButton".to_string(),
                match_method: MatchMethod::Substring,
            }],
            new_components: vec![ComponentRecord {
                name: "UserAvatar".to_string(),
                id: "1:2".to_string(),
                category: Category::Avatar,
                ..record
            }],
            registry_checked: true,
        }
    }

    fn sample_metadata() -> SourceMetadata {
        SourceMetadata {
            file_key: "abc123".to_string(),
            document_name: "Design".to_string(),
            version: Some("7".to_string()),
            last_modified: Some("2024-01-01T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn assembly_keeps_every_record() {
        let report = assemble_report(sample_metadata(), sample_outcome(), Vec::new()).unwrap();
        assert_eq!(report.existing_components.len(), 1);
        assert_eq!(report.new_components.len(), 1);
        assert!(report.registry_checked);
        assert_eq!(report.content_digest.len(), 64);
    }

    #[test]
    fn identical_input_yields_identical_bytes() {
        let a = assemble_report(sample_metadata(), sample_outcome(), Vec::new()).unwrap();
        let b = assemble_report(sample_metadata(), sample_outcome(), Vec::new()).unwrap();
        assert_eq!(a.content_digest, b.content_digest);
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn digest_changes_when_partition_changes() {
        let a = assemble_report(sample_metadata(), sample_outcome(), Vec::new()).unwrap();
        let mut outcome = sample_outcome();
        outcome.new_components.clear();
        let b = assemble_report(sample_metadata(), outcome, Vec::new()).unwrap();
        assert_ne!(a.content_digest, b.content_digest);
    }

    #[test]
    fn persisted_report_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let report = assemble_report(sample_metadata(), sample_outcome(), Vec::new()).unwrap();

        let path = persist_report(&report, dir.path().to_str().unwrap()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let loaded: DiffReport = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.content_digest, report.content_digest);
    }
}
