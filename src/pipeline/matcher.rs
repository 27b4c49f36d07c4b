use crate::types::{ComponentRecord, MatchMethod, MatchOracle, MatchedComponent};
use metrics::counter;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Partition of the catalogue against the registry. `existing` and
/// `new_components` are disjoint and together cover the whole catalogue.
#[derive(Debug)]
pub struct MatchOutcome {
    pub existing: Vec<MatchedComponent>,
    pub new_components: Vec<ComponentRecord>,
    /// False when no registry content was available; every component is
    /// then reported new.
    pub registry_checked: bool,
}

/// Match the catalogue against the registry text.
///
/// Case-insensitive substring containment is the authoritative first pass.
/// Names it leaves unresolved go to the fuzzy oracle in one call, when an
/// oracle is configured. Oracle output is untrusted: names missing from its
/// partition, present in both halves, or duplicated are routed to `new`, as
/// is the whole residue when the oracle call itself fails. Over-generation
/// is recoverable; silently dropping a component is not.
pub async fn match_catalogue(
    catalogue: Vec<ComponentRecord>,
    registry_text: Option<&str>,
    oracle: Option<&dyn MatchOracle>,
) -> MatchOutcome {
    let registry_text = match registry_text {
        Some(text) => text,
        None => {
            info!(
                "No registry content available; classifying all {} components as new",
                catalogue.len()
            );
            return MatchOutcome {
                existing: Vec::new(),
                new_components: catalogue,
                registry_checked: false,
            };
        }
    };

    let registry_lower = registry_text.to_lowercase();
    let mut existing = Vec::new();
    let mut residue = Vec::new();

    for record in catalogue {
        if registry_lower.contains(&record.name.to_lowercase()) {
            debug!("Substring match for component '{}'", record.name);
            let matched_name = record.name.clone();
            existing.push(MatchedComponent {
                component: record,
                matched_name,
                match_method: MatchMethod::Substring,
            });
        } else {
            residue.push(record);
        }
    }
    counter!("scout_substring_matches_total").increment(existing.len() as u64);

    let new_components = match oracle {
        Some(oracle) if !residue.is_empty() => {
            resolve_residue(residue, registry_text, oracle, &mut existing).await
        }
        _ => residue,
    };

    MatchOutcome {
        existing,
        new_components,
        registry_checked: true,
    }
}

/// Ask the oracle about the names the substring filter left unresolved and
/// fold the validated answers into the partition.
async fn resolve_residue(
    residue: Vec<ComponentRecord>,
    registry_text: &str,
    oracle: &dyn MatchOracle,
    existing: &mut Vec<MatchedComponent>,
) -> Vec<ComponentRecord> {
    let names: Vec<String> = residue.iter().map(|r| r.name.clone()).collect();
    info!("Delegating {} unresolved names to the match oracle", names.len());

    let partition = match oracle.match_names(&names, registry_text).await {
        Ok(partition) => partition,
        Err(e) => {
            warn!("Match oracle call failed, keeping residue as new: {}", e);
            counter!("scout_oracle_failures_total").increment(1);
            return residue;
        }
    };

    // Count every appearance per name across both halves. A valid answer
    // mentions each input name exactly once.
    let mut mentions: HashMap<&str, usize> = HashMap::new();
    let mut matched_names: HashMap<&str, &str> = HashMap::new();
    for m in &partition.existing {
        *mentions.entry(m.original_name.as_str()).or_insert(0) += 1;
        matched_names.insert(m.original_name.as_str(), m.matched_name.as_str());
    }
    for name in &partition.new {
        *mentions.entry(name.as_str()).or_insert(0) += 1;
    }

    let mut new_components = Vec::new();
    for record in residue {
        let count = mentions.get(record.name.as_str()).copied().unwrap_or(0);
        let in_existing = matched_names.contains_key(record.name.as_str());
        if count == 1 && in_existing {
            let matched_name = matched_names[record.name.as_str()].to_string();
            existing.push(MatchedComponent {
                component: record,
                matched_name,
                match_method: MatchMethod::Oracle,
            });
        } else {
            if count != 1 {
                warn!(
                    "Oracle partition mentions '{}' {} times; treating as new",
                    record.name, count
                );
                counter!("scout_oracle_contract_violations_total").increment(1);
            }
            new_components.push(record);
        }
    }
    new_components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScoutError};
    use crate::types::{Category, NodeStyles, NodeType, OracleMatch, OraclePartition};

    fn record(name: &str) -> ComponentRecord {
        ComponentRecord {
            name: name.to_string(),
            id: format!("id-{}", name),
            path: vec!["Root".to_string(), name.to_string()],
            node_type: NodeType::Component,
            category: Category::Other,
            description: None,
            width: Some(100.0),
            height: Some(40.0),
            child_count: 0,
            styles: NodeStyles::default(),
        }
    }

    struct FixedOracle(OraclePartition);

    #[async_trait::async_trait]
    impl MatchOracle for FixedOracle {
        async fn match_names(&self, _names: &[String], _registry: &str) -> Result<OraclePartition> {
            Ok(self.0.clone())
        }
    }

    struct FailingOracle;

    #[async_trait::async_trait]
    impl MatchOracle for FailingOracle {
        async fn match_names(&self, _names: &[String], _registry: &str) -> Result<OraclePartition> {
            Err(ScoutError::Api {
                message: "oracle unavailable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn substring_match_is_case_insensitive() {
        let catalogue = vec![record("PrimaryButton"), record("UserAvatar")];
        let registry = "export { primarybutton } from './PrimaryButton';";

        let outcome = match_catalogue(catalogue, Some(registry), None).await;
        assert_eq!(outcome.existing.len(), 1);
        assert_eq!(outcome.existing[0].component.name, "PrimaryButton");
        assert_eq!(outcome.existing[0].match_method, MatchMethod::Substring);
        assert_eq!(outcome.new_components.len(), 1);
        assert_eq!(outcome.new_components[0].name, "UserAvatar");
        assert!(outcome.registry_checked);
    }

    #[tokio::test]
    async fn absent_registry_classifies_everything_new() {
        let catalogue: Vec<ComponentRecord> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|n| record(n))
            .collect();

        let outcome = match_catalogue(catalogue, None, None).await;
        assert!(outcome.existing.is_empty());
        assert_eq!(outcome.new_components.len(), 5);
        assert!(!outcome.registry_checked);
    }

    #[tokio::test]
    async fn oracle_resolves_only_the_residue() {
        let catalogue = vec![record("PrimaryButton"), record("user-avatar")];
        let oracle = FixedOracle(OraclePartition {
            existing: vec![OracleMatch {
                original_name: "user-avatar".to_string(),
                matched_name: "UserAvatar".to_string(),
            }],
            new: vec![],
        });

        let outcome =
            match_catalogue(catalogue, Some("primarybutton"), Some(&oracle)).await;
        assert_eq!(outcome.existing.len(), 2);
        let oracle_hit = outcome
            .existing
            .iter()
            .find(|m| m.match_method == MatchMethod::Oracle)
            .unwrap();
        assert_eq!(oracle_hit.component.name, "user-avatar");
        assert_eq!(oracle_hit.matched_name, "UserAvatar");
        assert!(outcome.new_components.is_empty());
    }

    #[tokio::test]
    async fn names_missing_from_the_oracle_partition_default_to_new() {
        let catalogue = vec![record("Mystery")];
        let oracle = FixedOracle(OraclePartition::default());

        let outcome = match_catalogue(catalogue, Some("unrelated"), Some(&oracle)).await;
        assert!(outcome.existing.is_empty());
        assert_eq!(outcome.new_components.len(), 1);
    }

    #[tokio::test]
    async fn names_in_both_halves_default_to_new() {
        let catalogue = vec![record("Ambiguous")];
        let oracle = FixedOracle(OraclePartition {
            existing: vec![OracleMatch {
                original_name: "Ambiguous".to_string(),
                matched_name: "ambiguous-widget".to_string(),
            }],
            new: vec!["Ambiguous".to_string()],
        });

        let outcome = match_catalogue(catalogue, Some("unrelated"), Some(&oracle)).await;
        assert!(outcome.existing.is_empty());
        assert_eq!(outcome.new_components.len(), 1);
    }

    #[tokio::test]
    async fn oracle_failure_keeps_residue_new() {
        let catalogue = vec![record("Widget"), record("Gadget")];

        let outcome = match_catalogue(catalogue, Some("unrelated"), Some(&FailingOracle)).await;
        assert!(outcome.existing.is_empty());
        assert_eq!(outcome.new_components.len(), 2);
        assert!(outcome.registry_checked);
    }

    #[tokio::test]
    async fn partition_is_complete_and_disjoint() {
        let catalogue = vec![record("Alpha"), record("Beta"), record("Gamma")];
        let oracle = FixedOracle(OraclePartition {
            existing: vec![OracleMatch {
                original_name: "Beta".to_string(),
                matched_name: "beta-card".to_string(),
            }],
            new: vec!["Gamma".to_string()],
        });

        let outcome = match_catalogue(catalogue, Some("alpha"), Some(&oracle)).await;
        assert_eq!(outcome.existing.len() + outcome.new_components.len(), 3);

        let mut all: Vec<String> = outcome
            .existing
            .iter()
            .map(|m| m.component.name.clone())
            .chain(outcome.new_components.iter().map(|r| r.name.clone()))
            .collect();
        all.sort();
        assert_eq!(all, vec!["Alpha", "Beta", "Gamma"]);
    }
}
