use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Node type as reported by the document source. Anything beyond the three
/// types the classifier cares about collapses into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Component,
    Instance,
    Frame,
    #[serde(other)]
    Other,
}

/// Bounding box of a node. Either dimension may be missing; size-based
/// predicates treat a missing dimension as "condition not met", never an error.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// A node in the design-document tree, as returned by the document source.
/// Immutable input; all optional fields default to absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, rename = "absoluteBoundingBox")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub children: Vec<DocumentNode>,
    #[serde(default)]
    pub background_color: Option<serde_json::Value>,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub effects: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DocumentNode {
    /// Width/height pair, flattened from the optional bounding box.
    pub fn dimensions(&self) -> (Option<f64>, Option<f64>) {
        match self.bounding_box {
            Some(b) => (b.width, b.height),
            None => (None, None),
        }
    }
}

/// Structural category assigned to an atomic component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    StatusBar,
    Button,
    Input,
    Text,
    Icon,
    Image,
    Avatar,
    Badge,
    Card,
    List,
    Tab,
    Modal,
    Other,
}

/// Style payload carried through from the source node, unmodified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyles {
    pub background_color: Option<serde_json::Value>,
    pub opacity: Option<f64>,
    pub effects: Option<serde_json::Value>,
}

/// An atomic component found in the document tree. Created once during
/// classification and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    pub name: String,
    pub id: String,
    /// Ancestor names from the document root, own name last. Display and
    /// traceability only; matching never looks at this.
    pub path: Vec<String>,
    pub node_type: NodeType,
    pub category: Category,
    pub description: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub child_count: usize,
    pub styles: NodeStyles,
}

/// A screen-sized frame found in the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenRecord {
    pub name: String,
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

pub const SCREEN_RECORD_TYPE: &str = "SCREEN";

/// Document-level metadata passed through to the report for traceability.
/// All fields are source-provided strings so the report stays a pure
/// function of its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetadata {
    pub file_key: String,
    pub document_name: String,
    pub version: Option<String>,
    pub last_modified: Option<String>,
}

/// How a component was matched against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Substring,
    Oracle,
}

/// A catalogue component the registry already knows about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedComponent {
    pub component: ComponentRecord,
    pub matched_name: String,
    pub match_method: MatchMethod,
}

/// Terminal artifact of a pipeline run. Contains no wall-clock fields:
/// identical input yields a byte-identical report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffReport {
    pub source: SourceMetadata,
    pub existing_components: Vec<MatchedComponent>,
    pub new_components: Vec<ComponentRecord>,
    pub screens: Vec<ScreenRecord>,
    /// False when no registry content could be located; every component is
    /// then classified new.
    pub registry_checked: bool,
    pub content_digest: String,
}

/// One existing-side entry of the oracle's partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleMatch {
    pub original_name: String,
    pub matched_name: String,
}

/// Untrusted partition returned by the fuzzy-matching oracle. Validated by
/// the matcher before use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OraclePartition {
    #[serde(default)]
    pub existing: Vec<OracleMatch>,
    #[serde(default)]
    pub new: Vec<String>,
}

/// A generated source file ready to be committed to the registry repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedComponent {
    pub file_path: String,
    pub source: String,
}

/// A fetched document root plus its passthrough metadata.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub root: DocumentNode,
    pub metadata: SourceMetadata,
}

/// Boundary to the system holding the design document tree.
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    /// Unique identifier for this source, used in logs.
    fn source_name(&self) -> &'static str;

    /// Fetch the document root, optionally scoped to a sub-node.
    /// Network/auth failures must surface as errors, never as an empty tree.
    async fn fetch_document(
        &self,
        file_key: &str,
        node_id: Option<&str>,
    ) -> Result<FetchedDocument>;
}

/// Boundary to the system of record listing already-implemented components.
#[async_trait::async_trait]
pub trait RegistrySource: Send + Sync {
    /// Locate and return the registry text. `Ok(None)` means the expected
    /// file does not exist, which is a valid outcome, not an error.
    async fn fetch_registry(&self) -> Result<Option<String>>;
}

/// Boundary to the fuzzy name-matching oracle. Output is untrusted and gets
/// validated by the matcher.
#[async_trait::async_trait]
pub trait MatchOracle: Send + Sync {
    async fn match_names(
        &self,
        names: &[String],
        registry_text: &str,
    ) -> Result<OraclePartition>;
}

/// Boundary to the code-generation oracle producing replacement source for
/// a missing component.
#[async_trait::async_trait]
pub trait CodegenOracle: Send + Sync {
    async fn generate_component(&self, record: &ComponentRecord) -> Result<String>;
}

/// Boundary to the version-controlled store that receives generated files.
#[async_trait::async_trait]
pub trait CommitSink: Send + Sync {
    async fn create_branch(&self, branch: &str) -> Result<()>;

    /// Commit all files in one commit on the given branch; returns the
    /// commit identifier.
    async fn commit_files(
        &self,
        branch: &str,
        message: &str,
        files: &[GeneratedComponent],
    ) -> Result<String>;
}
