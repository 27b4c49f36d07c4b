use crate::config::OracleConfig;
use crate::error::{Result, ScoutError};
use crate::types::{CodegenOracle, ComponentRecord, MatchOracle, OraclePartition};
use serde::Deserialize;
use tracing::{debug, instrument};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

const MATCH_SYSTEM_PROMPT: &str = "You compare UI component names against a \
component registry file. Match naming variations: case, delimiters (camelCase, \
kebab-case, snake_case, spaced words) and word order. Accept partial matches \
where a component name appears inside a registry entry's qualified name. When \
uncertain, classify the component as new. Respond with valid JSON only, no \
markdown code blocks, no explanations, in the shape \
{\"existing\": [{\"originalName\": \"...\", \"matchedName\": \"...\"}], \"new\": [\"...\"]}. \
Every input name must appear in exactly one of the two lists.";

const CODEGEN_SYSTEM_PROMPT: &str = "You write React function components in \
TypeScript for a shared component library. Respond with the source code of a \
single file only: no markdown code blocks, no explanations. Use typed props, \
no external state, and keep the styling inline and minimal.";

/// Client for the Anthropic Messages API, acting as both the fuzzy
/// name-matching oracle and the code-generation oracle. Temperature is
/// pinned to zero so repeated runs over identical input classify the same.
#[derive(Clone)]
pub struct ClaudeClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    pub fn new(api_key: String, config: &OracleConfig) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Create from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env(config: &OracleConfig) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            ScoutError::Config("ANTHROPIC_API_KEY environment variable not set".into())
        })?;
        Ok(Self::new(api_key, config))
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    async fn call_api(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": &self.model,
                "max_tokens": self.max_tokens,
                "temperature": 0.0,
                "system": system_prompt,
                "messages": [{"role": "user", "content": user_prompt}]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::Api {
                message: format!("Anthropic API error {}: {}", status, body),
            });
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: Option<String>,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            content: Vec<ContentBlock>,
        }

        let api_response: ApiResponse = response.json().await?;
        api_response
            .content
            .first()
            .and_then(|c| c.text.clone())
            .ok_or_else(|| ScoutError::Api {
                message: "Empty response from Anthropic".to_string(),
            })
    }
}

/// Models occasionally wrap output in fences despite instructions;
/// strip them before parsing.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .split_once('\n')
        .map(|(_, body)| body)
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn build_match_prompt(names: &[String], registry_text: &str) -> String {
    format!(
        "Component names:\n{}\n\nRegistry file content:\n{}",
        names.join("\n"),
        registry_text
    )
}

fn parse_partition(raw: &str) -> Result<OraclePartition> {
    let partition: OraclePartition = serde_json::from_str(strip_code_fences(raw))?;
    Ok(partition)
}

fn build_codegen_prompt(record: &ComponentRecord) -> String {
    let mut prompt = format!(
        "Component name: {}\nCategory: {:?}\n",
        record.name, record.category
    );
    if let (Some(w), Some(h)) = (record.width, record.height) {
        prompt.push_str(&format!("Dimensions: {}x{}\n", w, h));
    }
    if let Some(description) = &record.description {
        prompt.push_str(&format!("Description: {}\n", description));
    }
    prompt.push_str(&format!("Location in the design document: {}\n", record.path.join(" / ")));
    prompt
}

#[async_trait::async_trait]
impl MatchOracle for ClaudeClient {
    #[instrument(skip(self, registry_text), fields(names = names.len(), model = %self.model))]
    async fn match_names(
        &self,
        names: &[String],
        registry_text: &str,
    ) -> Result<OraclePartition> {
        let prompt = build_match_prompt(names, registry_text);
        let raw = self.call_api(MATCH_SYSTEM_PROMPT, &prompt).await?;
        debug!("Oracle returned {} bytes", raw.len());
        parse_partition(&raw)
    }
}

#[async_trait::async_trait]
impl CodegenOracle for ClaudeClient {
    #[instrument(skip(self), fields(component = %record.name))]
    async fn generate_component(&self, record: &ComponentRecord) -> Result<String> {
        let prompt = build_codegen_prompt(record);
        let raw = self.call_api(CODEGEN_SYSTEM_PROMPT, &prompt).await?;
        Ok(strip_code_fences(&raw).to_string())
    }
}
