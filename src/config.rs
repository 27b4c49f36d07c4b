use crate::error::{Result, ScoutError};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub figma: FigmaConfig,
    /// Absent section means no registry diff; every component reports as new.
    pub registry: Option<RegistryConfig>,
    #[serde(default)]
    pub oracle: OracleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FigmaConfig {
    #[serde(default = "default_figma_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_registry_base_url")]
    pub base_url: String,
    /// Project identifier in the repository store (numeric id or
    /// URL-encoded "group/project").
    pub project_id: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Repository directory holding the component library.
    #[serde(default = "default_components_path")]
    pub components_path: String,
    /// File within `components_path` whose raw text is the registry content.
    #[serde(default = "default_index_file")]
    pub index_file: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_figma_base_url() -> String {
    "https://api.figma.com".to_string()
}

fn default_registry_base_url() -> String {
    "https://gitlab.com".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_components_path() -> String {
    "src/components".to_string()
}

fn default_index_file() -> String {
    "index.ts".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for FigmaConfig {
    fn default() -> Self {
        Self {
            base_url: default_figma_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            figma: FigmaConfig::default(),
            registry: None,
            oracle: OracleConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from(config_path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ScoutError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path, e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
