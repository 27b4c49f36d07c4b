use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, warn};

use design_scout::apis::claude::ClaudeClient;
use design_scout::apis::figma::FigmaClient;
use design_scout::apis::gitlab::GitlabClient;
use design_scout::config::Config;
use design_scout::error::ScoutError;
use design_scout::pipeline::{reporter, Pipeline};
use design_scout::scaffold::Scaffolder;
use design_scout::server::AppContext;
use design_scout::types::{DiffReport, DocumentSource, MatchOracle, RegistrySource};
use design_scout::{logging, metrics, server};

#[derive(Parser)]
#[command(name = "design_scout")]
#[command(about = "Figma design component catalog and registry diff tool")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Catalog the atomic components and screens of a design file
    Catalog {
        /// Figma file key
        #[arg(long)]
        file: String,
        /// Restrict the run to a sub-node of the document
        #[arg(long)]
        node: Option<String>,
    },
    /// Run the full diff pipeline against the component registry
    Diff {
        /// Figma file key
        #[arg(long)]
        file: String,
        /// Restrict the run to a sub-node of the document
        #[arg(long)]
        node: Option<String>,
        /// Skip the registry check (every component reports as new)
        #[arg(long)]
        skip_registry: bool,
        /// Skip the fuzzy-matching oracle
        #[arg(long)]
        skip_oracle: bool,
        /// Directory for the report JSON
        #[arg(long, default_value = "output")]
        out_dir: String,
    },
    /// Generate source for new components and commit them to a branch
    Scaffold {
        /// Figma file key
        #[arg(long)]
        file: String,
        /// Restrict the run to a sub-node of the document
        #[arg(long)]
        node: Option<String>,
        /// Target branch name (generated when omitted)
        #[arg(long)]
        branch: Option<String>,
    },
    /// Run the HTTP server
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Falling back to default configuration: {}", e);
            Config::default()
        }
    }
}

fn build_registry(config: &Config) -> Option<Arc<GitlabClient>> {
    let registry_config = config.registry.as_ref()?;
    match GitlabClient::from_env(registry_config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Registry client unavailable: {}", e);
            println!("⚠️  Registry client unavailable ({e}); components will report as new");
            None
        }
    }
}

fn build_oracle(config: &Config) -> Option<Arc<ClaudeClient>> {
    if !config.oracle.enabled {
        return None;
    }
    match ClaudeClient::from_env(&config.oracle) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Match oracle unavailable: {}", e);
            None
        }
    }
}

fn print_report_summary(report: &DiffReport) {
    println!("\n📊 Diff results for '{}':", report.source.document_name);
    println!("   Screens: {}", report.screens.len());
    println!(
        "   Components: {}",
        report.existing_components.len() + report.new_components.len()
    );
    println!("   Existing: {}", report.existing_components.len());
    println!("   New: {}", report.new_components.len());
    if !report.registry_checked {
        println!("   ⚠️  No registry check occurred");
    }
    for record in &report.new_components {
        println!("   + {} [{:?}]", record.name, record.category);
    }
}

async fn run_diff(
    config: &Config,
    file: &str,
    node: Option<&str>,
    skip_registry: bool,
    skip_oracle: bool,
) -> design_scout::error::Result<DiffReport> {
    let figma = FigmaClient::from_env(&config.figma)?;
    let registry = if skip_registry {
        None
    } else {
        build_registry(config)
    };
    let oracle = if skip_oracle { None } else { build_oracle(config) };

    Pipeline::run(
        &figma,
        registry.as_deref().map(|r| r as &dyn RegistrySource),
        oracle.as_deref().map(|o| o as &dyn MatchOracle),
        file,
        node,
    )
    .await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog { file, node } => {
            println!("🔍 Cataloging design file {file}...");
            let config = load_config();
            let figma = FigmaClient::from_env(&config.figma)?;
            let fetched = figma.fetch_document(&file, node.as_deref()).await?;
            let (components, screens) = Pipeline::catalog(&fetched.root);

            println!("\n📋 Catalog for '{}':", fetched.metadata.document_name);
            for screen in &screens {
                println!("   🖥  {} ({}x{})",
                    screen.name,
                    screen.width.map_or("?".to_string(), |w| w.to_string()),
                    screen.height.map_or("?".to_string(), |h| h.to_string())
                );
            }
            for record in &components {
                println!("   🧩 {} [{:?}] at {}", record.name, record.category, record.path.join(" / "));
            }
            println!("\n   {} screens, {} atomic components", screens.len(), components.len());
        }
        Commands::Diff {
            file,
            node,
            skip_registry,
            skip_oracle,
            out_dir,
        } => {
            println!("🔄 Running diff pipeline for {file}...");
            let config = load_config();
            match run_diff(&config, &file, node.as_deref(), skip_registry, skip_oracle).await {
                Ok(report) => {
                    print_report_summary(&report);
                    let output_file = reporter::persist_report(&report, &out_dir)?;
                    println!("   💾 Report written to {output_file}");
                }
                Err(e) => {
                    error!("Diff pipeline failed: {}", e);
                    println!("❌ Diff pipeline failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Scaffold { file, node, branch } => {
            println!("🔨 Scaffolding new components from {file}...");
            let config = load_config();
            let registry_config = config.registry.clone().ok_or_else(|| {
                ScoutError::Config("scaffold requires a [registry] config section".into())
            })?;

            let report = run_diff(&config, &file, node.as_deref(), false, false).await?;
            print_report_summary(&report);

            let sink = Arc::new(GitlabClient::from_env(&registry_config)?);
            let oracle = Arc::new(ClaudeClient::from_env(&config.oracle)?);
            let scaffolder = Scaffolder::new(oracle, sink, registry_config.components_path.clone());

            let result = scaffolder.scaffold_new_components(&report, branch).await?;
            if let Some(commit_id) = &result.commit_id {
                println!("✅ Committed {} files to {} ({})",
                    result.committed_files.len(), result.branch, commit_id);
            } else {
                println!("ℹ️  Nothing committed");
            }
            if !result.errors.is_empty() {
                warn!("{} components failed to generate", result.errors.len());
                println!("\n⚠️  Generation errors:");
                for error in &result.errors {
                    println!("   - {error}");
                }
            }
        }
        Commands::Serve { port } => {
            metrics::init_metrics();
            let config = load_config();
            let figma: Arc<dyn DocumentSource> = Arc::new(FigmaClient::from_env(&config.figma)?);
            let registry = build_registry(&config);
            let oracle = build_oracle(&config);

            let ctx = Arc::new(AppContext {
                document_source: figma,
                registry_source: registry.map(|r| r as Arc<dyn RegistrySource>),
                oracle: oracle.map(|o| o as Arc<dyn MatchOracle>),
            });
            if let Err(e) = server::start_server(ctx, port).await {
                error!("Server failed: {}", e);
                println!("❌ Server failed: {e}");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
