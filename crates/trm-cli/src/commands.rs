//! CLI command definitions and handlers

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use trm_core::{RiskLevel, SoftwareRecord, Strategy, Taxonomy};
use trm_engine::{
    aggregate, assess_all, load_records, reconcile, ClassificationEngine, ExportBundle, FilterOptions, InventoryStatistics, RecordFilter,
    RiskMetrics,
};
use trm_llm::ModelSettings;

/// Main CLI structure
#[derive(Parser, Debug)]
#[command(name = "trm")]
#[command(about = "Classify software inventories into a technology reference model and flag risk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(flatten)]
    pub model: ModelArgs,

    /// JSON taxonomy file replacing the built-in taxonomy
    #[arg(long, global = true)]
    pub taxonomy: Option<PathBuf>,

    /// Command to run; starts the interactive shell when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Completion model connection flags
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Completion model identifier
    #[arg(long, env = "OPENAI_MODEL", global = true)]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(long, env = "OPENAI_TEMPERATURE", global = true)]
    pub temperature: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    pub api_base: Option<String>,
}

impl ModelArgs {
    /// Resolve into settings with the same defaults as the environment loader
    pub fn settings(&self) -> ModelSettings {
        ModelSettings::from_lookup(|name| match name {
            "OPENAI_API_KEY" => self.api_key.clone(),
            "OPENAI_MODEL" => self.model.clone(),
            "OPENAI_TEMPERATURE" => self.temperature.clone(),
            "OPENAI_BASE_URL" => self.api_base.clone(),
            _ => None,
        })
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify and risk-score an inventory file
    Classify {
        /// Input JSON file with software records
        #[arg(short, long)]
        input: PathBuf,

        /// Strategy to apply; repeat to layer strategies, later ones overwrite earlier
        #[arg(short, long = "strategy", default_value = "rule-based")]
        strategies: Vec<Strategy>,

        /// Write the export bundle to this file, or into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show risk metrics and inventory statistics
    Metrics {
        /// Input JSON file; defaults to the session dataset
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Filter records by text, domain, lifecycle status or risk
    Filter {
        /// Input JSON file; defaults to the session dataset
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Case-insensitive text in product name or description
        #[arg(long)]
        search: Option<String>,

        /// Domain name, or "All"
        #[arg(long)]
        domain: Option<String>,

        /// Lifecycle status, or "All"
        #[arg(long)]
        status: Option<String>,

        /// Risk level, or "All"
        #[arg(long)]
        risk: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the active taxonomy
    Taxonomy {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show system information
    Info,
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

impl OutputFormat {
    fn render<T: serde::Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<String> {
        Ok(match self {
            OutputFormat::Text => text(),
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
        })
    }
}

/// Command execution result
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    /// Rendered output for the terminal
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Annotated records kept between commands
struct SessionData {
    records: Vec<SoftwareRecord>,
    strategies: Vec<Strategy>,
}

/// Execute CLI commands
pub struct CommandExecutor {
    engine: ClassificationEngine,
    settings: ModelSettings,
    session: Option<SessionData>,
}

impl CommandExecutor {
    pub fn new(taxonomy: Arc<Taxonomy>, settings: ModelSettings) -> Self {
        Self {
            engine: ClassificationEngine::new(taxonomy, settings.clone()),
            settings,
            session: None,
        }
    }

    /// Build from parsed global flags, loading the taxonomy file when given
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let taxonomy = match &cli.taxonomy {
            Some(path) => Taxonomy::from_path(path)
                .with_context(|| format!("Failed to load taxonomy from {}", path.display()))?,
            None => Taxonomy::standard(),
        };
        Ok(Self::new(Arc::new(taxonomy), cli.model.settings()))
    }

    /// Records of the current session, if any were loaded
    pub fn dataset(&self) -> Option<&[SoftwareRecord]> {
        self.session.as_ref().map(|s| s.records.as_slice())
    }

    /// Execute a CLI command
    pub async fn execute(&mut self, command: Commands) -> Result<CommandResult> {
        match command {
            Commands::Classify {
                input,
                strategies,
                output,
                format,
            } => self.execute_classify(input, strategies, output, format).await,
            Commands::Metrics { input, format } => self.execute_metrics(input, format).await,
            Commands::Filter {
                input,
                search,
                domain,
                status,
                risk,
                format,
            } => {
                let filter = RecordFilter {
                    search,
                    domain,
                    status,
                    risk,
                };
                self.execute_filter(input, filter, format).await
            }
            Commands::Taxonomy { format } => self.execute_taxonomy(format),
            Commands::Info => self.execute_info(),
        }
    }

    async fn execute_classify(
        &mut self,
        input: PathBuf,
        strategies: Vec<Strategy>,
        output: Option<PathBuf>,
        format: OutputFormat,
    ) -> Result<CommandResult> {
        let mut records =
            load_records(&input).with_context(|| format!("Failed to load records from {}", input.display()))?;
        self.engine.process(&mut records, &strategies).await?;

        let bundle = ExportBundle::new(records, &strategies);
        let count = bundle.records.len();

        let written = match output {
            Some(path) => {
                let target = export_target(&path, &bundle);
                bundle.write_to(&target)?;
                info!(path = %target.display(), records = count, "export written");
                Some(target)
            }
            None => None,
        };

        let mut message = format.render(&bundle, || {
            format!(
                "Classified {} records with {}\n\n{}\n{}",
                count,
                strategy_list(&strategies),
                render_records(bundle.records.iter()),
                render_metrics(&bundle.metrics)
            )
        })?;
        if let Some(target) = &written {
            let _ = write!(message, "\nExported {} records to {}", count, target.display());
        }

        let data = serde_json::json!({
            "records": count,
            "strategies": &strategies,
            "metrics": &bundle.metrics,
            "output": written.as_ref().map(|p| p.display().to_string()),
        });

        self.session = Some(SessionData {
            records: bundle.records,
            strategies,
        });

        Ok(CommandResult {
            success: true,
            message,
            data: Some(data),
        })
    }

    async fn execute_metrics(&mut self, input: Option<PathBuf>, format: OutputFormat) -> Result<CommandResult> {
        let records = self.records_for(input).await?;
        let metrics = aggregate(records);
        let statistics = InventoryStatistics::compute(records);

        let data = serde_json::json!({ "metrics": metrics, "statistics": statistics });
        let message = format.render(&data, || {
            format!("{}\n{}", render_metrics(&metrics), render_statistics(&statistics))
        })?;

        Ok(CommandResult {
            success: true,
            message,
            data: Some(data),
        })
    }

    async fn execute_filter(
        &mut self,
        input: Option<PathBuf>,
        filter: RecordFilter,
        format: OutputFormat,
    ) -> Result<CommandResult> {
        let records = self.records_for(input).await?;
        let matches = filter.apply(records);
        let options = FilterOptions::from_records(records);

        let message = format.render(&matches, || {
            format!(
                "{} of {} records match\n\n{}\nDomains: {}\nStatuses: {}\nRisk levels: {}",
                matches.len(),
                records.len(),
                render_records(matches.iter().copied()),
                options.domains.join(", "),
                options.statuses.join(", "),
                options.risk_levels.join(", ")
            )
        })?;

        let data = serde_json::json!({
            "matched": matches.len(),
            "total": records.len(),
            "records": &matches,
            "options": options,
        });

        Ok(CommandResult {
            success: true,
            message,
            data: Some(data),
        })
    }

    fn execute_taxonomy(&self, format: OutputFormat) -> Result<CommandResult> {
        let taxonomy = self.engine.taxonomy();

        let message = format.render(taxonomy, || {
            let mut text = format!("Taxonomy {} ({} domains)\n", taxonomy.version(), taxonomy.domain_count());
            for entry in taxonomy.entries() {
                let _ = writeln!(text, "  {}: {}", entry.name, entry.subdomains.join(", "));
                if !entry.keywords.is_empty() {
                    let _ = writeln!(text, "    keywords: {}", entry.keywords.join(", "));
                }
            }
            text
        })?;

        Ok(CommandResult {
            success: true,
            message,
            data: Some(serde_json::to_value(taxonomy)?),
        })
    }

    fn execute_info(&self) -> Result<CommandResult> {
        let taxonomy = self.engine.taxonomy();
        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "repository": env!("CARGO_PKG_REPOSITORY"),
            "taxonomy_version": taxonomy.version(),
            "domains": taxonomy.domain_count(),
            "strategies": self.engine.registry().strategies(),
            "model": self.settings.model,
            "model_configured": self.settings.has_credential(),
            "session_records": self.dataset().map(|r| r.len()).unwrap_or(0),
            "session_strategies": self.session.as_ref().map(|s| s.strategies.clone()).unwrap_or_default(),
        });

        Ok(CommandResult {
            success: true,
            message: serde_json::to_string_pretty(&info)?,
            data: Some(info),
        })
    }

    /// Records from `input`, or the session dataset when no input is given
    ///
    /// Loaded files become the new session dataset. Stored pairs the taxonomy
    /// rejects are repaired, and records that carry no classification are
    /// classified with the keyword rules first.
    async fn records_for(&mut self, input: Option<PathBuf>) -> Result<&[SoftwareRecord]> {
        if let Some(path) = input {
            let mut records =
                load_records(&path).with_context(|| format!("Failed to load records from {}", path.display()))?;
            let repaired = reconcile(self.engine.taxonomy(), &mut records);
            if repaired > 0 {
                warn!(records = repaired, "stored classifications outside the taxonomy were repaired");
            }
            let mut strategies = Vec::new();
            if records.iter().any(|r| r.classification().is_none()) {
                strategies.push(Strategy::RuleBased);
                self.engine.process(&mut records, &strategies).await?;
            } else {
                assess_all(&mut records);
            }
            self.session = Some(SessionData { records, strategies });
        }

        self.dataset()
            .ok_or_else(|| anyhow!("No dataset loaded; run 'classify' first or pass --input"))
    }
}

/// Resolve `--output`: an existing directory receives a timestamped file name
fn export_target(path: &Path, bundle: &ExportBundle) -> PathBuf {
    if path.is_dir() {
        path.join(bundle.file_name())
    } else {
        path.to_path_buf()
    }
}

fn strategy_list(strategies: &[Strategy]) -> String {
    if strategies.is_empty() {
        return "no strategy".to_string();
    }
    strategies.iter().map(Strategy::as_str).collect::<Vec<_>>().join(", then ")
}

fn render_records<'a>(records: impl Iterator<Item = &'a SoftwareRecord>) -> String {
    let mut text = String::new();
    for record in records {
        let _ = writeln!(
            text,
            "  {:<24} {:<26} {:<20} {:<11} {}",
            record.product_name,
            record.domain.as_deref().unwrap_or("-"),
            record.subdomain.as_deref().unwrap_or("-"),
            record.lifecycle_status,
            record.risk_level.map(|l| l.as_str()).unwrap_or("-")
        );
    }
    text
}

fn render_metrics(metrics: &RiskMetrics) -> String {
    let mut text = format!("Risk summary ({} records)\n", metrics.total);
    for level in RiskLevel::ALL {
        let _ = writeln!(
            text,
            "  {:<12} {:>5} ({:>5.1}%)  {}",
            level.as_str(),
            metrics.count(level),
            metrics.percentage(level),
            level.description()
        );
    }
    let _ = writeln!(text, "  Deprecated: {}", metrics.deprecated_count);
    let _ = writeln!(text, "  Missing vendor: {}", metrics.missing_vendor_count);
    let _ = write!(text, "  Unclassified: {}", metrics.unclassified_count);
    text
}

fn render_statistics(statistics: &InventoryStatistics) -> String {
    let mut text = format!(
        "Inventory: {} products from {} vendors\n",
        statistics.total_products, statistics.unique_vendors
    );
    for (domain, count) in &statistics.domain_counts {
        let share = statistics.domain_percentages.get(domain).copied().unwrap_or(0.0);
        let _ = writeln!(text, "  {:<26} {:>5} ({:>5.1}%)", domain, count, share);
    }
    for (status, count) in &statistics.status_counts {
        let _ = writeln!(text, "  {:<26} {:>5}", status, count);
    }
    text
}
