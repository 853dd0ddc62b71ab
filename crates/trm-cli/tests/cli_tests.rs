//! Tests for the trm-cli crate

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trm_cli::{parse_command_line, Cli, CommandExecutor, Commands, InteractiveSession, OutputFormat};
use trm_core::{RiskLevel, Strategy, Taxonomy};
use trm_llm::ModelSettings;

const INVENTORY: &str = r#"[
    {"Product Name": "PostgreSQL", "Description": "Relational database", "Category Hint": "",
     "Vendor": "PGDG", "Lifecycle Status": "Active"},
    {"Product Name": "TensorFlow", "Description": "Deep learning framework", "Category Hint": null,
     "Vendor": "Google", "Lifecycle Status": "beta"},
    {"Product Name": "Calc", "Description": "a simple calculator", "Vendor": "Acme"},
    {"Product Name": "OldVPN", "Description": "Legacy network tunnel", "Vendor": null,
     "Lifecycle Status": "Deprecated"}
]"#;

fn write_inventory(dir: &Path) -> PathBuf {
    let path = dir.join("inventory.json");
    std::fs::write(&path, INVENTORY).unwrap();
    path
}

fn executor() -> CommandExecutor {
    CommandExecutor::new(Arc::new(Taxonomy::standard()), ModelSettings::new())
}

fn classify(input: &Path, output: Option<PathBuf>, format: OutputFormat) -> Commands {
    Commands::Classify {
        input: input.to_path_buf(),
        strategies: vec![Strategy::RuleBased],
        output,
        format,
    }
}

#[test]
fn test_cli_parsing_classify_defaults() {
    let cli = Cli::try_parse_from(["trm", "classify", "--input", "inventory.json"]).unwrap();

    match cli.command {
        Some(Commands::Classify {
            input,
            strategies,
            output,
            format,
        }) => {
            assert_eq!(input, PathBuf::from("inventory.json"));
            assert_eq!(strategies, vec![Strategy::RuleBased]);
            assert_eq!(output, None);
            assert_eq!(format, OutputFormat::Text);
        }
        _ => panic!("Expected Classify command"),
    }
}

#[test]
fn test_cli_parsing_layered_strategies() {
    let cli = Cli::try_parse_from([
        "trm", "classify", "-i", "in.json", "-s", "rule-based", "-s", "LLM-BASED", "-o", "out.json", "-f", "json-pretty",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Classify {
            strategies,
            output,
            format,
            ..
        }) => {
            assert_eq!(strategies, vec![Strategy::RuleBased, Strategy::LlmBased]);
            assert_eq!(output, Some(PathBuf::from("out.json")));
            assert_eq!(format, OutputFormat::JsonPretty);
        }
        _ => panic!("Expected Classify command"),
    }
}

#[test]
fn test_cli_rejects_unknown_strategy() {
    assert!(Cli::try_parse_from(["trm", "classify", "-i", "in.json", "-s", "magic"]).is_err());
}

#[test]
fn test_cli_parsing_global_model_flags() {
    let cli = Cli::try_parse_from([
        "trm",
        "info",
        "--api-key",
        "sk-flag",
        "--model",
        "gpt-4o-mini",
        "--temperature",
        "0.3",
        "--api-base",
        "http://localhost:9000/v1",
        "--taxonomy",
        "custom.json",
    ])
    .unwrap();

    assert!(matches!(cli.command, Some(Commands::Info)));
    assert_eq!(cli.taxonomy, Some(PathBuf::from("custom.json")));

    let settings = cli.model.settings();
    assert!(settings.has_credential());
    assert_eq!(settings.model, "gpt-4o-mini");
    assert_eq!(settings.temperature, 0.3);
    assert_eq!(settings.endpoint, "http://localhost:9000/v1");
}

#[test]
fn test_cli_parsing_filter() {
    let cli = Cli::try_parse_from(["trm", "filter", "--search", "sql", "--risk", "High-Risk", "--domain", "All"]).unwrap();

    match cli.command {
        Some(Commands::Filter {
            input,
            search,
            domain,
            status,
            risk,
            format,
        }) => {
            assert_eq!(input, None);
            assert_eq!(search.as_deref(), Some("sql"));
            assert_eq!(domain.as_deref(), Some("All"));
            assert_eq!(status, None);
            assert_eq!(risk.as_deref(), Some("High-Risk"));
            assert_eq!(format, OutputFormat::Text);
        }
        _ => panic!("Expected Filter command"),
    }
}

#[test]
fn test_shell_line_parsing() {
    let cli = parse_command_line(r#"filter --search "simple calc" --format json"#).unwrap();
    match cli.command {
        Some(Commands::Filter { search, format, .. }) => {
            assert_eq!(search.as_deref(), Some("simple calc"));
            assert_eq!(format, OutputFormat::Json);
        }
        _ => panic!("Expected Filter command"),
    }

    assert!(parse_command_line("filter --search \"unterminated").is_err());
    assert!(parse_command_line("launch").is_err());
}

#[tokio::test]
async fn test_classify_scores_and_keeps_session() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_inventory(dir.path());
    let mut executor = executor();

    let result = executor.execute(classify(&input, None, OutputFormat::Text)).await.unwrap();
    assert!(result.success);
    assert!(result.message.contains("Classified 4 records with rule-based"));
    assert!(result.message.contains("PostgreSQL"));

    let data = result.data.unwrap();
    assert_eq!(data["records"], 4);
    assert_eq!(data["metrics"]["counts"]["High-Risk"], 2);
    assert_eq!(data["metrics"]["counts"]["Medium-Risk"], 1);

    let dataset = executor.dataset().unwrap();
    assert_eq!(dataset[0].domain.as_deref(), Some("Data Management"));
    assert_eq!(dataset[2].domain.as_deref(), Some("Unclassified"));
    assert_eq!(dataset[3].risk_level, Some(RiskLevel::HighRisk));
}

#[tokio::test]
async fn test_classify_writes_export_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_inventory(dir.path());
    let out_dir = dir.path().join("exports");
    std::fs::create_dir(&out_dir).unwrap();

    let mut executor = executor();
    let result = executor
        .execute(classify(&input, Some(out_dir.clone()), OutputFormat::Json))
        .await
        .unwrap();

    let written: Vec<_> = std::fs::read_dir(&out_dir).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(written.len(), 1);
    let name = written[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("trm_data_") && name.ends_with(".json"));

    let bundle: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(bundle["records"].as_array().unwrap().len(), 4);
    assert_eq!(bundle["strategies"][0], "rule-based");
    assert!(result.message.contains("Exported 4 records"));
}

#[tokio::test]
async fn test_metrics_and_filter_use_session_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_inventory(dir.path());
    let mut executor = executor();
    executor.execute(classify(&input, None, OutputFormat::Text)).await.unwrap();

    let metrics = executor
        .execute(Commands::Metrics {
            input: None,
            format: OutputFormat::Text,
        })
        .await
        .unwrap();
    assert!(metrics.message.contains("Risk summary (4 records)"));
    assert!(metrics.message.contains("Missing vendor: 1"));
    assert_eq!(metrics.data.unwrap()["statistics"]["unique_vendors"], 3);

    let filtered = executor
        .execute(Commands::Filter {
            input: None,
            search: None,
            domain: None,
            status: None,
            risk: Some("High-Risk".to_string()),
            format: OutputFormat::Json,
        })
        .await
        .unwrap();
    let data = filtered.data.unwrap();
    assert_eq!(data["matched"], 2);
    assert_eq!(data["records"][0]["product_name"], "Calc");
    assert_eq!(data["records"][1]["product_name"], "OldVPN");
    assert_eq!(data["options"]["domains"][0], "All");
}

#[tokio::test]
async fn test_metrics_without_dataset_fails() {
    let mut executor = executor();
    let result = executor
        .execute(Commands::Metrics {
            input: None,
            format: OutputFormat::Text,
        })
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_metrics_with_raw_input_classifies_first() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_inventory(dir.path());
    let mut executor = executor();

    let result = executor
        .execute(Commands::Metrics {
            input: Some(input),
            format: OutputFormat::Json,
        })
        .await
        .unwrap();

    let data: serde_json::Value = serde_json::from_str(&result.message).unwrap();
    assert_eq!(data["metrics"]["unclassified_count"], 1);
    assert_eq!(data["metrics"]["total"], 4);
    assert!(executor.dataset().unwrap().iter().all(|r| r.risk_level.is_some()));
}

#[tokio::test]
async fn test_metrics_input_repairs_stored_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("classified.json");
    std::fs::write(
        &input,
        r#"[
            {"Product Name": "Fortigate", "Vendor": "Fortinet", "TRM Domain": "Security", "TRM Subdomain": "Firewalling"},
            {"Product Name": "Qiskit", "Vendor": "IBM", "TRM Domain": "Quantum", "TRM Subdomain": "Qubits"}
        ]"#,
    )
    .unwrap();
    let mut executor = executor();

    let result = executor
        .execute(Commands::Metrics {
            input: Some(input),
            format: OutputFormat::Json,
        })
        .await
        .unwrap();

    let data = result.data.unwrap();
    assert_eq!(data["metrics"]["counts"]["Normal"], 1);
    assert_eq!(data["metrics"]["counts"]["High-Risk"], 1);
    assert_eq!(data["metrics"]["unclassified_count"], 1);

    let dataset = executor.dataset().unwrap();
    assert_eq!(dataset[0].subdomain.as_deref(), Some("Security Tools"));
    assert_eq!(dataset[1].domain.as_deref(), Some("Unclassified"));
    assert_eq!(dataset[1].risk_level, Some(RiskLevel::HighRisk));
}

#[tokio::test]
async fn test_taxonomy_and_info() {
    let mut executor = executor();

    let taxonomy = executor
        .execute(Commands::Taxonomy {
            format: OutputFormat::Text,
        })
        .await
        .unwrap();
    assert!(taxonomy.message.contains("Security: Security Tools, Authentication, Encryption"));
    assert_eq!(taxonomy.data.unwrap()["domains"][0]["name"], "Data Management");

    let info = executor.execute(Commands::Info).await.unwrap();
    let data = info.data.unwrap();
    assert_eq!(data["name"], "trm-cli");
    assert_eq!(data["model_configured"], false);
    assert_eq!(data["strategies"][1], "llm-based");
}

#[tokio::test]
async fn test_custom_taxonomy_file() {
    let dir = tempfile::tempdir().unwrap();
    let taxonomy_path = dir.path().join("taxonomy.json");
    std::fs::write(
        &taxonomy_path,
        r#"{"version": "lab-1", "domains": [
            {"name": "Tools", "subdomains": ["Calculators"], "keywords": ["calculator"]},
            {"name": "Unclassified", "subdomains": ["Unclassified"]}
        ]}"#,
    )
    .unwrap();
    let input = write_inventory(dir.path());

    let cli = Cli::try_parse_from(["trm", "--taxonomy", taxonomy_path.to_str().unwrap(), "info"]).unwrap();
    let mut executor = CommandExecutor::from_cli(&cli).unwrap();
    executor.execute(classify(&input, None, OutputFormat::Text)).await.unwrap();

    let dataset = executor.dataset().unwrap();
    assert_eq!(dataset[2].domain.as_deref(), Some("Tools"));
    assert_eq!(dataset[2].subdomain.as_deref(), Some("Calculators"));
    assert_eq!(dataset[0].domain.as_deref(), Some("Unclassified"));

    let bad = Cli::try_parse_from(["trm", "--taxonomy", "/nonexistent/taxonomy.json", "info"]).unwrap();
    assert!(CommandExecutor::from_cli(&bad).is_err());
}

#[tokio::test]
async fn test_interactive_session_reuses_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_inventory(dir.path());
    let mut session = InteractiveSession::new(executor());

    let line = format!("classify --input '{}'", input.display());
    assert!(session.execute_line(&line).await.unwrap().is_some());

    let first = session.execute_line("filter --status Beta -f json").await.unwrap().unwrap();
    assert_eq!(first.data.unwrap()["matched"], 1);

    let second = session.execute_line("filter --search POSTGRES --domain 'Data Management'").await.unwrap().unwrap();
    assert!(second.message.starts_with("1 of 4 records match"));

    assert_eq!(session.executor().dataset().unwrap().len(), 4);
}
