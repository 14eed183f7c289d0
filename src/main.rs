//! MQTT ACL Analyzer CLI
//!
//! Parses an ACL file and prints analysis results as JSON, or regenerates
//! canonical ACL text.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mqtt_acl_analyzer::acl::{validate_acl_rules, AclGenerator, AclParser, RuleModel};
use mqtt_acl_analyzer::analytics::AclAnalyzer;
use mqtt_acl_analyzer::AnalyzerConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Analyze Mosquitto ACL files
#[derive(Parser, Debug)]
#[command(name = "mqtt-acl-analyzer")]
#[command(version)]
#[command(about = "Parser and analytics for Mosquitto-style MQTT ACL files", long_about = None)]
struct Args {
    /// Configuration file path (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Enable JSON log format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every analysis view as JSON
    Analyze {
        /// ACL file to analyze
        file: PathBuf,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print validation warnings as JSON
    Validate {
        /// ACL file to validate
        file: PathBuf,
    },
    /// Print the security report as JSON
    Security {
        /// ACL file to assess
        file: PathBuf,
    },
    /// Export the parsed rules as JSON (the input format of `generate`)
    Export {
        /// ACL file to export
        file: PathBuf,

        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse an ACL file and print it back in canonical form
    Format {
        /// ACL file to format
        file: PathBuf,
    },
    /// Generate ACL text from a JSON rule model
    Generate {
        /// JSON file mapping client names to rule lists
        rules: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging on stderr so stdout carries only results
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load configuration
    let config = if let Some(config_path) = &args.config {
        info!(path = %config_path.display(), "Loading configuration from file");
        AnalyzerConfig::from_file(config_path)?
    } else {
        AnalyzerConfig::default()
    };

    let parser = AclParser::new();

    match &args.command {
        Command::Analyze { file, output } => {
            let model = parser.parse_file(file)?;
            let view = AclAnalyzer::with_config(&model, &config.analysis).generate_all();
            write_json(&view, config.output.pretty, output.as_deref())?;
        }
        Command::Validate { file } => {
            let model = parser.parse_file(file)?;
            let warnings = validate_acl_rules(&model);
            for warning in &warnings {
                warn!(client = %warning.client, "{}", warning);
            }
            print_json(&warnings, config.output.pretty)?;
        }
        Command::Security { file } => {
            let model = parser.parse_file(file)?;
            let report = AclAnalyzer::with_config(&model, &config.analysis).security_analysis();
            info!(score = report.security_score, "Security analysis complete");
            print_json(&report, config.output.pretty)?;
        }
        Command::Export { file, output } => {
            let model = parser.parse_file(file)?;
            info!(
                clients = model.client_count(),
                rules = model.rule_count(),
                "Exporting rule model"
            );
            write_json(&model, config.output.pretty, output.as_deref())?;
        }
        Command::Format { file } => {
            let model = parser.parse_file(file)?;
            print!("{}", generate(&model, &config)?);
        }
        Command::Generate { rules } => {
            let model = load_rule_model(rules)?;
            print!("{}", generate(&model, &config)?);
        }
    }

    Ok(())
}

fn generate(model: &RuleModel, config: &AnalyzerConfig) -> Result<String> {
    let generator = AclGenerator::from_config(&config.generator);
    let text = generator.generate(model, config.generator.access_filter.as_deref())?;
    Ok(text)
}

fn load_rule_model(path: &Path) -> Result<RuleModel> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse rules file: {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    println!("{}", to_json(value, pretty)?);
    Ok(())
}

fn write_json<T: Serialize>(value: &T, pretty: bool, output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        return print_json(value, pretty);
    };

    let mut json = to_json(value, pretty)?;
    json.push('\n');
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    info!(path = %path.display(), "Wrote JSON output");
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
