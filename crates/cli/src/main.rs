//! variantgen - expand product options into variant drafts.
//!
//! Commands:
//! - `variantgen count <input>` - number of combinations, without expanding
//! - `variantgen preview <input>` - count checked against the configured ceiling
//! - `variantgen generate <input>` - variant drafts with names and SKUs
//! - `variantgen key <name>...` - normalized option keys

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use storefront_cli::commands;
use storefront_cli::config::CliConfig;
use storefront_cli::input::ProductDefinition;
use storefront_observability::LogFormat;
use storefront_products::CombinationLimit;

/// Expand product options into sellable variant drafts
#[derive(Parser)]
#[command(name = "variantgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file path (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Log format: json, pretty or compact
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count combinations without generating them
    Count(InputArgs),

    /// Check the combination count against the ceiling
    Preview(GenerateArgs),

    /// Generate variant drafts
    Generate(GenerateArgs),

    /// Print the normalized key for option names
    Key {
        /// Option names as typed by an operator
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Product definition JSON file ("-" reads stdin)
    input: PathBuf,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Override the combination ceiling
    #[arg(long)]
    limit: Option<u64>,
}

impl GenerateArgs {
    fn limit(&self, config: &CliConfig) -> Result<CombinationLimit> {
        match self.limit {
            Some(limit) => CombinationLimit::new(limit).context("invalid --limit"),
            None => Ok(config.generator.max_combinations),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::resolve(cli.config.as_deref())?;
    let log_format = cli.log_format.unwrap_or(config.logging.format);
    storefront_observability::init_with(log_format);

    tracing::debug!(
        config = ?cli.config,
        max_combinations = config.generator.max_combinations.get(),
        log_format = ?log_format,
        "configuration resolved"
    );

    match &cli.command {
        Commands::Count(args) => {
            tracing::info!(command = "count", input = %args.input.display(), "running command");
            let def = ProductDefinition::read(&args.input)?;
            let report = commands::count(&def)?;
            emit(cli.json, &report, || {
                format!(
                    "{} options, {} combinations",
                    report.options, report.combinations
                )
            })
        }
        Commands::Preview(args) => {
            let limit = args.limit(&config)?;
            tracing::info!(
                command = "preview",
                input = %args.input.input.display(),
                limit = limit.get(),
                "running command"
            );
            let def = ProductDefinition::read(&args.input.input)?;
            let preview = commands::preview(&def, limit)?;
            emit(cli.json, &preview, || {
                let verdict = if preview.within_limit {
                    "ok"
                } else if preview.combinations == 0 {
                    "nothing to generate"
                } else if !preview.generatable {
                    "an option has no values"
                } else {
                    "exceeds limit"
                };
                format!(
                    "{} combinations (limit {}): {verdict}",
                    preview.combinations, preview.limit
                )
            })
        }
        Commands::Generate(args) => {
            let limit = args.limit(&config)?;
            tracing::info!(
                command = "generate",
                input = %args.input.input.display(),
                limit = limit.get(),
                "running command"
            );
            let def = ProductDefinition::read(&args.input.input)?;
            let variants = commands::generate(&def, limit)
                .with_context(|| format!("cannot generate variants for {}", args.input.input.display()))?;
            emit(cli.json, &variants, || {
                variants
                    .iter()
                    .map(|v| format!("{}\t{}\t{}\t{}", v.sku, v.name, v.price, v.stock))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Commands::Key { names } => {
            tracing::info!(command = "key", names = names.len(), "running command");
            let reports = commands::keys(names);
            emit(cli.json, &reports, || {
                reports
                    .iter()
                    .map(|r| format!("{}\t{}", r.name, r.key))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    }
}

fn emit<T, F>(json: bool, value: &T, text: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}
