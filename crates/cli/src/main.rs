mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use relocost_eval::FilterCriteria;
use rust_decimal::Decimal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use commands::{cmd_check, cmd_eval, cmd_rate, RateArgs};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Relocation cost formula and rate engine.
#[derive(Parser)]
#[command(
    name = "relocost",
    version,
    about = "Relocation cost formula and rate engine"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to relocost.toml (default: ./relocost.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log lookup and rate decisions to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula
    Eval {
        /// Formula text, e.g. "base * LOOKUP('Tiers', 'tier', 'rate', tier)"
        formula: String,
        /// Variable binding name=value (repeatable)
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, Decimal)>,
        /// Table fixture JSON file
        #[arg(long)]
        tables: Option<PathBuf>,
    },

    /// Parse a formula and list the variables and tables it references
    Check {
        /// Formula text
        formula: String,
    },

    /// Resolve the best-matching entries of a rate table
    Rate {
        /// Rate table name
        #[arg(long, conflicts_with = "table_id", required_unless_present = "table_id")]
        table: Option<String>,
        /// Rate table id
        #[arg(long)]
        table_id: Option<String>,
        /// Customer code; its entries replace standard entries
        #[arg(long)]
        customer: Option<String>,
        /// Filter key=value, or key=v1|v2 for a set (repeatable)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<FilterCriteria>,
        /// Effective date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Maximum entries to return (0 = all)
        #[arg(long)]
        limit: Option<usize>,
        /// Tenant whose entries are visible
        #[arg(long)]
        tenant: Option<String>,
        /// Table fixture JSON file
        #[arg(long)]
        tables: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(msg) => {
            report_error(&format!("error: {}", msg), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Eval {
            formula,
            vars,
            tables,
        } => block_on(
            cmd_eval(&formula, vars, tables, &config, cli.output, cli.quiet),
            cli.output,
            cli.quiet,
        ),
        Commands::Check { formula } => cmd_check(&formula, cli.output, cli.quiet),
        Commands::Rate {
            table,
            table_id,
            customer,
            filters,
            date,
            limit,
            tenant,
            tables,
        } => {
            let args = RateArgs {
                table,
                table_id,
                customer,
                filters,
                date,
                limit,
                tenant,
                tables,
            };
            block_on(
                cmd_rate(args, &config, cli.output, cli.quiet),
                cli.output,
                cli.quiet,
            )
        }
    };
    process::exit(code);
}

/// Run an async command on a current-thread runtime and return its exit code.
fn block_on<F>(fut: F, output: OutputFormat, quiet: bool) -> i32
where
    F: std::future::Future<Output = i32>,
{
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt.block_on(fut),
        Err(e) => {
            report_error(
                &format!("error: failed to start runtime: {}", e),
                output,
                quiet,
            );
            1
        }
    }
}

/// Logs go to stderr so `--output json` stays parseable.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("RELOCOST_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_var(s: &str) -> Result<(String, Decimal), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", s));
    }
    let value = relocost_eval::coerce_numeric(value)
        .ok_or_else(|| format!("'{}' is not a number", value.trim()))?;
    Ok((name.to_string(), value))
}

fn parse_filter(s: &str) -> Result<FilterCriteria, String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing filter key in '{}'", s));
    }
    if value.contains('|') {
        let values: Vec<&str> = value.split('|').collect();
        Ok(FilterCriteria::one_of(key, &values))
    } else {
        Ok(FilterCriteria::eq(key, value))
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
