use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Decode historical quote CSV into typed records", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a quote CSV file (or stdin) and print the records
    Decode(DecodeArgs),
    /// Fetch historical quotes for a symbol and print the records
    Fetch(FetchArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// How to print decoded records
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    /// Print at most this many records
    #[arg(long)]
    pub limit: Option<usize>,
    /// Fail instead of warning when a value cannot be decoded
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Input CSV file ('-' reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("span").required(true).args(["date", "start"])))]
pub struct FetchArgs {
    /// Symbol key such as NASDAQ:GOOG
    #[arg(short, long)]
    pub key: String,
    /// Single trading day (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    /// First day of a range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, requires = "end")]
    pub start: Option<NaiveDate>,
    /// Last day of a range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, requires = "start")]
    pub end: Option<NaiveDate>,
    /// Endpoint serving the CSV export
    #[arg(long = "base-url", default_value = crate::query::DEFAULT_BASE_URL)]
    pub base_url: String,
    /// Request timeout in seconds
    #[arg(long = "timeout-secs", default_value_t = 30)]
    pub timeout_secs: u64,
    /// Print the request URL without fetching it
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got '{value}': {err}"))
}
