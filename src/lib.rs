pub mod cli;
pub mod coerce;
pub mod decoder;
pub mod error;
pub mod header;
pub mod io_utils;
pub mod query;
pub mod quote;
pub mod record;
pub mod table;

pub use decoder::{Decoder, decode_reader};
pub use error::{DecodeError, TypeMismatchError};
pub use record::{Field, Kind, Record};

use std::{env, sync::OnceLock, time::Duration};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::{
    cli::{Cli, Commands, OutputArgs, OutputFormat},
    query::Query,
    quote::Quote,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_quotes", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Decode(args) => handle_decode(&args),
        Commands::Fetch(args) => handle_fetch(&args),
    }
}

fn handle_decode(args: &cli::DecodeArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Decoding '{}' as {}",
        args.input.display(),
        encoding.name()
    );
    let input = io_utils::open_input(&args.input)?;
    let mut quotes = Vec::new();
    let outcome = Decoder::new(input)
        .with_encoding(encoding)
        .decode::<Quote>(&mut quotes);
    accept_outcome(outcome, &args.output)
        .with_context(|| format!("Decoding quotes from {:?}", args.input))?;
    emit_quotes(&quotes, &args.output)
}

fn handle_fetch(args: &cli::FetchArgs) -> Result<()> {
    let query = match (args.date, args.start, args.end) {
        (Some(date), _, _) => Query::date(date),
        (None, Some(start), Some(end)) => Query::range(start, end),
        _ => bail!("Either --date or both --start and --end must be given"),
    }
    .key(args.key.as_str())
    .base_url(args.base_url.as_str());

    let url = query.url()?;
    if args.dry_run {
        println!("{url}");
        return Ok(());
    }

    info!("Fetching quotes for '{}' from {}", args.key, url);
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .context("Building HTTP client")?;
    let mut quotes = Vec::new();
    match query.get::<Quote>(&client, &mut quotes) {
        Ok(()) => {}
        Err(query::QueryError::Decode(err)) => accept_outcome(Err(err), &args.output)
            .with_context(|| format!("Decoding quotes from {url}"))?,
        Err(err) => return Err(err).with_context(|| format!("Fetching quotes for '{}'", args.key)),
    }
    emit_quotes(&quotes, &args.output)
}

/// Type mismatches leave the records in place; they only fail in strict mode.
fn accept_outcome(outcome: Result<(), DecodeError>, output: &OutputArgs) -> Result<()> {
    match outcome {
        Ok(()) => Ok(()),
        Err(DecodeError::TypeMismatch(mismatch)) if !output.strict => {
            warn!("Some values could not be decoded; first: {mismatch}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn emit_quotes(quotes: &[Quote], output: &OutputArgs) -> Result<()> {
    let shown = &quotes[..output.limit.unwrap_or(quotes.len()).min(quotes.len())];
    match output.format {
        OutputFormat::Table => {
            let rows = shown.iter().map(Quote::cells).collect::<Vec<_>>();
            table::print_table(&Quote::headers(), &rows);
        }
        OutputFormat::Json => {
            let rendered =
                serde_json::to_string_pretty(shown).context("Serializing quotes as JSON")?;
            println!("{rendered}");
        }
    }
    info!("Displayed {} of {} quote(s)", shown.len(), quotes.len());
    Ok(())
}
