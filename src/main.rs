use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::SourcesConfig;
use presentation::{ComparisonView, Shell};
use query::{ComparisonQuery, FilterOptions, Selection};
use std::io::{self, Write};
use std::path::PathBuf;
use storage::{catalog_cache, shared_catalog};
use tracing::info;

mod config;
mod error;
mod logging;
mod models;
mod presentation;
mod processor;
mod query;
mod reader;
mod storage;

/// Compare electronics prices across retail exports and find the lowest
/// price per product.
#[derive(Debug, Parser)]
#[command(name = "price-aggregator", version)]
struct Cli {
    /// Source table (TOML). Defaults to src/configs/sources.toml, then the
    /// built-in table.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Best price per product after filtering (table rows capped by POLARS_FMT_MAX_ROWS)
    Compare(CompareArgs),
    /// Selectable categories and brands
    Options,
    /// Per-source ingestion counts
    Report,
    /// Interactive filter session
    Shell(FilterArgs),
}

#[derive(Debug, Default, Args)]
struct FilterArgs {
    /// Category to keep, or All
    #[arg(long)]
    category: Option<String>,

    /// Brand to keep, or All
    #[arg(long)]
    brand: Option<String>,

    /// Case-insensitive product name search
    #[arg(long)]
    search: Option<String>,
}

#[derive(Debug, Default, Args)]
struct CompareArgs {
    #[command(flatten)]
    filters: FilterArgs,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl FilterArgs {
    fn into_query(self) -> ComparisonQuery {
        ComparisonQuery {
            category: Selection::from(self.category),
            brand: Selection::from(self.brand),
            search: self.search.filter(|s| !s.is_empty()),
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = SourcesConfig::load(cli.config.as_deref())
        .context("Failed to load source configuration")?;

    info!(
        "Loaded {} sources from {}",
        config.sources.len(),
        config.data_dir.display()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command.unwrap_or(Command::Compare(CompareArgs::default())) {
        Command::Compare(args) => {
            let dataset = shared_catalog(&config).context("Failed to build canonical dataset")?;
            let query = args.filters.into_query();
            let view = ComparisonView::build(&query, &dataset);

            if args.json {
                presentation::render_comparison_json(&mut out, &view)?;
            } else {
                presentation::render_comparison(&mut out, &view)?;
            }
        }
        Command::Options => {
            let dataset = shared_catalog(&config).context("Failed to build canonical dataset")?;
            presentation::render_options(&mut out, &FilterOptions::from_records(dataset.records()))?;
        }
        Command::Report => {
            let dataset = shared_catalog(&config).context("Failed to build canonical dataset")?;
            presentation::render_report(&mut out, &dataset, catalog_cache().epoch())?;
        }
        Command::Shell(args) => {
            let mut shell = Shell::new(&config, catalog_cache(), args.into_query());
            shell.run(io::stdin().lock(), &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
