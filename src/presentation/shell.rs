use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::SourcesConfig;
use crate::processor::Aggregator;
use crate::query::{ComparisonQuery, FilterOptions, Selection};
use crate::storage::{CanonicalDataset, CatalogCache};

use super::{ComparisonView, render_comparison, render_options};

const HELP: &str = "\
Commands:
  category <name|All>   filter by category
  brand <name|All>      filter by brand
  search [text]         search product names (no text clears the search)
  options               list selectable categories and brands
  show                  show the current comparison
  reload                rebuild the dataset from the source files
  help                  this message
  quit                  leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Category(Selection),
    Brand(Selection),
    Search(Option<String>),
    Options,
    Show,
    Reload,
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "category" | "c" if !rest.is_empty() => Ok(ShellCommand::Category(Selection::parse(rest))),
            "brand" | "b" if !rest.is_empty() => Ok(ShellCommand::Brand(Selection::parse(rest))),
            "category" | "c" | "brand" | "b" => Err(format!("'{}' needs a value or All", verb)),
            "search" | "s" => Ok(ShellCommand::Search(
                Some(rest.to_string()).filter(|s| !s.is_empty()),
            )),
            "options" | "o" => Ok(ShellCommand::Options),
            "show" | "" => Ok(ShellCommand::Show),
            "reload" => Ok(ShellCommand::Reload),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
            other => Err(format!("unknown command '{}', try 'help'", other)),
        }
    }
}

/// Line-oriented stand-in for the interactive filter screen. Every command
/// re-runs the query against the cached dataset.
pub struct Shell<'a> {
    config: &'a SourcesConfig,
    cache: &'a CatalogCache,
    query: ComparisonQuery,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a SourcesConfig, cache: &'a CatalogCache, query: ComparisonQuery) -> Self {
        Self {
            config,
            cache,
            query,
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "{}", HELP)?;
        self.show(out)?;

        for line in input.lines() {
            let line = line.context("Failed to read shell input")?;
            let command = match ShellCommand::parse(&line) {
                Ok(command) => command,
                Err(message) => {
                    writeln!(out, "{}", message)?;
                    continue;
                }
            };
            debug!("Shell command: {:?}", command);

            if !self.apply(command, out)? {
                break;
            }
        }

        Ok(())
    }

    /// Returns false once the user asks to quit.
    fn apply<W: Write>(&mut self, command: ShellCommand, out: &mut W) -> Result<bool> {
        match command {
            ShellCommand::Category(selection) => {
                self.query.category = selection;
                self.show(out)?;
            }
            ShellCommand::Brand(selection) => {
                self.query.brand = selection;
                self.show(out)?;
            }
            ShellCommand::Search(search) => {
                self.query.search = search;
                self.show(out)?;
            }
            ShellCommand::Options => {
                let dataset = self.dataset()?;
                render_options(out, &FilterOptions::from_records(dataset.records()))?;
            }
            ShellCommand::Show => self.show(out)?,
            ShellCommand::Reload => {
                self.cache.invalidate();
                info!("Reloading canonical dataset");
                self.show(out)?;
            }
            ShellCommand::Help => writeln!(out, "{}", HELP)?,
            ShellCommand::Quit => return Ok(false),
        }

        Ok(true)
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<()> {
        let dataset = self.dataset()?;
        let view = ComparisonView::build(&self.query, &dataset);
        render_comparison(out, &view)
    }

    fn dataset(&self) -> Result<Arc<CanonicalDataset>> {
        let config = self.config;
        self.cache
            .get_or_load(|| Aggregator::new(config).build())
            .context("Failed to load canonical dataset")
    }
}
