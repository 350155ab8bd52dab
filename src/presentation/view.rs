use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;
use std::io::Write;

use crate::models::{CanonicalRecord, IngestStats};
use crate::query::{ComparisonQuery, FilterOptions, SummaryMetrics};
use crate::storage::{CanonicalDataset, records_to_dataframe};

/// Canonical column -> label shown to the user.
const DISPLAY_LABELS: [(&str, &str); 5] = [
    ("product_name", "Product"),
    ("brand", "Brand"),
    ("category", "Category"),
    ("price", "Price (₹)"),
    ("source", "Store"),
];

const NOT_AVAILABLE: &str = "N/A";

/// Everything the result screen shows for one query.
#[derive(Debug, Serialize)]
pub struct ComparisonView<'a> {
    pub category: String,
    pub brand: String,
    pub search: Option<String>,
    pub products: Vec<&'a CanonicalRecord>,
    pub metrics: SummaryMetrics,
}

impl<'a> ComparisonView<'a> {
    pub fn build(query: &ComparisonQuery, dataset: &'a CanonicalDataset) -> Self {
        let products = query.run(dataset.records());
        let metrics = SummaryMetrics::from_records(&products);

        Self {
            category: query.category.to_string(),
            brand: query.brand.to_string(),
            search: query.search.clone(),
            products,
            metrics,
        }
    }

    /// Result rows under their display labels.
    pub fn table(&self) -> Result<DataFrame> {
        let mut df = records_to_dataframe(self.products.iter().copied())?;
        for (column, label) in DISPLAY_LABELS {
            df.rename(column, label.into())?;
        }
        Ok(df)
    }
}

pub fn render_comparison<W: Write>(out: &mut W, view: &ComparisonView<'_>) -> Result<()> {
    writeln!(out, "Best Price Available")?;
    if view.products.is_empty() {
        writeln!(out, "No products match the current filters.")?;
    } else {
        writeln!(out, "{}", view.table()?)?;
    }

    writeln!(out)?;
    writeln!(out, "Platform Overview")?;
    writeln!(out, "Total Products: {}", view.metrics.total_products)?;
    writeln!(out, "Lowest Price (₹): {}", price_or_na(view.metrics.lowest_price))?;
    writeln!(out, "Highest Price (₹): {}", price_or_na(view.metrics.highest_price))?;
    Ok(())
}

pub fn render_comparison_json<W: Write>(out: &mut W, view: &ComparisonView<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, view)?;
    writeln!(out)?;
    Ok(())
}

pub fn render_options<W: Write>(out: &mut W, options: &FilterOptions) -> Result<()> {
    writeln!(out, "Select Category: {}", options.categories.join(", "))?;
    writeln!(out, "Select Brand: {}", options.brands.join(", "))?;
    Ok(())
}

pub fn render_report<W: Write>(out: &mut W, dataset: &CanonicalDataset, epoch: u64) -> Result<()> {
    writeln!(
        out,
        "Canonical dataset: {} records (cache epoch {}, loaded {})",
        dataset.len(),
        epoch,
        dataset.loaded_at().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    if dataset.is_empty() {
        writeln!(out, "No usable records; check the source files below.")?;
    }
    writeln!(out, "{}", stats_table(dataset.stats())?)?;
    Ok(())
}

fn stats_table(stats: &[IngestStats]) -> Result<DataFrame> {
    let count = |f: fn(&IngestStats) -> usize| -> Vec<u64> {
        stats.iter().map(|s| f(s) as u64).collect()
    };

    let columns: Vec<Column> = vec![
        Series::new("file".into(), stats.iter().map(|s| s.file.as_str()).collect::<Vec<_>>()).into(),
        Series::new("store".into(), stats.iter().map(|s| s.source.as_str()).collect::<Vec<_>>()).into(),
        Series::new("category".into(), stats.iter().map(|s| s.category.as_str()).collect::<Vec<_>>()).into(),
        Series::new("rows_read".into(), count(|s| s.rows_read)).into(),
        Series::new("malformed_skipped".into(), count(|s| s.malformed_rows_skipped)).into(),
        Series::new("dropped".into(), count(|s| s.rows_dropped)).into(),
        Series::new("kept".into(), count(|s| s.rows_kept)).into(),
        Series::new("missing".into(), stats.iter().map(|s| s.missing).collect::<Vec<_>>()).into(),
    ];

    Ok(DataFrame::new(columns)?)
}

fn price_or_na(price: Option<i64>) -> String {
    price.map_or_else(|| NOT_AVAILABLE.to_string(), |p| p.to_string())
}
