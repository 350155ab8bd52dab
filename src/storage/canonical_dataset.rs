use chrono::{DateTime, Utc};
use polars::prelude::*;

use crate::error::Result;
use crate::models::{CANONICAL_COLUMNS, CanonicalRecord, IngestStats};

/// The normalized, immutable table every query runs against.
#[derive(Debug, Clone)]
pub struct CanonicalDataset {
    records: Vec<CanonicalRecord>,
    stats: Vec<IngestStats>,
    loaded_at: DateTime<Utc>,
}

impl CanonicalDataset {
    pub fn new(records: Vec<CanonicalRecord>, stats: Vec<IngestStats>) -> Self {
        Self {
            records,
            stats,
            loaded_at: Utc::now(),
        }
    }

    /// Records in aggregation order: configured source order, then file order.
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn stats(&self) -> &[IngestStats] {
        &self.stats
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Build a frame in the canonical column layout from typed records.
pub fn records_to_dataframe<'a>(
    records: impl Iterator<Item = &'a CanonicalRecord>,
) -> Result<DataFrame> {
    let mut product_names = Vec::new();
    let mut brands = Vec::new();
    let mut categories = Vec::new();
    let mut prices = Vec::new();
    let mut sources = Vec::new();

    for record in records {
        product_names.push(record.product_name.as_str());
        brands.push(record.brand.as_deref());
        categories.push(record.category.as_str());
        prices.push(record.price);
        sources.push(record.source.as_str());
    }

    let [name_col, brand_col, category_col, price_col, source_col] = CANONICAL_COLUMNS;
    let columns: Vec<Column> = vec![
        Series::new(name_col.into(), product_names).into(),
        Series::new(brand_col.into(), brands).into(),
        Series::new(category_col.into(), categories).into(),
        Series::new(price_col.into(), prices).into(),
        Series::new(source_col.into(), sources).into(),
    ];

    Ok(DataFrame::new(columns)?)
}
