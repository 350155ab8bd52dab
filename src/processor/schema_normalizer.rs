use polars::prelude::*;
use tracing::debug;

use crate::config::SourceSpec;
use crate::error::Result;
use crate::models::{CANONICAL_COLUMNS, CanonicalField, RawRecord};

/// Projects raw source rows onto the canonical frame layout
/// `product_name, brand, category, price, source`.
pub struct SchemaNormalizer;

impl SchemaNormalizer {
    pub fn new() -> Self {
        SchemaNormalizer
    }

    /// Unmapped columns are discarded. A canonical field with no source
    /// column, or an absent cell, becomes null rather than an empty string.
    pub fn normalize(&self, rows: &[RawRecord], spec: &SourceSpec) -> Result<DataFrame> {
        let product_names = self.project(rows, spec, CanonicalField::ProductName);
        let brands = self.project(rows, spec, CanonicalField::Brand);
        let prices = self.project(rows, spec, CanonicalField::Price);

        // Fixed labels always win over any same-named source column
        let categories = vec![spec.category.as_str(); rows.len()];
        let sources = vec![spec.source.as_str(); rows.len()];

        canonical_frame(product_names, brands, categories, prices, sources)
    }

    /// Zero-row frame with the canonical schema.
    pub fn empty_frame(&self) -> Result<DataFrame> {
        canonical_frame(Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    fn project(
        &self,
        rows: &[RawRecord],
        spec: &SourceSpec,
        field: CanonicalField,
    ) -> Vec<Option<String>> {
        match spec.column_for(field) {
            Some(raw_column) => rows.iter().map(|row| row.get(raw_column).cloned()).collect(),
            None => {
                debug!("{} has no column for {}, filling with nulls", spec.file, field);
                vec![None; rows.len()]
            }
        }
    }
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn canonical_frame(
    product_names: Vec<Option<String>>,
    brands: Vec<Option<String>>,
    categories: Vec<&str>,
    prices: Vec<Option<String>>,
    sources: Vec<&str>,
) -> Result<DataFrame> {
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
