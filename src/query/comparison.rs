use serde::Serialize;

use crate::models::CanonicalRecord;
use crate::query::{Selection, best_prices, filter_by_brand, filter_by_category, search_by_name};

/// One user request against the canonical dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonQuery {
    pub category: Selection,
    pub brand: Selection,
    pub search: Option<String>,
}

impl ComparisonQuery {
    /// Category filter, brand filter, best-price reduction, then search.
    /// The search narrows the reduced list, never the raw listings.
    pub fn run<'a>(&self, records: &'a [CanonicalRecord]) -> Vec<&'a CanonicalRecord> {
        let filtered = filter_by_brand(filter_by_category(records, &self.category), &self.brand);
        let comparison = best_prices(filtered);

        match self.search.as_deref() {
            Some(search) => search_by_name(comparison, search),
            None => comparison,
        }
    }
}

/// Headline numbers for a result set. Prices are truncated to whole rupees
/// and absent when the result set is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryMetrics {
    pub total_products: usize,
    pub lowest_price: Option<i64>,
    pub highest_price: Option<i64>,
}

impl SummaryMetrics {
    pub fn from_records(records: &[&CanonicalRecord]) -> Self {
        let lowest = records.iter().map(|r| r.price).min_by(f64::total_cmp);
        let highest = records.iter().map(|r| r.price).max_by(f64::total_cmp);

        Self {
            total_products: records.len(),
            lowest_price: lowest.map(|p| p.trunc() as i64),
            highest_price: highest.map(|p| p.trunc() as i64),
        }
    }
}
