use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One row of a source file, keyed by the source's own column headers.
/// Cells holding a missing-value token are absent from the map.
pub type RawRecord = HashMap<String, String>;

/// Canonical fields a source column can be mapped onto. `category` and
/// `source` are never read from rows; they come from the source definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    ProductName,
    Brand,
    Price,
}

impl CanonicalField {
    pub fn column_name(&self) -> &'static str {
        match self {
            CanonicalField::ProductName => "product_name",
            CanonicalField::Brand => "brand",
            CanonicalField::Price => "price",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Canonical projection shared by every normalized frame, in column order.
pub const CANONICAL_COLUMNS: [&str; 5] = ["product_name", "brand", "category", "price", "source"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub product_name: String,
    pub brand: Option<String>,
    pub category: String,
    pub price: f64,
    pub source: String,
}

/// Per-source counters collected while building the canonical dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub file: String,
    pub source: String,
    pub category: String,
    pub rows_read: usize,
    pub malformed_rows_skipped: usize,
    pub rows_dropped: usize,
    pub rows_kept: usize,
    pub missing: bool,
}
