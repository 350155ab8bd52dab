use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::models::CanonicalRecord;

/// Sentinel that disables a selection filter.
pub const ALL: &str = "All";

/// A dropdown choice: the `All` sentinel or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn parse(value: &str) -> Self {
        if value == ALL {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }

    fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(wanted.as_str()),
        }
    }
}

impl From<Option<String>> for Selection {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Selection::parse).unwrap_or_default()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL),
            Selection::Only(value) => f.write_str(value),
        }
    }
}

pub fn filter_by_category<'a>(
    records: impl IntoIterator<Item = &'a CanonicalRecord>,
    category: &Selection,
) -> Vec<&'a CanonicalRecord> {
    records
        .into_iter()
        .filter(|record| category.admits(Some(record.category.as_str())))
        .collect()
}

/// Records without a brand only survive when the selection is `All`.
pub fn filter_by_brand<'a>(
    records: impl IntoIterator<Item = &'a CanonicalRecord>,
    brand: &Selection,
) -> Vec<&'a CanonicalRecord> {
    records
        .into_iter()
        .filter(|record| brand.admits(record.brand.as_deref()))
        .collect()
}

/// Case-insensitive substring match on the product name. An empty search
/// keeps everything.
pub fn search_by_name<'a>(
    records: impl IntoIterator<Item = &'a CanonicalRecord>,
    search: &str,
) -> Vec<&'a CanonicalRecord> {
    if search.is_empty() {
        return records.into_iter().collect();
    }

    let needle = search.to_lowercase();
    records
        .into_iter()
        .filter(|record| name_contains(Some(record.product_name.as_str()), &needle))
        .collect()
}

fn name_contains(name: Option<&str>, needle: &str) -> bool {
    name.is_some_and(|name| name.contains(needle))
}

/// Values offered by the category and brand selection controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
}

impl FilterOptions {
    /// Sorted distinct values, each list led by the `All` sentinel.
    /// Null brands are not offered.
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        let categories: BTreeSet<&str> = records.iter().map(|r| r.category.as_str()).collect();
        let brands: BTreeSet<&str> = records.iter().filter_map(|r| r.brand.as_deref()).collect();

        Self {
            categories: with_all(categories),
            brands: with_all(brands),
        }
    }
}

fn with_all(values: BTreeSet<&str>) -> Vec<String> {
    std::iter::once(ALL)
        .chain(values)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, brand: Option<&str>, category: &str, price: f64) -> CanonicalRecord {
        CanonicalRecord {
            product_name: name.to_string(),
            brand: brand.map(str::to_string),
            category: category.to_string(),
            price,
            source: "Amazon".to_string(),
        }
    }

    fn dataset() -> Vec<CanonicalRecord> {
        vec![
            record("galaxy s23", Some("Samsung"), "Mobile", 74999.0),
            record("ideapad 3", Some("Lenovo"), "Laptop", 45000.0),
            record("galaxy buds", Some("Samsung"), "Earphones", 8999.0),
            record("generic cable", None, "Electronics", 199.0),
            record("galaxy tab", Some("Samsung"), "Electronics", 21999.0),
        ]
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!(Selection::parse("All"), Selection::All);
        assert_eq!(Selection::parse("all"), Selection::Only("all".to_string()));
        assert_eq!(Selection::from(None::<String>), Selection::All);
        assert_eq!(Selection::from(Some("Mobile".to_string())).to_string(), "Mobile");
    }

    #[test]
    fn test_category_filter_is_exact() {
        let data = dataset();

        assert_eq!(filter_by_category(&data, &Selection::All).len(), 5);
        let mobiles = filter_by_category(&data, &Selection::parse("Mobile"));
        assert_eq!(mobiles.len(), 1);
        assert_eq!(mobiles[0].product_name, "galaxy s23");
        assert!(filter_by_category(&data, &Selection::parse("mobile")).is_empty());
    }

    #[test]
    fn test_brand_filter_excludes_null_brands_only_when_selected() {
        let data = dataset();

        assert_eq!(filter_by_brand(&data, &Selection::All).len(), 5);
        let samsung = filter_by_brand(&data, &Selection::parse("Samsung"));
        assert_eq!(samsung.len(), 3);
        assert!(samsung.iter().all(|r| r.brand.as_deref() == Some("Samsung")));
    }

    #[test]
    fn test_equality_filters_commute() {
        let data = dataset();
        let category = Selection::parse("Electronics");
        let brand = Selection::parse("Samsung");

        let category_first = filter_by_brand(filter_by_category(&data, &category), &brand);
        let brand_first = filter_by_category(filter_by_brand(&data, &brand), &category);

        assert_eq!(category_first, brand_first);
        assert_eq!(category_first.len(), 1);
        assert_eq!(category_first[0].product_name, "galaxy tab");
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let data = dataset();

        let hits = search_by_name(&data, "GALAXY");
        assert_eq!(hits.len(), 3);
        assert_eq!(search_by_name(&data, "").len(), 5);
        assert!(search_by_name(&data, "iphone").is_empty());
    }

    #[test]
    fn test_null_name_never_matches() {
        assert!(!name_contains(None, "phone"));
        assert!(name_contains(Some("phone x"), "phone"));
    }

    #[test]
    fn test_filter_options() {
        let options = FilterOptions::from_records(&dataset());

        assert_eq!(
            options.categories,
            vec!["All", "Earphones", "Electronics", "Laptop", "Mobile"]
        );
        assert_eq!(options.brands, vec!["All", "Lenovo", "Samsung"]);
    }

    #[test]
    fn test_filter_options_on_empty_dataset() {
        let options = FilterOptions::from_records(&[]);

        assert_eq!(options.categories, vec!["All"]);
        assert_eq!(options.brands, vec!["All"]);
    }
}
