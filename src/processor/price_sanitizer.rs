use polars::prelude::*;

use crate::error::Result;

pub const RUPEE_SYMBOL: &str = "₹";

/// Parse a currency-formatted price. The value is rendered as text first so
/// numeric and string inputs share one path; the rupee symbol and every comma
/// are removed before parsing. Anything that still fails to parse is `None`.
pub fn sanitize_price<T: ToString + ?Sized>(raw: &T) -> Option<f64> {
    let cleaned = raw.to_string().replace(RUPEE_SYMBOL, "").replace(',', "");

    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub struct PriceSanitizer;

impl PriceSanitizer {
    /// Replace `col_name` with a Float64 column of sanitized prices.
    /// Returns how many non-null cells could not be parsed.
    pub fn sanitize_column(&self, df: &mut DataFrame, col_name: &str) -> Result<usize> {
        let as_text = df.column(col_name)?.cast(&DataType::String)?;

        let mut unparseable = 0;
        let parsed: Vec<Option<f64>> = as_text
            .str()?
            .into_iter()
            .map(|cell| {
                let value = cell.and_then(|s| sanitize_price(s));
                if cell.is_some() && value.is_none() {
                    unparseable += 1;
                }
                value
            })
            .collect();

        df.with_column(Series::new(col_name.into(), parsed))?;

        Ok(unparseable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_strings() {
        assert_eq!(sanitize_price("₹1,23,456"), Some(123456.0));
        assert_eq!(sanitize_price("₹10,000"), Some(10000.0));
        assert_eq!(sanitize_price("9,500"), Some(9500.0));
        assert_eq!(sanitize_price(" ₹ 799.50 "), Some(799.5));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(sanitize_price("N/A"), None);
        assert_eq!(sanitize_price(""), None);
        assert_eq!(sanitize_price("₹"), None);
        assert_eq!(sanitize_price("Rs. 500"), None);
        assert_eq!(sanitize_price("nan"), None);
        assert_eq!(sanitize_price("inf"), None);
    }

    #[test]
    fn test_numeric_inputs_take_the_text_path() {
        assert_eq!(sanitize_price(&9500.0_f64), Some(9500.0));
        assert_eq!(sanitize_price(&42_i64), Some(42.0));
    }

    #[test]
    fn test_negative_prices_are_not_validated() {
        assert_eq!(sanitize_price("-1,000"), Some(-1000.0));
    }

    #[test]
    fn test_sanitize_column() {
        let mut df = DataFrame::new(vec![
            Series::new(
                "price".into(),
                vec![Some("₹10,000"), Some("N/A"), None, Some("9,500")],
            )
            .into(),
        ])
        .unwrap();

        let unparseable = PriceSanitizer.sanitize_column(&mut df, "price").unwrap();

        assert_eq!(unparseable, 1);
        let prices: Vec<Option<f64>> = df
            .column("price")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(prices, vec![Some(10000.0), None, None, Some(9500.0)]);
    }

    #[test]
    fn test_sanitize_numeric_column() {
        let mut df = DataFrame::new(vec![
            Series::new("price".into(), vec![Some(1299.0_f64), None]).into(),
        ])
        .unwrap();

        PriceSanitizer.sanitize_column(&mut df, "price").unwrap();

        let prices: Vec<Option<f64>> = df
            .column("price")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(prices, vec![Some(1299.0), None]);
    }
}
