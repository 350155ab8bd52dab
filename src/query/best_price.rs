use std::collections::HashMap;

use crate::models::CanonicalRecord;

/// Keep the cheapest listing per product name, ordered by ascending price.
///
/// Within a group the first minimal record in input order wins, so listings
/// from earlier sources take precedence on equal prices. Groups with the same
/// best price are ordered by product name.
pub fn best_prices<'a>(
    records: impl IntoIterator<Item = &'a CanonicalRecord>,
) -> Vec<&'a CanonicalRecord> {
    let mut best: Vec<&CanonicalRecord> = Vec::new();
    let mut slot_by_name: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match slot_by_name.get(record.product_name.as_str()) {
            Some(&slot) => {
                if record.price < best[slot].price {
                    best[slot] = record;
                }
            }
            None => {
                slot_by_name.insert(record.product_name.as_str(), best.len());
                best.push(record);
            }
        }
    }

    best.sort_by(|a, b| {
        a.price
            .total_cmp(&b.price)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn listing(name: &str, price: f64, source: &str) -> CanonicalRecord {
        CanonicalRecord {
            product_name: name.to_string(),
            brand: None,
            category: "Electronics".to_string(),
            price,
            source: source.to_string(),
        }
    }

    #[test]
    fn test_cheapest_listing_wins() {
        let records = vec![
            listing("phone x", 10000.0, "Amazon"),
            listing("phone x", 9500.0, "Flipkart"),
        ];

        let best = best_prices(&records);

        assert_eq!(best.len(), 1);
        assert_eq!(best[0].source, "Flipkart");
        assert_eq!(best[0].price, 9500.0);
    }

    #[test]
    fn test_ties_keep_earliest_listing() {
        let records = vec![
            listing("smart tv", 30000.0, "Croma"),
            listing("smart tv", 30000.0, "Reliance Digital"),
            listing("smart tv", 31000.0, "Amazon"),
        ];

        let best = best_prices(&records);
        assert_eq!(best[0].source, "Croma");
    }

    #[test]
    fn test_one_record_per_name_sorted_by_price() {
        let records = vec![
            listing("laptop", 45000.0, "Amazon"),
            listing("earbuds", 1999.0, "Amazon"),
            listing("laptop", 44000.0, "Flipkart"),
            listing("mouse", 499.0, "Croma"),
            listing("earbuds", 2099.0, "Croma"),
            listing("cable", 499.0, "Amazon"),
        ];

        let best = best_prices(&records);

        let names: HashSet<&str> = best.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names.len(), best.len());

        let ordered: Vec<(&str, f64)> = best
            .iter()
            .map(|r| (r.product_name.as_str(), r.price))
            .collect();
        assert_eq!(
            ordered,
            vec![
                ("cable", 499.0),
                ("mouse", 499.0),
                ("earbuds", 1999.0),
                ("laptop", 44000.0),
            ]
        );
    }

    #[test]
    fn test_group_minimum_for_every_product() {
        let records = vec![
            listing("a", 5.0, "Amazon"),
            listing("b", 7.0, "Amazon"),
            listing("a", 3.0, "Croma"),
            listing("b", 9.0, "Croma"),
            listing("a", 4.0, "Flipkart"),
        ];

        for chosen in best_prices(&records) {
            let minimum = records
                .iter()
                .filter(|r| r.product_name == chosen.product_name)
                .map(|r| r.price)
                .fold(f64::INFINITY, f64::min);
            assert_eq!(chosen.price, minimum);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(best_prices(&[]).is_empty());
    }
}
