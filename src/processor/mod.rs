pub mod aggregator;
pub mod price_sanitizer;
pub mod schema_normalizer;

pub use aggregator::*;
pub use price_sanitizer::*;
pub use schema_normalizer::*;
