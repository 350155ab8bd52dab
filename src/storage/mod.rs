pub mod canonical_dataset;
pub mod catalog_cache;

pub use canonical_dataset::*;
pub use catalog_cache::*;
