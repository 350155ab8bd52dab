pub mod best_price;
pub mod comparison;
pub mod filter;

pub use best_price::*;
pub use comparison::*;
pub use filter::*;
