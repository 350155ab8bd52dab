pub mod shell;
pub mod view;

pub use shell::*;
pub use view::*;
