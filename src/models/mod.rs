pub mod config;
pub mod inference;
pub mod table;

pub use config::*;
pub use inference::*;
pub use table::*;
