pub mod error;
pub mod naming;

pub use error::*;
