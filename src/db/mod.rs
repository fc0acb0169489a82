pub mod connection;
pub mod resolver;

#[cfg(test)]
pub(crate) mod fake;

pub use connection::*;
pub use resolver::*;
