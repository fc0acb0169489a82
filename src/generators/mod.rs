pub mod file_writer;
pub mod php_array;
pub mod validator_class;

pub use file_writer::*;
pub use php_array::*;
pub use validator_class::*;
