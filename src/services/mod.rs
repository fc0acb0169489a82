pub mod generator;

pub use generator::GeneratorService;
