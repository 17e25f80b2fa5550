pub mod import;
pub mod seed;

pub use import::import_agencies;
pub use seed::{seed_vectors, SeedReport};
