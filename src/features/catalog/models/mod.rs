mod department;

pub use department::{CatalogSeed, Department, Transaction};
