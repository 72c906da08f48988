//! Department/transaction catalog consumed by the queue.
//!
//! Departments and their transactions are managed elsewhere; the queue only
//! checks that they exist, are not archived, and reads their names.

pub mod models;
pub mod services;

pub use models::{Department, Transaction};
pub use services::{resolve_service, Catalog, InMemoryCatalog, PgCatalog};
