mod memory_catalog;
mod pg_catalog;

pub use memory_catalog::InMemoryCatalog;
pub use pg_catalog::PgCatalog;

use async_trait::async_trait;

use crate::core::error::{AppError, Result};
use crate::features::catalog::models::{Department, Transaction};

/// Read access to the department/transaction catalog
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn find_department(&self, id: i64) -> Result<Option<Department>>;

    async fn find_transaction(&self, id: i64) -> Result<Option<Transaction>>;

    /// All departments, archived ones included, ordered by id
    async fn list_departments(&self) -> Result<Vec<Department>>;

    /// All transactions of a department, archived ones included
    async fn list_transactions(&self, department_id: i64) -> Result<Vec<Transaction>>;
}

/// Look up an active department and one of its active transactions.
///
/// Fails with `NotFound` when either is missing, archived, or the transaction
/// belongs to another department.
pub async fn resolve_service(
    catalog: &dyn Catalog,
    department_id: i64,
    transaction_id: i64,
) -> Result<(Department, Transaction)> {
    let department = catalog
        .find_department(department_id)
        .await?
        .filter(|d| !d.archived)
        .ok_or_else(|| AppError::NotFound(format!("Department '{}' not found", department_id)))?;

    let transaction = catalog
        .find_transaction(transaction_id)
        .await?
        .filter(|t| !t.archived && t.department_id == department.id)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Transaction '{}' not found in department '{}'",
                transaction_id, department_id
            ))
        })?;

    Ok((department, transaction))
}
