use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;

use super::Catalog;
use crate::core::error::{AppError, Result};
use crate::features::catalog::models::{CatalogSeed, Department, Transaction};

/// Fixed catalog held in memory, used with the in-memory ticket store
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    departments: BTreeMap<i64, Department>,
    transactions: BTreeMap<i64, Transaction>,
}

impl InMemoryCatalog {
    pub fn new(departments: Vec<Department>, transactions: Vec<Transaction>) -> Self {
        Self {
            departments: departments.into_iter().map(|d| (d.id, d)).collect(),
            transactions: transactions.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    /// Load a catalog from a JSON file shaped like [`CatalogSeed`]
    pub async fn from_seed_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to read catalog seed '{}': {}",
                path.display(),
                e
            ))
        })?;

        let seed: CatalogSeed = serde_json::from_str(&raw).map_err(|e| {
            AppError::Internal(format!(
                "Invalid catalog seed '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self::new(seed.departments, seed.transactions))
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn find_department(&self, id: i64) -> Result<Option<Department>> {
        Ok(self.departments.get(&id).cloned())
    }

    async fn find_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.transactions.get(&id).cloned())
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        Ok(self.departments.values().cloned().collect())
    }

    async fn list_transactions(&self, department_id: i64) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .values()
            .filter(|t| t.department_id == department_id)
            .cloned()
            .collect())
    }
}
