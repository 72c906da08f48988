use async_trait::async_trait;
use sqlx::PgPool;

use super::Catalog;
use crate::core::error::{AppError, Result};
use crate::features::catalog::models::{Department, Transaction};

/// Catalog backed by the `departments` and `transactions` tables
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn find_department(&self, id: i64) -> Result<Option<Department>> {
        sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, archived
            FROM departments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get department by ID: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, department_id, name, archived
            FROM transactions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get transaction by ID: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_departments(&self) -> Result<Vec<Department>> {
        sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, archived
            FROM departments
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list departments: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_transactions(&self, department_id: i64) -> Result<Vec<Transaction>> {
        sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, department_id, name, archived
            FROM transactions
            WHERE department_id = $1
            ORDER BY id
            "#,
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list transactions by department: {:?}", e);
            AppError::Database(e)
        })
    }
}
