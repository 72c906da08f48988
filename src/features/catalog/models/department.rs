use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A service department (e.g. Treasury) that owns its own queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

/// A transaction type offered by a department (e.g. Business Permit)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: i64,
    pub department_id: i64,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

/// Catalog snapshot loaded from a JSON file when running without a database
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}
