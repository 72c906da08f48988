use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{CURRENTLY_SERVING_KEY_PREFIX, LATEST_ISSUED_KEY_PREFIX};

/// Which display signal of a department
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// Ticket a staff terminal is serving right now
    CurrentlyServing,
    /// Most recent ticket handed out by a kiosk or the web
    LatestIssued,
}

impl SignalKind {
    pub fn cache_key(self, department_id: i64) -> String {
        let prefix = match self {
            SignalKind::CurrentlyServing => CURRENTLY_SERVING_KEY_PREFIX,
            SignalKind::LatestIssued => LATEST_ISSUED_KEY_PREFIX,
        };
        format!("{}_{}", prefix, department_id)
    }
}

/// Display signal stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QueueSignal {
    pub department_id: i64,
    /// Display code of the ticket, e.g. `TRE#007`
    pub queue_number: String,
    pub transaction_name: Option<String>,
    pub priority: bool,
    pub timestamp: DateTime<Utc>,
}
