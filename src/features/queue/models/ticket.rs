use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::shared::constants::{DISPLAY_PREFIX_LEN, DISPLAY_SEQUENCE_WIDTH};

/// Ticket status enum matching database enum.
///
/// `Waiting` is the only non-terminal state; the other three are distinct
/// terminal variants and are never transitioned out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Waiting,
    Completed,
    Successful,
    Failed,
}

impl TicketStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TicketStatus::Waiting)
    }

    /// Validate a lifecycle step, returning the new status
    pub fn transition_to(self, next: TicketStatus) -> Result<TicketStatus, AppError> {
        match (self, next) {
            (TicketStatus::Waiting, next) if next.is_terminal() => Ok(next),
            (current, next) => Err(AppError::InvalidTransition(format!(
                "Cannot move ticket from '{}' to '{}'",
                current, next
            ))),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Waiting => write!(f, "waiting"),
            TicketStatus::Completed => write!(f, "completed"),
            TicketStatus::Successful => write!(f, "successful"),
            TicketStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome recorded by a staff terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TicketOutcome {
    Successful,
    Failed,
}

impl From<TicketOutcome> for TicketStatus {
    fn from(outcome: TicketOutcome) -> Self {
        match outcome {
            TicketOutcome::Successful => TicketStatus::Successful,
            TicketOutcome::Failed => TicketStatus::Failed,
        }
    }
}

impl FromStr for TicketOutcome {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "successful" => Ok(TicketOutcome::Successful),
            "failed" => Ok(TicketOutcome::Failed),
            other => Err(AppError::InvalidArgument(format!(
                "Invalid status '{}', expected 'successful' or 'failed'",
                other
            ))),
        }
    }
}

/// Where the ticket request came from
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "ticket_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketSource {
    #[default]
    Kiosk,
    Web,
}

/// Database model for a queue ticket
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub department_id: i64,
    pub transaction_id: i64,
    pub sequence_number: i32,
    pub display_code: String,
    pub status: TicketStatus,
    pub priority: bool,
    pub source: TicketSource,
    /// Calendar day of `created_at` in the service offset
    pub service_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Build the row for a freshly numbered ticket
    pub fn issue(draft: NewTicket, sequence_number: i32) -> Self {
        Self {
            id: Uuid::now_v7(),
            department_id: draft.department_id,
            transaction_id: draft.transaction_id,
            sequence_number,
            display_code: display_code(&draft.display_prefix, sequence_number),
            status: TicketStatus::Waiting,
            priority: draft.priority,
            source: draft.source,
            service_date: draft.service_date,
            created_at: draft.created_at,
            completed_at: None,
            updated_at: draft.created_at,
        }
    }

    /// Apply a lifecycle transition in place, stamping `completed_at`
    pub fn apply_transition(&mut self, next: TicketStatus, at: DateTime<Utc>) -> Result<(), AppError> {
        self.status = self.status.transition_to(next)?;
        self.completed_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Minutes from issue to completion, truncated to whole minutes
    pub fn service_minutes(&self) -> Option<i64> {
        self.completed_at
            .map(|completed_at| (completed_at - self.created_at).num_minutes())
    }
}

/// Everything needed to number and insert a ticket
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub department_id: i64,
    pub transaction_id: i64,
    pub display_prefix: String,
    pub priority: bool,
    pub source: TicketSource,
    pub service_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Leading characters of the department name, uppercased (`Treasury` -> `TRE`)
pub fn display_prefix(department_name: &str) -> String {
    department_name
        .trim()
        .chars()
        .take(DISPLAY_PREFIX_LEN)
        .collect::<String>()
        .to_uppercase()
}

/// Human-facing ticket label, e.g. `TRE#007`
pub fn display_code(prefix: &str, sequence_number: i32) -> String {
    format!(
        "{}#{:0width$}",
        prefix,
        sequence_number,
        width = DISPLAY_SEQUENCE_WIDTH
    )
}
