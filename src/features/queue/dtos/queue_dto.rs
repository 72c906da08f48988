use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::catalog::{Department, Transaction};
use crate::features::queue::models::{Ticket, TicketSource, TicketStatus};
use crate::features::queue::services::IssuedTicket;

/// Request DTO for issuing a ticket at a kiosk or from the web
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct GenerateTicketDto {
    #[validate(
        required(message = "department_id is required"),
        range(min = 1, message = "department_id must be a positive id")
    )]
    pub department_id: Option<i64>,

    #[validate(
        required(message = "transaction_id is required"),
        range(min = 1, message = "transaction_id must be a positive id")
    )]
    pub transaction_id: Option<i64>,

    /// Seniors, PWD and pregnant clients
    #[serde(default)]
    pub priority: bool,

    /// Defaults to `kiosk`
    #[serde(default)]
    pub source: TicketSource,
}

/// Projected wait for the next person in line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WaitEstimateDto {
    pub minutes: i64,
    /// e.g. `1 hour 30 minutes`
    pub formatted: String,
}

/// Response DTO for a freshly issued ticket
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedTicketDto {
    pub queue_id: Uuid,
    /// Display code, e.g. `TRE#007`
    pub queue_number: String,
    pub sequence_number: i32,
    pub status: TicketStatus,
    pub department: Department,
    pub transaction: Transaction,
    pub estimated_wait_time: WaitEstimateDto,
    pub priority: bool,
    pub source: TicketSource,
    pub timestamp: DateTime<Utc>,
}

impl GeneratedTicketDto {
    pub fn new(issued: IssuedTicket, estimated_wait_time: WaitEstimateDto) -> Self {
        let IssuedTicket {
            ticket,
            department,
            transaction,
        } = issued;

        Self {
            queue_id: ticket.id,
            queue_number: ticket.display_code,
            sequence_number: ticket.sequence_number,
            status: ticket.status,
            department,
            transaction,
            estimated_wait_time,
            priority: ticket.priority,
            source: ticket.source,
            timestamp: ticket.created_at,
        }
    }
}

/// Request DTO for `waiting -> completed`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CompleteTicketDto {
    #[validate(required(message = "queue_id is required"))]
    pub queue_id: Option<Uuid>,
}

/// Request DTO for recording a service outcome
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusDto {
    #[validate(required(message = "queue_id is required"))]
    pub queue_id: Option<Uuid>,

    /// `successful` or `failed`
    #[validate(required(message = "status is required"))]
    pub status: Option<String>,
}

/// Query parameters for a stand-alone wait estimate
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct EstimateQuery {
    pub department_id: i64,
    pub transaction_id: i64,
}

/// Response DTO for a ticket after a transition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketResponseDto {
    pub id: Uuid,
    pub department_id: i64,
    pub transaction_id: i64,
    pub sequence_number: i32,
    pub queue_number: String,
    pub status: TicketStatus,
    pub priority: bool,
    pub source: TicketSource,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Ticket> for TicketResponseDto {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            department_id: t.department_id,
            transaction_id: t.transaction_id,
            sequence_number: t.sequence_number,
            queue_number: t.display_code,
            status: t.status,
            priority: t.priority,
            source: t.source,
            created_at: t.created_at,
            completed_at: t.completed_at,
        }
    }
}

/// One row of a department's queue listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueEntryDto {
    pub id: Uuid,
    pub department_id: i64,
    pub sequence_number: i32,
    pub queue_number: String,
    pub status: TicketStatus,
    pub priority: bool,
    pub source: TicketSource,
    pub transaction_id: i64,
    /// `None` when the transaction is no longer in the catalog
    pub transaction_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QueueEntryDto {
    pub fn from_ticket(t: Ticket, transaction_name: Option<String>) -> Self {
        Self {
            id: t.id,
            department_id: t.department_id,
            sequence_number: t.sequence_number,
            queue_number: t.display_code,
            status: t.status,
            priority: t.priority,
            source: t.source,
            transaction_id: t.transaction_id,
            transaction_name,
            created_at: t.created_at,
            completed_at: t.completed_at,
        }
    }
}

/// One finished ticket in the department history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueHistoryEntryDto {
    pub id: Uuid,
    pub sequence_number: i32,
    pub queue_number: String,
    pub status: TicketStatus,
    pub source: TicketSource,
    pub transaction_name: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QueueHistoryEntryDto {
    pub fn from_ticket(t: Ticket, transaction_name: Option<String>) -> Self {
        Self {
            id: t.id,
            sequence_number: t.sequence_number,
            queue_number: t.display_code,
            status: t.status,
            source: t.source,
            transaction_name,
            completed_at: t.completed_at,
        }
    }
}

/// Response DTO for a department reset
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetQueueResponseDto {
    pub department_id: i64,
    /// Waiting tickets removed from today's queue
    pub deleted: u64,
}
