//! Ticket persistence.
//!
//! Every store must make [`TicketStore::allocate`] linearizable per
//! (department, service day): reading the highest waiting sequence number and
//! inserting the next one happen as one step. [`TicketStore::reset_waiting`]
//! takes part in the same exclusion so a reset never interleaves with an
//! allocation for that department and day.

mod memory_store;
mod pg_store;

pub use memory_store::InMemoryTicketStore;
pub use pg_store::PgTicketStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::queue::models::{NewTicket, Ticket, TicketStatus};

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Number and insert a waiting ticket.
    ///
    /// The sequence number is one past the highest number among the
    /// department's waiting tickets on `ticket.service_date`, or 1.
    /// Returns `Conflict` if the number was taken concurrently.
    async fn allocate(&self, ticket: NewTicket) -> Result<Ticket>;

    async fn find(&self, id: Uuid) -> Result<Option<Ticket>>;

    /// Move a waiting ticket to a terminal status.
    ///
    /// `NotFound` if the ticket does not exist, `InvalidTransition` if it is
    /// already terminal; neither case writes anything.
    async fn transition(&self, id: Uuid, next: TicketStatus, at: DateTime<Utc>) -> Result<Ticket>;

    /// Delete the department's waiting tickets of `day`, returning how many went
    async fn reset_waiting(&self, department_id: i64, day: NaiveDate) -> Result<u64>;

    async fn count_waiting(
        &self,
        department_id: i64,
        transaction_id: i64,
        day: NaiveDate,
    ) -> Result<i64>;

    /// Mean whole-minute service time of `completed` tickets created since `since`
    async fn average_service_minutes(
        &self,
        department_id: i64,
        transaction_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Option<f64>>;

    /// All tickets of a department ordered by sequence number
    async fn list_by_department(&self, department_id: i64) -> Result<Vec<Ticket>>;

    /// `successful`/`failed` tickets of a department, most recently completed first
    async fn list_history(&self, department_id: i64) -> Result<Vec<Ticket>>;
}
