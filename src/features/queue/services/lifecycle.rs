use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::catalog::Catalog;
use crate::features::queue::models::{Ticket, TicketOutcome, TicketStatus};
use crate::features::queue::stores::TicketStore;
use crate::shared::calendar::ServiceCalendar;

/// Staff-side ticket transitions and the department queue reset
pub struct TicketLifecycle {
    store: Arc<dyn TicketStore>,
    catalog: Arc<dyn Catalog>,
    calendar: ServiceCalendar,
}

impl TicketLifecycle {
    pub fn new(
        store: Arc<dyn TicketStore>,
        catalog: Arc<dyn Catalog>,
        calendar: ServiceCalendar,
    ) -> Self {
        Self {
            store,
            catalog,
            calendar,
        }
    }

    /// `waiting -> completed`
    pub async fn mark_completed(&self, ticket_id: Uuid) -> Result<Ticket> {
        self.transition(ticket_id, TicketStatus::Completed).await
    }

    /// `waiting -> successful | failed`
    pub async fn mark_outcome(&self, ticket_id: Uuid, outcome: TicketOutcome) -> Result<Ticket> {
        self.transition(ticket_id, outcome.into()).await
    }

    async fn transition(&self, ticket_id: Uuid, next: TicketStatus) -> Result<Ticket> {
        let ticket = self
            .store
            .transition(ticket_id, next, self.calendar.now())
            .await?;

        tracing::info!(
            "Ticket transitioned: id={}, code={}, status={}",
            ticket.id,
            ticket.display_code,
            ticket.status
        );

        Ok(ticket)
    }

    /// Delete today's waiting tickets of a department.
    ///
    /// Terminal tickets and other days are untouched.
    pub async fn reset(&self, department_id: i64) -> Result<u64> {
        self.catalog
            .find_department(department_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Department '{}' not found", department_id))
            })?;

        let deleted = self
            .store
            .reset_waiting(department_id, self.calendar.today())
            .await?;

        tracing::info!(
            "Queue reset: department={}, deleted_waiting={}",
            department_id,
            deleted
        );

        Ok(deleted)
    }
}
