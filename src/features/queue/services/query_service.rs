use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::catalog::Catalog;
use crate::features::queue::dtos::{QueueEntryDto, QueueHistoryEntryDto};
use crate::features::queue::models::Ticket;
use crate::features::queue::stores::TicketStore;

/// Read-side listings of department queues
pub struct QueueQueryService {
    store: Arc<dyn TicketStore>,
    catalog: Arc<dyn Catalog>,
}

impl QueueQueryService {
    pub fn new(store: Arc<dyn TicketStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self { store, catalog }
    }

    async fn transaction_names(&self, department_id: i64) -> Result<HashMap<i64, String>> {
        Ok(self
            .catalog
            .list_transactions(department_id)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect())
    }

    /// Every ticket of the department, all statuses, by sequence number
    pub async fn list_queue(&self, department_id: i64) -> Result<Vec<QueueEntryDto>> {
        let tickets = self.store.list_by_department(department_id).await?;
        let names = self.transaction_names(department_id).await?;

        Ok(tickets
            .into_iter()
            .map(|t| {
                let name = names.get(&t.transaction_id).cloned();
                QueueEntryDto::from_ticket(t, name)
            })
            .collect())
    }

    /// Finished (`successful`/`failed`) tickets, most recent first
    pub async fn list_history(&self, department_id: i64) -> Result<Vec<QueueHistoryEntryDto>> {
        let tickets = self.store.list_history(department_id).await?;
        let names = self.transaction_names(department_id).await?;

        Ok(tickets
            .into_iter()
            .map(|t| {
                let name = names.get(&t.transaction_id).cloned();
                QueueHistoryEntryDto::from_ticket(t, name)
            })
            .collect())
    }

    /// One ticket with its transaction name
    pub async fn get_ticket(&self, ticket_id: Uuid) -> Result<QueueEntryDto> {
        let ticket: Ticket = self
            .store
            .find(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket '{}' not found", ticket_id)))?;

        let name = self
            .catalog
            .find_transaction(ticket.transaction_id)
            .await?
            .map(|t| t.name);

        Ok(QueueEntryDto::from_ticket(ticket, name))
    }
}
