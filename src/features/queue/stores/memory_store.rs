use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use uuid::Uuid;

use super::TicketStore;
use crate::core::error::{AppError, Result};
use crate::features::queue::models::{NewTicket, Ticket, TicketStatus};

type DayKey = (i64, NaiveDate);

/// Process-local ticket store.
///
/// Allocation and reset for one (department, day) are serialized by a
/// dedicated async mutex; other departments never wait on it.
#[derive(Default)]
pub struct InMemoryTicketStore {
    tickets: RwLock<HashMap<Uuid, Ticket>>,
    day_locks: Mutex<HashMap<DayKey, Arc<AsyncMutex<()>>>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn day_lock(&self, department_id: i64, day: NaiveDate) -> Result<Arc<AsyncMutex<()>>> {
        let mut locks = self
            .day_locks
            .lock()
            .map_err(|_| AppError::Internal("Queue lock table poisoned".to_string()))?;

        // Older days can no longer be allocated into
        locks.retain(|(_, lock_day), _| *lock_day >= day);

        Ok(Arc::clone(
            locks.entry((department_id, day)).or_default(),
        ))
    }

    /// Insert an already-built ticket as-is, bypassing numbering
    #[cfg(test)]
    pub async fn insert_raw(&self, ticket: Ticket) {
        self.tickets.write().await.insert(ticket.id, ticket);
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn allocate(&self, draft: NewTicket) -> Result<Ticket> {
        let lock = self.day_lock(draft.department_id, draft.service_date)?;
        let _guard = lock.lock().await;

        let highest = {
            let tickets = self.tickets.read().await;
            tickets
                .values()
                .filter(|t| {
                    t.department_id == draft.department_id
                        && t.service_date == draft.service_date
                        && t.status == TicketStatus::Waiting
                })
                .map(|t| t.sequence_number)
                .max()
                .unwrap_or(0)
        };

        let ticket = Ticket::issue(draft, highest + 1);

        let mut tickets = self.tickets.write().await;
        let taken = tickets.values().any(|t| {
            t.department_id == ticket.department_id
                && t.service_date == ticket.service_date
                && t.status == TicketStatus::Waiting
                && t.sequence_number == ticket.sequence_number
        });
        if taken {
            return Err(AppError::Conflict(format!(
                "Sequence number {} already taken",
                ticket.sequence_number
            )));
        }

        tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Ticket>> {
        Ok(self.tickets.read().await.get(&id).cloned())
    }

    async fn transition(&self, id: Uuid, next: TicketStatus, at: DateTime<Utc>) -> Result<Ticket> {
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Ticket '{}' not found", id)))?;

        ticket.apply_transition(next, at)?;
        Ok(ticket.clone())
    }

    async fn reset_waiting(&self, department_id: i64, day: NaiveDate) -> Result<u64> {
        let lock = self.day_lock(department_id, day)?;
        let _guard = lock.lock().await;

        let mut tickets = self.tickets.write().await;
        let before = tickets.len();
        tickets.retain(|_, t| {
            !(t.department_id == department_id
                && t.service_date == day
                && t.status == TicketStatus::Waiting)
        });

        Ok((before - tickets.len()) as u64)
    }

    async fn count_waiting(
        &self,
        department_id: i64,
        transaction_id: i64,
        day: NaiveDate,
    ) -> Result<i64> {
        let tickets = self.tickets.read().await;
        Ok(tickets
            .values()
            .filter(|t| {
                t.department_id == department_id
                    && t.transaction_id == transaction_id
                    && t.service_date == day
                    && t.status == TicketStatus::Waiting
            })
            .count() as i64)
    }

    async fn average_service_minutes(
        &self,
        department_id: i64,
        transaction_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        let tickets = self.tickets.read().await;
        let samples: Vec<i64> = tickets
            .values()
            .filter(|t| {
                t.department_id == department_id
                    && t.transaction_id == transaction_id
                    && t.status == TicketStatus::Completed
                    && t.created_at >= since
            })
            .filter_map(Ticket::service_minutes)
            .collect();

        if samples.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            samples.iter().sum::<i64>() as f64 / samples.len() as f64,
        ))
    }

    async fn list_by_department(&self, department_id: i64) -> Result<Vec<Ticket>> {
        let tickets = self.tickets.read().await;
        let mut listed: Vec<Ticket> = tickets
            .values()
            .filter(|t| t.department_id == department_id)
            .cloned()
            .collect();

        listed.sort_by(|a, b| {
            a.sequence_number
                .cmp(&b.sequence_number)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(listed)
    }

    async fn list_history(&self, department_id: i64) -> Result<Vec<Ticket>> {
        let tickets = self.tickets.read().await;
        let mut listed: Vec<Ticket> = tickets
            .values()
            .filter(|t| {
                t.department_id == department_id
                    && matches!(t.status, TicketStatus::Successful | TicketStatus::Failed)
            })
            .cloned()
            .collect();

        listed.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(listed)
    }
}
