use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::catalog::{resolve_service, Catalog, Department, Transaction};
use crate::features::queue::models::{display_prefix, NewTicket, Ticket, TicketSource};
use crate::features::queue::stores::TicketStore;
use crate::shared::calendar::ServiceCalendar;

/// Hands out per-department, per-day queue numbers
pub struct TicketSequencer {
    store: Arc<dyn TicketStore>,
    catalog: Arc<dyn Catalog>,
    calendar: ServiceCalendar,
    max_retries: u32,
}

/// A freshly issued ticket with the catalog entries it was validated against
#[derive(Debug, Clone)]
pub struct IssuedTicket {
    pub ticket: Ticket,
    pub department: Department,
    pub transaction: Transaction,
}

impl TicketSequencer {
    pub fn new(
        store: Arc<dyn TicketStore>,
        catalog: Arc<dyn Catalog>,
        calendar: ServiceCalendar,
        max_retries: u32,
    ) -> Self {
        Self {
            store,
            catalog,
            calendar,
            max_retries,
        }
    }

    /// Issue the next waiting ticket for a department/transaction pair.
    ///
    /// Numbering restarts every calendar day and only counts tickets that are
    /// still waiting, so numbers freed by a reset are handed out again.
    pub async fn allocate(
        &self,
        department_id: i64,
        transaction_id: i64,
        priority: bool,
        source: TicketSource,
    ) -> Result<IssuedTicket> {
        let (department, transaction) =
            resolve_service(self.catalog.as_ref(), department_id, transaction_id).await?;

        let prefix = display_prefix(&department.name);
        let mut attempt = 0;

        let ticket = loop {
            let created_at = self.calendar.now();
            let draft = NewTicket {
                department_id: department.id,
                transaction_id: transaction.id,
                display_prefix: prefix.clone(),
                priority,
                source,
                service_date: self.calendar.date_of(created_at),
                created_at,
            };

            match self.store.allocate(draft).await {
                Ok(ticket) => break ticket,
                Err(AppError::Conflict(msg)) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Sequence allocation conflict for department {} (attempt {}): {}",
                        department.id,
                        attempt,
                        msg
                    );
                }
                Err(e) => return Err(e),
            }
        };

        tracing::info!(
            "Ticket allocated: id={}, code={}, department={}, transaction={}, source={:?}",
            ticket.id,
            ticket.display_code,
            department.id,
            transaction.id,
            ticket.source
        );

        Ok(IssuedTicket {
            ticket,
            department,
            transaction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, NaiveDate, Utc};
    use futures::future::join_all;
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    use crate::features::queue::models::TicketStatus;
    use crate::features::queue::stores::InMemoryTicketStore;
    use crate::shared::test_helpers::{sample_catalog, seeded_ticket, utc_calendar};

    fn sequencer(store: Arc<dyn TicketStore>) -> TicketSequencer {
        TicketSequencer::new(store, Arc::new(sample_catalog()), utc_calendar(), 3)
    }

    #[tokio::test]
    async fn test_first_ticket_of_the_day_is_one() {
        let sequencer = sequencer(Arc::new(InMemoryTicketStore::new()));

        let issued = sequencer
            .allocate(1, 10, false, TicketSource::Kiosk)
            .await
            .unwrap();

        assert_eq!(issued.ticket.sequence_number, 1);
        assert_eq!(issued.ticket.display_code, "TRE#001");
        assert_eq!(issued.ticket.status, TicketStatus::Waiting);
        assert!(issued.ticket.completed_at.is_none());
        assert_eq!(issued.transaction.name, "Business Permit");
    }

    #[tokio::test]
    async fn test_numbers_increase_per_department_independently() {
        let sequencer = sequencer(Arc::new(InMemoryTicketStore::new()));

        let a1 = sequencer.allocate(1, 10, false, TicketSource::Kiosk).await.unwrap();
        let b1 = sequencer.allocate(2, 20, false, TicketSource::Web).await.unwrap();
        let a2 = sequencer.allocate(1, 12, true, TicketSource::Web).await.unwrap();

        assert_eq!(a1.ticket.sequence_number, 1);
        assert_eq!(a2.ticket.sequence_number, 2);
        assert_eq!(b1.ticket.sequence_number, 1);
        assert_eq!(b1.ticket.display_code, "ASS#001");
        assert!(a2.ticket.priority);
        assert_eq!(a2.ticket.source, TicketSource::Web);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_get_distinct_numbers() {
        let store = Arc::new(InMemoryTicketStore::new());
        let sequencer = Arc::new(sequencer(store));

        let calls = (0..50).map(|_| {
            let sequencer = Arc::clone(&sequencer);
            tokio::spawn(async move {
                sequencer
                    .allocate(1, 10, false, TicketSource::Kiosk)
                    .await
                    .map(|issued| issued.ticket.sequence_number)
            })
        });

        let numbers: Vec<i32> = join_all(calls)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        let distinct: HashSet<i32> = numbers.iter().copied().collect();
        assert_eq!(distinct.len(), 50);
        assert_eq!(distinct, (1..=50).collect::<HashSet<i32>>());
    }

    #[tokio::test]
    async fn test_numbering_only_counts_waiting_tickets_of_today() {
        let store = Arc::new(InMemoryTicketStore::new());
        let calendar = utc_calendar();
        let today = calendar.today();

        // Yesterday's waiting ticket and today's finished one do not count
        store
            .insert_raw(seeded_ticket(1, 10, 9, today.pred_opt().unwrap(), TicketStatus::Waiting))
            .await;
        store
            .insert_raw(seeded_ticket(1, 10, 5, today, TicketStatus::Successful))
            .await;
        store
            .insert_raw(seeded_ticket(1, 10, 2, today, TicketStatus::Waiting))
            .await;

        let issued = sequencer(store)
            .allocate(1, 10, false, TicketSource::Kiosk)
            .await
            .unwrap();

        assert_eq!(issued.ticket.sequence_number, 3);
    }

    #[tokio::test]
    async fn test_unknown_or_archived_references_are_not_found() {
        let sequencer = sequencer(Arc::new(InMemoryTicketStore::new()));

        for (department_id, transaction_id) in [(99, 10), (1, 99), (3, 30), (1, 11)] {
            let result = sequencer
                .allocate(department_id, transaction_id, false, TicketSource::Kiosk)
                .await;
            assert!(matches!(result, Err(AppError::NotFound(_))));
        }
    }

    /// Store whose first `failures` allocations report a lost race
    struct FlakyStore {
        inner: InMemoryTicketStore,
        failures: AtomicU32,
    }

    #[async_trait]
    impl TicketStore for FlakyStore {
        async fn allocate(&self, ticket: NewTicket) -> Result<Ticket> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(AppError::Conflict("lost race".to_string()));
            }
            self.inner.allocate(ticket).await
        }

        async fn find(&self, id: Uuid) -> Result<Option<Ticket>> {
            self.inner.find(id).await
        }

        async fn transition(
            &self,
            id: Uuid,
            next: TicketStatus,
            at: DateTime<Utc>,
        ) -> Result<Ticket> {
            self.inner.transition(id, next, at).await
        }

        async fn reset_waiting(&self, department_id: i64, day: NaiveDate) -> Result<u64> {
            self.inner.reset_waiting(department_id, day).await
        }

        async fn count_waiting(&self, d: i64, t: i64, day: NaiveDate) -> Result<i64> {
            self.inner.count_waiting(d, t, day).await
        }

        async fn average_service_minutes(
            &self,
            d: i64,
            t: i64,
            since: DateTime<Utc>,
        ) -> Result<Option<f64>> {
            self.inner.average_service_minutes(d, t, since).await
        }

        async fn list_by_department(&self, department_id: i64) -> Result<Vec<Ticket>> {
            self.inner.list_by_department(department_id).await
        }

        async fn list_history(&self, department_id: i64) -> Result<Vec<Ticket>> {
            self.inner.list_history(department_id).await
        }
    }

    #[tokio::test]
    async fn test_conflicts_are_retried_internally() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryTicketStore::new(),
            failures: AtomicU32::new(2),
        });

        let issued = sequencer(store)
            .allocate(1, 10, false, TicketSource::Kiosk)
            .await
            .unwrap();

        assert_eq!(issued.ticket.sequence_number, 1);
    }

    #[tokio::test]
    async fn test_conflict_surfaces_after_retry_budget() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryTicketStore::new(),
            failures: AtomicU32::new(10),
        });

        let result = sequencer(store)
            .allocate(1, 10, false, TicketSource::Kiosk)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_issue_timestamps_are_consistent() {
        let calendar = utc_calendar();
        let created_at = Utc::now() - Duration::minutes(1);
        let ticket = Ticket::issue(
            NewTicket {
                department_id: 1,
                transaction_id: 10,
                display_prefix: "TRE".to_string(),
                priority: false,
                source: TicketSource::Kiosk,
                service_date: calendar.date_of(created_at),
                created_at,
            },
            12,
        );

        assert_eq!(ticket.display_code, "TRE#012");
        assert_eq!(ticket.updated_at, ticket.created_at);
    }
}
