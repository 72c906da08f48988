use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::TicketStore;
use crate::core::error::{AppError, Result};
use crate::features::queue::models::{NewTicket, Ticket, TicketStatus};

const TICKET_COLUMNS: &str = r#"
    id, department_id, transaction_id, sequence_number, display_code,
    status, priority, source, service_date, created_at, completed_at, updated_at
"#;

/// Ticket store backed by the `queue_tickets` table
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Serialize writers of one (department, day) queue until the transaction ends
    async fn lock_queue_day(
        tx: &mut Transaction<'_, Postgres>,
        department_id: i64,
        day: NaiveDate,
    ) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("queue:{}:{}", department_id, day))
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock queue day: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn allocate(&self, draft: NewTicket) -> Result<Ticket> {
        let mut tx = self.pool.begin().await?;

        Self::lock_queue_day(&mut tx, draft.department_id, draft.service_date).await?;

        let highest: i32 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(sequence_number), 0)
            FROM queue_tickets
            WHERE department_id = $1
              AND service_date = $2
              AND status = 'waiting'
            "#,
        )
        .bind(draft.department_id)
        .bind(draft.service_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read highest sequence number: {:?}", e);
            AppError::Database(e)
        })?;

        let ticket = Ticket::issue(draft, highest + 1);

        let inserted = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            INSERT INTO queue_tickets (
                id, department_id, transaction_id, sequence_number, display_code,
                status, priority, source, service_date, created_at, completed_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(ticket.id)
        .bind(ticket.department_id)
        .bind(ticket.transaction_id)
        .bind(ticket.sequence_number)
        .bind(&ticket.display_code)
        .bind(ticket.status)
        .bind(ticket.priority)
        .bind(ticket.source)
        .bind(ticket.service_date)
        .bind(ticket.created_at)
        .bind(ticket.completed_at)
        .bind(ticket.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                format!("Sequence number {} already taken", ticket.sequence_number),
            ),
            e => {
                tracing::error!("Failed to insert ticket: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tx.commit().await?;

        Ok(inserted)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM queue_tickets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get ticket by ID: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn transition(&self, id: Uuid, next: TicketStatus, at: DateTime<Utc>) -> Result<Ticket> {
        // Reject non-terminal targets before touching the row
        TicketStatus::Waiting.transition_to(next)?;

        let updated = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE queue_tickets
            SET status = $2, completed_at = $3, updated_at = $3
            WHERE id = $1 AND status = 'waiting'
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(next)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to transition ticket: {:?}", e);
            AppError::Database(e)
        })?;

        if let Some(ticket) = updated {
            return Ok(ticket);
        }

        // Nothing updated: either the ticket is missing or no longer waiting
        match self.find(id).await? {
            Some(current) => match current.status.transition_to(next) {
                Err(e) => Err(e),
                Ok(_) => Err(AppError::Conflict(format!(
                    "Ticket '{}' changed concurrently, retry the request",
                    id
                ))),
            },
            None => Err(AppError::NotFound(format!("Ticket '{}' not found", id))),
        }
    }

    async fn reset_waiting(&self, department_id: i64, day: NaiveDate) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        Self::lock_queue_day(&mut tx, department_id, day).await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM queue_tickets
            WHERE department_id = $1
              AND service_date = $2
              AND status = 'waiting'
            "#,
        )
        .bind(department_id)
        .bind(day)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to reset queue: {:?}", e);
            AppError::Database(e)
        })?
        .rows_affected();

        tx.commit().await?;

        Ok(deleted)
    }

    async fn count_waiting(
        &self,
        department_id: i64,
        transaction_id: i64,
        day: NaiveDate,
    ) -> Result<i64> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM queue_tickets
            WHERE department_id = $1
              AND transaction_id = $2
              AND service_date = $3
              AND status = 'waiting'
            "#,
        )
        .bind(department_id)
        .bind(transaction_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count waiting tickets: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn average_service_minutes(
        &self,
        department_id: i64,
        transaction_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        sqlx::query_scalar(
            r#"
            SELECT AVG(FLOOR(EXTRACT(EPOCH FROM (completed_at - created_at)) / 60))::float8
            FROM queue_tickets
            WHERE department_id = $1
              AND transaction_id = $2
              AND status = 'completed'
              AND completed_at IS NOT NULL
              AND created_at >= $3
            "#,
        )
        .bind(department_id)
        .bind(transaction_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to average service time: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_by_department(&self, department_id: i64) -> Result<Vec<Ticket>> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            SELECT {TICKET_COLUMNS}
            FROM queue_tickets
            WHERE department_id = $1
            ORDER BY sequence_number ASC, created_at ASC
            "#
        ))
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list department queue: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_history(&self, department_id: i64) -> Result<Vec<Ticket>> {
        sqlx::query_as::<_, Ticket>(&format!(
            r#"
            SELECT {TICKET_COLUMNS}
            FROM queue_tickets
            WHERE department_id = $1
              AND status IN ('successful', 'failed')
            ORDER BY completed_at DESC
            "#
        ))
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list queue history: {:?}", e);
            AppError::Database(e)
        })
    }
}

/// Run with `cargo test -- --ignored` against a disposable `DATABASE_URL`
#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use chrono::Duration;
    use futures::future::join_all;

    use super::*;
    use crate::features::queue::models::TicketSource;

    async fn seed_catalog(pool: &PgPool) {
        sqlx::query("INSERT INTO departments (id, name) VALUES (1, 'Treasury'), (2, 'Assessor')")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO transactions (id, department_id, name) \
             VALUES (10, 1, 'Business Permit'), (20, 2, 'Property Tax')",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    fn draft(department_id: i64, transaction_id: i64, day: NaiveDate) -> NewTicket {
        NewTicket {
            department_id,
            transaction_id,
            display_prefix: "TRE".to_string(),
            priority: false,
            source: TicketSource::Kiosk,
            service_date: day,
            created_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_concurrent_allocations_are_linearized(pool: PgPool) {
        seed_catalog(&pool).await;
        let store = Arc::new(PgTicketStore::new(pool));

        let calls = (0..30).map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .allocate(draft(1, 10, today()))
                    .await
                    .map(|t| t.sequence_number)
            })
        });

        let numbers: HashSet<i32> = join_all(calls)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(numbers, (1..=30).collect::<HashSet<i32>>());
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_numbering_counts_only_waiting_tickets_of_the_day(pool: PgPool) {
        seed_catalog(&pool).await;
        let store = PgTicketStore::new(pool);
        let day = today();

        store.allocate(draft(1, 10, day)).await.unwrap();
        let second = store.allocate(draft(1, 10, day)).await.unwrap();
        store
            .transition(second.id, TicketStatus::Completed, Utc::now())
            .await
            .unwrap();

        let reused = store.allocate(draft(1, 10, day)).await.unwrap();
        let next_day = store
            .allocate(draft(1, 10, day.succ_opt().unwrap()))
            .await
            .unwrap();
        let other_department = store.allocate(draft(2, 20, day)).await.unwrap();

        assert_eq!(reused.sequence_number, 2);
        assert_eq!(next_day.sequence_number, 1);
        assert_eq!(other_department.sequence_number, 1);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_unique_index_rejects_duplicate_waiting_numbers(pool: PgPool) {
        seed_catalog(&pool).await;
        let store = PgTicketStore::new(pool.clone());
        let ticket = store.allocate(draft(1, 10, today())).await.unwrap();

        let duplicate = sqlx::query(
            r#"
            INSERT INTO queue_tickets (
                id, department_id, transaction_id, sequence_number, display_code, service_date
            ) VALUES ($1, 1, 10, $2, 'TRE#001', $3)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(ticket.sequence_number)
        .bind(ticket.service_date)
        .execute(&pool)
        .await;

        match duplicate {
            Err(sqlx::Error::Database(db)) => assert!(db.is_unique_violation()),
            other => panic!("expected unique violation, got {:?}", other),
        }
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_transition_is_single_shot(pool: PgPool) {
        seed_catalog(&pool).await;
        let store = PgTicketStore::new(pool);
        let ticket = store.allocate(draft(1, 10, today())).await.unwrap();

        let done = store
            .transition(ticket.id, TicketStatus::Successful, Utc::now())
            .await
            .unwrap();
        let again = store
            .transition(ticket.id, TicketStatus::Failed, Utc::now())
            .await;
        let missing = store
            .transition(Uuid::now_v7(), TicketStatus::Completed, Utc::now())
            .await;

        assert_eq!(done.status, TicketStatus::Successful);
        assert!(done.completed_at.is_some());
        assert!(matches!(again, Err(AppError::InvalidTransition(_))));
        assert!(matches!(missing, Err(AppError::NotFound(_))));
        assert_eq!(
            store.find(ticket.id).await.unwrap().unwrap().status,
            TicketStatus::Successful
        );
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_reset_removes_only_todays_waiting_tickets(pool: PgPool) {
        seed_catalog(&pool).await;
        let store = PgTicketStore::new(pool);
        let day = today();

        let served = store.allocate(draft(1, 10, day)).await.unwrap();
        store
            .transition(served.id, TicketStatus::Failed, Utc::now())
            .await
            .unwrap();
        store.allocate(draft(1, 10, day)).await.unwrap();
        store.allocate(draft(1, 10, day)).await.unwrap();
        let yesterday = store
            .allocate(draft(1, 10, day.pred_opt().unwrap()))
            .await
            .unwrap();
        let other = store.allocate(draft(2, 20, day)).await.unwrap();

        assert_eq!(store.reset_waiting(1, day).await.unwrap(), 2);
        for kept in [served.id, yesterday.id, other.id] {
            assert!(store.find(kept).await.unwrap().is_some());
        }
        assert_eq!(
            store.allocate(draft(1, 10, day)).await.unwrap().sequence_number,
            1
        );
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL"]
    async fn test_estimate_inputs_and_listings(pool: PgPool) {
        seed_catalog(&pool).await;
        let store = PgTicketStore::new(pool);
        let day = today();

        let quick = store.allocate(draft(1, 10, day)).await.unwrap();
        let slow = store.allocate(draft(1, 10, day)).await.unwrap();
        store
            .transition(quick.id, TicketStatus::Completed, quick.created_at + Duration::minutes(8))
            .await
            .unwrap();
        store
            .transition(slow.id, TicketStatus::Completed, slow.created_at + Duration::minutes(12))
            .await
            .unwrap();
        store.allocate(draft(1, 10, day)).await.unwrap();

        let since = Utc::now() - Duration::days(7);
        assert_eq!(store.count_waiting(1, 10, day).await.unwrap(), 1);
        assert_eq!(
            store.average_service_minutes(1, 10, since).await.unwrap(),
            Some(10.0)
        );
        assert_eq!(store.average_service_minutes(2, 20, since).await.unwrap(), None);

        let listed: Vec<i32> = store
            .list_by_department(1)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.sequence_number)
            .collect();
        assert_eq!(listed, vec![1, 1, 2]);
        assert!(store.list_history(1).await.unwrap().is_empty());
    }
}
