use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use uuid::Uuid;

use crate::core::config::QueueConfig;
use crate::features::catalog::{Department, InMemoryCatalog, Transaction};
use crate::features::now_serving::{self, NowServingPublisher};
use crate::features::queue::models::{display_code, Ticket, TicketSource, TicketStatus};
use crate::features::queue::services::QueueService;
use crate::features::queue::stores::{InMemoryTicketStore, TicketStore};
use crate::features::queue;
use crate::modules::cache::InMemoryTtlCache;
use crate::shared::calendar::ServiceCalendar;

/// Treasury (1) and Assessor (2) are live, Archives (3) is archived.
///
/// Transaction 11 is archived, 30 belongs to the archived department.
pub fn sample_catalog() -> InMemoryCatalog {
    let department = |id, name: &str, archived| Department {
        id,
        name: name.to_string(),
        archived,
    };
    let transaction = |id, department_id, name: &str, archived| Transaction {
        id,
        department_id,
        name: name.to_string(),
        archived,
    };

    InMemoryCatalog::new(
        vec![
            department(1, "Treasury", false),
            department(2, "Assessor", false),
            department(3, "Archives", true),
        ],
        vec![
            transaction(10, 1, "Business Permit", false),
            transaction(11, 1, "Community Tax", true),
            transaction(12, 1, "Cedula", false),
            transaction(20, 2, "Property Tax", false),
            transaction(30, 3, "Old Records", false),
        ],
    )
}

pub fn utc_calendar() -> ServiceCalendar {
    ServiceCalendar::new(QueueConfig::default().utc_offset)
}

fn prefix_for(department_id: i64) -> &'static str {
    match department_id {
        1 => "TRE",
        2 => "ASS",
        _ => "ARC",
    }
}

/// A ticket issued early on `day`, finished five minutes later when terminal
pub fn seeded_ticket(
    department_id: i64,
    transaction_id: i64,
    sequence_number: i32,
    day: NaiveDate,
    status: TicketStatus,
) -> Ticket {
    let created_at = day
        .and_hms_opt(0, 0, 0)
        .map(|start| start.and_utc())
        .unwrap_or_else(Utc::now)
        + ChronoDuration::seconds(sequence_number as i64);
    let completed_at = status
        .is_terminal()
        .then(|| created_at + ChronoDuration::minutes(5));

    Ticket {
        id: Uuid::now_v7(),
        department_id,
        transaction_id,
        sequence_number,
        display_code: display_code(prefix_for(department_id), sequence_number),
        status,
        priority: false,
        source: TicketSource::Kiosk,
        service_date: day,
        created_at,
        completed_at,
        updated_at: completed_at.unwrap_or(created_at),
    }
}

/// A `completed` ticket that took `minutes` to serve, finishing at `completed_at`
pub fn completed_ticket(
    department_id: i64,
    transaction_id: i64,
    completed_at: DateTime<Utc>,
    minutes: i64,
) -> Ticket {
    let created_at = completed_at - ChronoDuration::minutes(minutes);

    Ticket {
        id: Uuid::now_v7(),
        department_id,
        transaction_id,
        sequence_number: 1,
        display_code: display_code(prefix_for(department_id), 1),
        status: TicketStatus::Completed,
        priority: false,
        source: TicketSource::Kiosk,
        service_date: created_at.date_naive(),
        created_at,
        completed_at: Some(completed_at),
        updated_at: completed_at,
    }
}

/// The public router over in-memory backends, as served by `main`
pub fn test_app(store: Arc<InMemoryTicketStore>) -> Router {
    let catalog = Arc::new(sample_catalog());
    let publisher = Arc::new(NowServingPublisher::new(
        Arc::new(InMemoryTtlCache::new()),
        catalog.clone(),
        Duration::from_secs(300),
    ));
    let store: Arc<dyn TicketStore> = store;
    let service = Arc::new(QueueService::assemble(
        store,
        catalog,
        Arc::clone(&publisher),
        &QueueConfig::default(),
    ));

    Router::new()
        .merge(queue::routes::routes(service))
        .merge(now_serving::routes::routes(publisher))
}
