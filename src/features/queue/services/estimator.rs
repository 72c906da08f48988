use std::sync::Arc;

use chrono::Duration;

use crate::core::error::Result;
use crate::features::catalog::{resolve_service, Catalog};
use crate::features::queue::dtos::WaitEstimateDto;
use crate::features::queue::stores::TicketStore;
use crate::shared::calendar::ServiceCalendar;

/// Projects how long a newcomer will wait for a department/transaction
pub struct WaitTimeEstimator {
    store: Arc<dyn TicketStore>,
    catalog: Arc<dyn Catalog>,
    calendar: ServiceCalendar,
    default_service_minutes: f64,
    history_days: i64,
}

impl WaitTimeEstimator {
    pub fn new(
        store: Arc<dyn TicketStore>,
        catalog: Arc<dyn Catalog>,
        calendar: ServiceCalendar,
        default_service_minutes: f64,
        history_days: i64,
    ) -> Self {
        Self {
            store,
            catalog,
            calendar,
            default_service_minutes,
            history_days,
        }
    }

    /// Waiting tickets today times the recent mean service time.
    ///
    /// Falls back to the default service time when there is no completed
    /// ticket in the history window.
    pub async fn estimate(&self, department_id: i64, transaction_id: i64) -> Result<WaitEstimateDto> {
        resolve_service(self.catalog.as_ref(), department_id, transaction_id).await?;

        let now = self.calendar.now();
        let queue_length = self
            .store
            .count_waiting(department_id, transaction_id, self.calendar.date_of(now))
            .await?;

        let average = self
            .store
            .average_service_minutes(
                department_id,
                transaction_id,
                now - Duration::days(self.history_days),
            )
            .await?
            .filter(|avg| *avg > 0.0)
            .unwrap_or(self.default_service_minutes);

        let minutes = (queue_length as f64 * average).round() as i64;

        Ok(WaitEstimateDto {
            minutes,
            formatted: format_wait_time(minutes),
        })
    }
}

/// Human wording of a wait: `45 minutes`, `1 hour`, `2 hours 5 minutes`
fn format_wait_time(minutes: i64) -> String {
    if minutes < 60 {
        return format!("{} minutes", minutes);
    }

    let hours = minutes / 60;
    let remaining = minutes % 60;
    let hour_noun = if hours > 1 { "hours" } else { "hour" };

    if remaining == 0 {
        format!("{} {}", hours, hour_noun)
    } else {
        format!("{} {} {} minutes", hours, hour_noun, remaining)
    }
}
