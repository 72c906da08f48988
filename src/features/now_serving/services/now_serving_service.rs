use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::core::error::{AppError, Result};
use crate::features::catalog::Catalog;
use crate::features::now_serving::dtos::ServingBoardEntryDto;
use crate::features::now_serving::models::{QueueSignal, SignalKind};
use crate::modules::cache::TtlCache;

/// Publishes and reads per-department display signals.
///
/// Signals are best-effort: last write wins, and expiry or a restart simply
/// clears them.
pub struct NowServingPublisher {
    cache: Arc<dyn TtlCache>,
    catalog: Arc<dyn Catalog>,
    ttl: Duration,
}

impl NowServingPublisher {
    pub fn new(cache: Arc<dyn TtlCache>, catalog: Arc<dyn Catalog>, ttl: Duration) -> Self {
        Self {
            cache,
            catalog,
            ttl,
        }
    }

    /// Overwrite a department's signal, timestamped now
    pub async fn publish(
        &self,
        kind: SignalKind,
        department_id: i64,
        queue_number: &str,
        transaction_name: Option<&str>,
        priority: bool,
    ) -> QueueSignal {
        let signal = QueueSignal {
            department_id,
            queue_number: queue_number.to_string(),
            transaction_name: transaction_name.map(str::to_string),
            priority,
            timestamp: Utc::now(),
        };

        match serde_json::to_value(&signal) {
            Ok(value) => {
                self.cache
                    .put_with_ttl(&kind.cache_key(department_id), value, self.ttl)
                    .await;
                tracing::info!(
                    "Published {:?} signal: department={}, queue_number={}",
                    kind,
                    department_id,
                    signal.queue_number
                );
            }
            Err(e) => {
                tracing::warn!("Failed to serialize queue signal: {}", e);
            }
        }

        signal
    }

    /// Announce the ticket being served at a department's counter
    pub async fn set_currently_serving(
        &self,
        department_id: i64,
        queue_number: &str,
        transaction_name: Option<&str>,
        priority: bool,
    ) -> Result<QueueSignal> {
        self.catalog
            .find_department(department_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Department '{}' not found", department_id))
            })?;

        Ok(self
            .publish(
                SignalKind::CurrentlyServing,
                department_id,
                queue_number,
                transaction_name,
                priority,
            )
            .await)
    }

    /// Live signal of one department, `None` when nothing is displayed
    pub async fn current_for(&self, kind: SignalKind, department_id: i64) -> Option<QueueSignal> {
        let value = self.cache.get(&kind.cache_key(department_id)).await?;

        serde_json::from_value(value)
            .map_err(|e| {
                tracing::warn!(
                    "Discarding unreadable {:?} signal for department {}: {}",
                    kind,
                    department_id,
                    e
                );
            })
            .ok()
    }

    /// Live signals of every catalog department that has one
    pub async fn current_all(&self, kind: SignalKind) -> Result<Vec<QueueSignal>> {
        let departments = self.catalog.list_departments().await?;

        let mut signals = Vec::new();
        for department in departments {
            if let Some(signal) = self.current_for(kind, department.id).await {
                signals.push(signal);
            }
        }

        Ok(signals)
    }

    /// One row per catalog department with its serving signal, if any
    pub async fn serving_board(&self) -> Result<Vec<ServingBoardEntryDto>> {
        let departments = self.catalog.list_departments().await?;

        let mut board = Vec::with_capacity(departments.len());
        for department in departments {
            let serving = self
                .current_for(SignalKind::CurrentlyServing, department.id)
                .await;
            board.push(ServingBoardEntryDto {
                department_id: department.id,
                department_name: department.name,
                serving,
            });
        }

        Ok(board)
    }
}
