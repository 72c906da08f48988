use std::sync::Arc;

use uuid::Uuid;

use crate::core::config::QueueConfig;
use crate::core::error::Result;
use crate::features::catalog::Catalog;
use crate::features::now_serving::models::SignalKind;
use crate::features::now_serving::NowServingPublisher;
use crate::features::queue::dtos::{
    GeneratedTicketDto, QueueEntryDto, QueueHistoryEntryDto, WaitEstimateDto,
};
use crate::features::queue::models::{Ticket, TicketOutcome, TicketSource};
use crate::features::queue::services::{
    QueueQueryService, TicketLifecycle, TicketSequencer, WaitTimeEstimator,
};
use crate::features::queue::stores::TicketStore;
use crate::shared::calendar::ServiceCalendar;

/// Entry point used by the queue handlers.
///
/// Issuing a ticket runs: allocate -> estimate -> publish latest-issued signal.
pub struct QueueService {
    sequencer: TicketSequencer,
    estimator: WaitTimeEstimator,
    lifecycle: TicketLifecycle,
    query: QueueQueryService,
    publisher: Arc<NowServingPublisher>,
}

impl QueueService {
    pub fn new(
        sequencer: TicketSequencer,
        estimator: WaitTimeEstimator,
        lifecycle: TicketLifecycle,
        query: QueueQueryService,
        publisher: Arc<NowServingPublisher>,
    ) -> Self {
        Self {
            sequencer,
            estimator,
            lifecycle,
            query,
            publisher,
        }
    }

    /// Wire every component over one store, catalog and calendar
    pub fn assemble(
        store: Arc<dyn TicketStore>,
        catalog: Arc<dyn Catalog>,
        publisher: Arc<NowServingPublisher>,
        config: &QueueConfig,
    ) -> Self {
        let calendar = ServiceCalendar::new(config.utc_offset);

        Self::new(
            TicketSequencer::new(
                Arc::clone(&store),
                Arc::clone(&catalog),
                calendar,
                config.allocation_max_retries,
            ),
            WaitTimeEstimator::new(
                Arc::clone(&store),
                Arc::clone(&catalog),
                calendar,
                config.default_service_minutes,
                config.service_history_days,
            ),
            TicketLifecycle::new(Arc::clone(&store), Arc::clone(&catalog), calendar),
            QueueQueryService::new(store, catalog),
            publisher,
        )
    }

    /// Issue a ticket and attach its wait estimate
    pub async fn generate(
        &self,
        department_id: i64,
        transaction_id: i64,
        priority: bool,
        source: TicketSource,
    ) -> Result<GeneratedTicketDto> {
        let issued = self
            .sequencer
            .allocate(department_id, transaction_id, priority, source)
            .await?;

        let estimated_wait_time = self.estimator.estimate(department_id, transaction_id).await?;

        self.publisher
            .publish(
                SignalKind::LatestIssued,
                issued.department.id,
                &issued.ticket.display_code,
                Some(&issued.transaction.name),
                issued.ticket.priority,
            )
            .await;

        Ok(GeneratedTicketDto::new(issued, estimated_wait_time))
    }

    pub async fn estimate(&self, department_id: i64, transaction_id: i64) -> Result<WaitEstimateDto> {
        self.estimator.estimate(department_id, transaction_id).await
    }

    pub async fn complete(&self, ticket_id: Uuid) -> Result<Ticket> {
        self.lifecycle.mark_completed(ticket_id).await
    }

    pub async fn record_outcome(&self, ticket_id: Uuid, outcome: TicketOutcome) -> Result<Ticket> {
        self.lifecycle.mark_outcome(ticket_id, outcome).await
    }

    pub async fn reset(&self, department_id: i64) -> Result<u64> {
        self.lifecycle.reset(department_id).await
    }

    pub async fn list_queue(&self, department_id: i64) -> Result<Vec<QueueEntryDto>> {
        self.query.list_queue(department_id).await
    }

    pub async fn list_history(&self, department_id: i64) -> Result<Vec<QueueHistoryEntryDto>> {
        self.query.list_history(department_id).await
    }

    pub async fn get_ticket(&self, ticket_id: Uuid) -> Result<QueueEntryDto> {
        self.query.get_ticket(ticket_id).await
    }
}
