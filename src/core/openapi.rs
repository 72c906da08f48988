use utoipa::{Modify, OpenApi};

use crate::features::catalog::models as catalog_models;
use crate::features::now_serving::{
    dtos as now_serving_dtos, handlers as now_serving_handlers, models as now_serving_models,
};
use crate::features::queue::{dtos as queue_dtos, handlers as queue_handlers, models as queue_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Queue
        queue_handlers::generate_ticket,
        queue_handlers::get_estimate,
        queue_handlers::get_queue_status,
        queue_handlers::complete_ticket,
        queue_handlers::update_ticket_status,
        queue_handlers::reset_queue,
        queue_handlers::get_queue_history,
        queue_handlers::get_queue_number,
        // Now serving
        now_serving_handlers::set_currently_serving,
        now_serving_handlers::get_currently_serving,
        now_serving_handlers::get_latest_updates,
        now_serving_handlers::get_latest_update,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Catalog
            catalog_models::Department,
            catalog_models::Transaction,
            // Queue
            queue_models::TicketStatus,
            queue_models::TicketSource,
            queue_models::TicketOutcome,
            queue_dtos::GenerateTicketDto,
            queue_dtos::WaitEstimateDto,
            queue_dtos::GeneratedTicketDto,
            queue_dtos::CompleteTicketDto,
            queue_dtos::UpdateStatusDto,
            queue_dtos::TicketResponseDto,
            queue_dtos::QueueEntryDto,
            queue_dtos::QueueHistoryEntryDto,
            queue_dtos::ResetQueueResponseDto,
            ApiResponse<queue_dtos::GeneratedTicketDto>,
            ApiResponse<queue_dtos::WaitEstimateDto>,
            ApiResponse<queue_dtos::TicketResponseDto>,
            ApiResponse<queue_dtos::QueueEntryDto>,
            ApiResponse<Vec<queue_dtos::QueueEntryDto>>,
            ApiResponse<Vec<queue_dtos::QueueHistoryEntryDto>>,
            ApiResponse<queue_dtos::ResetQueueResponseDto>,
            // Now serving
            now_serving_models::QueueSignal,
            now_serving_dtos::SetCurrentlyServingDto,
            now_serving_dtos::ServingBoardEntryDto,
            now_serving_dtos::CurrentlyServingResponseDto,
            ApiResponse<now_serving_models::QueueSignal>,
            ApiResponse<Vec<now_serving_models::QueueSignal>>,
            ApiResponse<now_serving_dtos::CurrentlyServingResponseDto>,
        )
    ),
    tags(
        (name = "queue", description = "Ticket issuing, staff transitions and department queue listings"),
        (name = "now-serving", description = "Display-board signals: currently serving and latest issued"),
    ),
    info(
        title = "City Hall Queue API",
        version = "0.1.0",
        description = "API documentation for the service-counter queue",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
