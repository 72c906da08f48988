use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::queue::dtos::{
    CompleteTicketDto, EstimateQuery, GenerateTicketDto, GeneratedTicketDto, QueueEntryDto,
    QueueHistoryEntryDto, ResetQueueResponseDto, TicketResponseDto, UpdateStatusDto,
    WaitEstimateDto,
};
use crate::features::queue::models::TicketOutcome;
use crate::features::queue::services::QueueService;
use crate::shared::types::ApiResponse;

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| AppError::InvalidArgument(format!("{} is required", field)))
}

/// Issue the next ticket for a department/transaction
#[utoipa::path(
    post,
    path = "/queue/generate",
    request_body = GenerateTicketDto,
    responses(
        (status = 201, description = "Ticket issued", body = ApiResponse<GeneratedTicketDto>),
        (status = 400, description = "Missing field, or unknown/archived department or transaction"),
        (status = 409, description = "Numbering contention persisted, retry")
    ),
    tag = "queue"
)]
pub async fn generate_ticket(
    State(service): State<Arc<QueueService>>,
    AppJson(dto): AppJson<GenerateTicketDto>,
) -> Result<(StatusCode, Json<ApiResponse<GeneratedTicketDto>>)> {
    dto.validate()?;

    let department_id = required(dto.department_id, "department_id")?;
    let transaction_id = required(dto.transaction_id, "transaction_id")?;

    let generated = service
        .generate(department_id, transaction_id, dto.priority, dto.source)
        .await
        .map_err(AppError::not_found_as_invalid_argument)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(generated),
            Some("Queue number generated successfully".to_string()),
            None,
        )),
    ))
}

/// Current wait estimate without issuing a ticket
#[utoipa::path(
    get,
    path = "/queue/estimate",
    params(EstimateQuery),
    responses(
        (status = 200, description = "Wait estimate", body = ApiResponse<WaitEstimateDto>),
        (status = 404, description = "Department or transaction not found")
    ),
    tag = "queue"
)]
pub async fn get_estimate(
    State(service): State<Arc<QueueService>>,
    AppQuery(query): AppQuery<EstimateQuery>,
) -> Result<Json<ApiResponse<WaitEstimateDto>>> {
    let estimate = service
        .estimate(query.department_id, query.transaction_id)
        .await?;
    Ok(Json(ApiResponse::success(Some(estimate), None, None)))
}

/// All tickets of a department ordered by sequence number
#[utoipa::path(
    get,
    path = "/queue/status/{department_id}",
    params(
        ("department_id" = i64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department queue", body = ApiResponse<Vec<QueueEntryDto>>),
    ),
    tag = "queue"
)]
pub async fn get_queue_status(
    State(service): State<Arc<QueueService>>,
    AppPath(department_id): AppPath<i64>,
) -> Result<Json<ApiResponse<Vec<QueueEntryDto>>>> {
    let entries = service.list_queue(department_id).await?;
    Ok(Json(ApiResponse::listing(entries)))
}

/// Mark a waiting ticket as completed
#[utoipa::path(
    post,
    path = "/queue/complete",
    request_body = CompleteTicketDto,
    responses(
        (status = 200, description = "Ticket completed", body = ApiResponse<TicketResponseDto>),
        (status = 400, description = "Missing queue_id"),
        (status = 404, description = "Ticket not found"),
        (status = 409, description = "Ticket already finished")
    ),
    tag = "queue"
)]
pub async fn complete_ticket(
    State(service): State<Arc<QueueService>>,
    AppJson(dto): AppJson<CompleteTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    dto.validate()?;

    let ticket = service.complete(required(dto.queue_id, "queue_id")?).await?;

    Ok(Json(ApiResponse::success(
        Some(ticket.into()),
        Some("Queue marked as completed".to_string()),
        None,
    )))
}

/// Record a successful or failed outcome for a waiting ticket
#[utoipa::path(
    post,
    path = "/queue/update-status",
    request_body = UpdateStatusDto,
    responses(
        (status = 200, description = "Outcome recorded", body = ApiResponse<TicketResponseDto>),
        (status = 400, description = "Missing field or status other than successful/failed"),
        (status = 404, description = "Ticket not found"),
        (status = 409, description = "Ticket already finished")
    ),
    tag = "queue"
)]
pub async fn update_ticket_status(
    State(service): State<Arc<QueueService>>,
    AppJson(dto): AppJson<UpdateStatusDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    dto.validate()?;

    let ticket_id = required(dto.queue_id, "queue_id")?;
    let outcome: TicketOutcome = required(dto.status, "status")?.parse()?;

    let ticket = service.record_outcome(ticket_id, outcome).await?;

    Ok(Json(ApiResponse::success(
        Some(ticket.into()),
        Some(format!("Queue status updated to {}", outcome_label(outcome))),
        None,
    )))
}

fn outcome_label(outcome: TicketOutcome) -> &'static str {
    match outcome {
        TicketOutcome::Successful => "successful",
        TicketOutcome::Failed => "failed",
    }
}

/// Drop today's waiting tickets of a department so numbering restarts at 1
#[utoipa::path(
    post,
    path = "/queue/reset/{department_id}",
    params(
        ("department_id" = i64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Queue reset", body = ApiResponse<ResetQueueResponseDto>),
        (status = 404, description = "Department not found")
    ),
    tag = "queue"
)]
pub async fn reset_queue(
    State(service): State<Arc<QueueService>>,
    AppPath(department_id): AppPath<i64>,
) -> Result<Json<ApiResponse<ResetQueueResponseDto>>> {
    let deleted = service.reset(department_id).await?;

    Ok(Json(ApiResponse::success(
        Some(ResetQueueResponseDto {
            department_id,
            deleted,
        }),
        Some("Queue reset successfully".to_string()),
        None,
    )))
}

/// Finished (successful/failed) tickets of a department, newest first
#[utoipa::path(
    get,
    path = "/queue/history/{department_id}",
    params(
        ("department_id" = i64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Queue history", body = ApiResponse<Vec<QueueHistoryEntryDto>>),
    ),
    tag = "queue"
)]
pub async fn get_queue_history(
    State(service): State<Arc<QueueService>>,
    AppPath(department_id): AppPath<i64>,
) -> Result<Json<ApiResponse<Vec<QueueHistoryEntryDto>>>> {
    let history = service.list_history(department_id).await?;
    Ok(Json(ApiResponse::listing(history)))
}

/// Get one ticket by ID
#[utoipa::path(
    get,
    path = "/queue/number/{id}",
    params(
        ("id" = Uuid, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Ticket found", body = ApiResponse<QueueEntryDto>),
        (status = 404, description = "Ticket not found")
    ),
    tag = "queue"
)]
pub async fn get_queue_number(
    State(service): State<Arc<QueueService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<QueueEntryDto>>> {
    let entry = service.get_ticket(id).await?;
    Ok(Json(ApiResponse::success(Some(entry), None, None)))
}
