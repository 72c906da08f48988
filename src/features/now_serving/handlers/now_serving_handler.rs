use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::now_serving::dtos::{
    CurrentlyServingQuery, CurrentlyServingResponseDto, SetCurrentlyServingDto,
};
use crate::features::now_serving::models::{QueueSignal, SignalKind};
use crate::features::now_serving::services::NowServingPublisher;
use crate::shared::types::ApiResponse;

/// Set the ticket currently being served at a department
#[utoipa::path(
    post,
    path = "/queue/currently-serving",
    request_body = SetCurrentlyServingDto,
    responses(
        (status = 200, description = "Signal published", body = ApiResponse<QueueSignal>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Department not found")
    ),
    tag = "now-serving"
)]
pub async fn set_currently_serving(
    State(publisher): State<Arc<NowServingPublisher>>,
    AppJson(dto): AppJson<SetCurrentlyServingDto>,
) -> Result<Json<ApiResponse<QueueSignal>>> {
    dto.validate()?;

    let signal = publisher
        .set_currently_serving(
            dto.department_id,
            &dto.queue_number,
            dto.transaction_name.as_deref(),
            dto.priority,
        )
        .await?;

    Ok(Json(ApiResponse::success(
        Some(signal),
        Some("Currently serving number set successfully".to_string()),
        None,
    )))
}

/// Get the currently served ticket of one department, or of every department
///
/// With `department_id` the data is the signal or `null`. Without it the data
/// is one row per department, with `serving: null` where nothing is displayed.
#[utoipa::path(
    get,
    path = "/queue/currently-serving",
    params(CurrentlyServingQuery),
    responses(
        (status = 200, description = "Serving signal(s)", body = ApiResponse<CurrentlyServingResponseDto>),
    ),
    tag = "now-serving"
)]
pub async fn get_currently_serving(
    State(publisher): State<Arc<NowServingPublisher>>,
    AppQuery(query): AppQuery<CurrentlyServingQuery>,
) -> Result<Json<ApiResponse<CurrentlyServingResponseDto>>> {
    let data = match query.department_id {
        Some(department_id) => CurrentlyServingResponseDto::Department(
            publisher
                .current_for(SignalKind::CurrentlyServing, department_id)
                .await,
        ),
        None => CurrentlyServingResponseDto::Board(publisher.serving_board().await?),
    };

    Ok(Json(ApiResponse::success(Some(data), None, None)))
}

/// Latest issued ticket of every department that has a live signal
#[utoipa::path(
    get,
    path = "/queue/latest-updates",
    responses(
        (status = 200, description = "Latest issued tickets", body = ApiResponse<Vec<QueueSignal>>),
    ),
    tag = "now-serving"
)]
pub async fn get_latest_updates(
    State(publisher): State<Arc<NowServingPublisher>>,
) -> Result<Json<ApiResponse<Vec<QueueSignal>>>> {
    let signals = publisher.current_all(SignalKind::LatestIssued).await?;
    Ok(Json(ApiResponse::listing(signals)))
}

/// Latest issued ticket of one department (`null` when none is live)
#[utoipa::path(
    get,
    path = "/queue/latest-update/{department_id}",
    params(
        ("department_id" = i64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Latest issued ticket or null", body = ApiResponse<QueueSignal>),
    ),
    tag = "now-serving"
)]
pub async fn get_latest_update(
    State(publisher): State<Arc<NowServingPublisher>>,
    AppPath(department_id): AppPath<i64>,
) -> Result<Json<ApiResponse<Option<QueueSignal>>>> {
    let signal = publisher
        .current_for(SignalKind::LatestIssued, department_id)
        .await;
    Ok(Json(ApiResponse::success(Some(signal), None, None)))
}
