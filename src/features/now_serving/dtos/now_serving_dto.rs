use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::now_serving::models::QueueSignal;

/// Request DTO for announcing the ticket being served
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetCurrentlyServingDto {
    #[validate(range(min = 1, message = "department_id must be a positive id"))]
    pub department_id: i64,

    /// Display code being called, e.g. `TRE#007`
    #[validate(length(min = 1, max = 32, message = "queue_number must be 1-32 characters"))]
    pub queue_number: String,

    #[validate(length(max = 255, message = "transaction_name must not exceed 255 characters"))]
    pub transaction_name: Option<String>,

    #[serde(default)]
    pub priority: bool,
}

/// Query parameters for reading the currently-serving signal
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CurrentlyServingQuery {
    /// Restrict to one department
    pub department_id: Option<i64>,
}

/// One row of the all-departments serving board
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServingBoardEntryDto {
    pub department_id: i64,
    pub department_name: String,
    /// `null` when the department has nothing on display
    pub serving: Option<QueueSignal>,
}

/// Either one department's signal or the whole board
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CurrentlyServingResponseDto {
    Department(Option<QueueSignal>),
    Board(Vec<ServingBoardEntryDto>),
}
