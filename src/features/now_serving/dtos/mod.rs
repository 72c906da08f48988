mod now_serving_dto;

pub use now_serving_dto::*;
