mod now_serving_service;

pub use now_serving_service::NowServingPublisher;
