mod now_serving_handler;

pub use now_serving_handler::*;
