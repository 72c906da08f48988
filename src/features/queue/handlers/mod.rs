mod queue_handler;

pub use queue_handler::*;
