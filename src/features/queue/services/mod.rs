mod estimator;
mod lifecycle;
mod query_service;
mod queue_service;
mod sequencer;

pub use estimator::WaitTimeEstimator;
pub use lifecycle::TicketLifecycle;
pub use query_service::QueueQueryService;
pub use queue_service::QueueService;
pub use sequencer::{IssuedTicket, TicketSequencer};
