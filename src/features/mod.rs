pub mod catalog;
pub mod now_serving;
pub mod queue;
