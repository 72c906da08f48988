mod signal;

pub use signal::{QueueSignal, SignalKind};
