//! Property monitors: per-(entity, property) subscription and fan-out.

mod monitor;

pub use monitor::PropertyMonitor;

pub(crate) use monitor::MonitorCallback;
