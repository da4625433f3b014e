pub mod event;
pub mod locator;

pub use event::{load_trace, parse_trace, EventArgs, TraceEvent};
pub use locator::{locate_processes, ProcessRecord, ProcessRole};
