// ABOUTME: Revision monitoring using the type state pattern.
// ABOUTME: Exports state markers, the Monitor struct, and the wait entry point.

mod error;
mod revision_monitor;
mod state;
mod transitions;

pub use error::{MonitorError, MonitorErrorKind};
pub use revision_monitor::{DeployResult, Monitor, MonitorReport};
pub use state::{Completed, NotStarted, Polling};
pub use transitions::wait_for_revision;
