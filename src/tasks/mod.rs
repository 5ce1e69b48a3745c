//! # Tick bodies and their schedules.
//!
//! - [`Task`] - trait for one async, cancelable tick body
//! - [`TaskFn`] - closure-backed implementation
//! - [`TaskRef`] - shared handle (`Arc<dyn Task>`)
//! - [`TickSpec`] - task plus its interval, first-fire rule and timeout

mod spec;
mod task;
mod task_fn;

pub use spec::{FirstTick, TickSpec};
pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
