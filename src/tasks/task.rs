//! # Task abstraction.
//!
//! A [`Task`] is the body of one scheduled job. The scheduler calls
//! [`Task::spawn`] once per tick and drives the returned future to completion,
//! timeout or cancellation. The common handle is [`TaskRef`].
//!
//! The future receives a [`CancellationToken`] and should observe it at its
//! await points so shutdown does not wait on in-flight work longer than needed.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Boxed future produced by one tick.
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable tick body.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use slotvisor::{BoxTaskFuture, Task, TaskError};
///
/// struct Heartbeat;
///
/// impl Task for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(TaskError::Canceled);
///             }
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Stable job name, used in events and logs.
    fn name(&self) -> &str;

    /// Creates the future for one tick.
    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture;
}
