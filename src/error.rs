//! Error types used by the slotvisor runtime, ticks and collaborators.
//!
//! This module defines the error enums of the crate:
//!
//! - [`RuntimeError`]: errors raised by the scheduler itself.
//! - [`TaskError`]: errors raised by a single tick of a periodic task.
//! - [`InventoryError`]: failures talking to the external inventory.
//! - [`ConfigError`]: startup configuration problems (the only fatal kind).
//!
//! All types provide `as_label` for logging. The engine never branches on the
//! inventory error kind: every variant means "this item contributed nothing".

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the scheduler runtime.
///
/// These represent failures in the orchestration itself,
/// such as a shutdown sequence exceeding its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some ticks were still in flight.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the tasks that were still mid-tick.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use slotvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// # Errors produced by one tick of a periodic task.
///
/// A failed tick is logged and the next tick runs on schedule; there is no
/// retry in between.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Tick exceeded its timeout duration.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Tick failed; the next scheduled tick is the retry.
    #[error("tick failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Tick observed scheduler cancellation and stopped early.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use slotvisor::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }
}

/// # Failures of a single inventory round trip.
///
/// Each variant carries enough detail for a log line and nothing more.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The request could not be sent or the body could not be read.
    #[error("{operation}: transport error: {error}")]
    Transport {
        /// Inventory operation name.
        operation: &'static str,
        /// Underlying transport message.
        error: String,
    },

    /// The server answered with a non-success HTTP status.
    #[error("{operation}: HTTP {status}")]
    Status {
        /// Inventory operation name.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// The body did not have the expected shape.
    #[error("{operation}: malformed response: {error}")]
    Decode {
        /// Inventory operation name.
        operation: &'static str,
        /// Decoder message.
        error: String,
    },

    /// The server understood the request and refused it.
    #[error("{operation}: rejected: {body}")]
    Rejected {
        /// Inventory operation name.
        operation: &'static str,
        /// Raw response excerpt.
        body: String,
    },

    /// The claim page carried no transaction token.
    #[error("claim: no ticket in response")]
    MissingTicket,

    /// The confirm page carried no order identifier.
    #[error("confirm: no order id in response: {body}")]
    MissingOrderId {
        /// Raw response excerpt.
        body: String,
    },
}

impl InventoryError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            InventoryError::Transport { .. } => "inventory_transport",
            InventoryError::Status { .. } => "inventory_status",
            InventoryError::Decode { .. } => "inventory_decode",
            InventoryError::Rejected { .. } => "inventory_rejected",
            InventoryError::MissingTicket => "inventory_missing_ticket",
            InventoryError::MissingOrderId { .. } => "inventory_missing_order_id",
        }
    }
}

/// # Startup configuration failures.
///
/// Detected once before scheduling starts; the binary exits on them.
/// During hot reload the same errors only fail that reload tick.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value was present but unusable.
    #[error("invalid configuration: {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The settings file could not be watched for changes.
    #[error("failed to watch configuration: {0}")]
    Watch(String),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Load(_) => "config_load",
            ConfigError::Invalid { .. } => "config_invalid",
            ConfigError::Client(_) => "config_client",
            ConfigError::Watch(_) => "config_watch",
        }
    }
}
