//! One refresh worker per account, started and joined by a single supervisor.

use std::time::Duration;

use thiserror::Error;

use crate::config::error::AccountError;
use crate::utils::constants::WORKER_TICK_MS;

pub mod scheduler;
pub mod state;
pub mod worker;

pub use scheduler::Scheduler;
pub use state::SchedulerState;
pub use worker::RefreshWorker;

/// How often a worker looks at the scheduler state and its refresh deadline.
pub const WORKER_TICK: Duration = Duration::from_millis(WORKER_TICK_MS);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("scheduler can only be started once (current state: {0})")]
    AlreadyStarted(SchedulerState),

    #[error(transparent)]
    Account(#[from] AccountError),
}
