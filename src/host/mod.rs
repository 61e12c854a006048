//! Lifecycle glue between the process and the scheduler.

use thiserror::Error;

use crate::host::dicomweb::ProbeError;
use crate::scheduler::SchedulerError;

pub mod agent;
pub mod dicomweb;

pub use agent::Agent;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
