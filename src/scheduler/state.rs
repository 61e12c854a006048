/// Lifecycle of a [`Scheduler`](crate::scheduler::scheduler::Scheduler).
///
/// `Setup -> Running` only through `start()`, `Running -> Done` only through `stop()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Setup,
    Running,
    Done,
}

impl SchedulerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerState::Setup => "setup",
            SchedulerState::Running => "running",
            SchedulerState::Done => "done",
        }
    }
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
