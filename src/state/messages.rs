#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunRequest {
    /// Interval tick from the periodic scheduler.
    Scheduled,
    /// `/run` hit on the HTTP listener.
    Manual,
}

