use thiserror::Error;

/// Errors from the scheduler façade (§6). The ring itself has no error type
/// of its own — only the absent-fiber outcome and fatal invariant
/// violations described in spec §7, neither of which is recoverable enough
/// to model as a `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// A scheduler was asked to run with zero workers.
    #[error("scheduler must have at least one worker")]
    NoWorkers,
    /// A steal target index was out of range for the configured worker count.
    #[error("peer index {index} is out of range for {workers} workers")]
    NoSuchPeer { index: usize, workers: usize },
}
