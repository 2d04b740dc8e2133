//! wsq - a bounded, lock-free runnable queue for an M:N fiber scheduler
//!
//! Each worker thread owns one fixed-capacity ring buffer of fibers. Pushes
//! land on the owner's tail with no locking; other workers may steal from
//! the head concurrently. When a ring fills, half its fibers spill to a
//! shared, mutex-protected overflow queue; an idle worker refills from that
//! queue before resorting to stealing from a peer.
//!
//! # Key properties
//!
//! - Single-producer, multi-consumer per ring: only the owning worker ever
//!   pushes or locally pops; any worker may steal.
//! - 128-byte cache-line alignment between the producer-hot tail and the
//!   consumer-hot head (false-sharing elimination).
//! - A steal always takes half the victim's fibers, leaving both sides with
//!   work to make progress on.
//! - Two outcomes only: a fiber, or absence. There is no recoverable error
//!   on the ring's hot path — a caller contract breach (e.g. stealing into
//!   a non-empty ring) is a fatal assertion, not a `Result`.
//!
//! # Example
//!
//! ```
//! use crossbeam_utils::atomic::AtomicCell;
//! use wsq::{Config, Scheduled, Scheduler};
//!
//! #[derive(Clone, Copy)]
//! struct Job(&'static AtomicCell<Option<Job>>, u64);
//!
//! impl Scheduled for Job {
//!     fn sched_link(&self) -> &AtomicCell<Option<Job>> {
//!         self.0
//!     }
//! }
//!
//! let pool = Scheduler::<Job, 256>::pool(4, Config::quiet()).unwrap();
//! let link = Box::leak(Box::new(AtomicCell::new(None)));
//! pool[0].enqueue(Job(link, 1));
//! assert_eq!(pool[0].next().map(|j| j.1), Some(1));
//! ```

mod backoff;
mod chain;
mod config;
mod error;
mod fiber;
mod global;
mod invariants;
mod metrics;
mod ring;
mod scheduler;

pub use backoff::Backoff;
pub use chain::FiberChain;
pub use config::Config;
pub use error::SchedulerError;
pub use fiber::Scheduled;
pub use global::GlobalQueue;
pub use metrics::{Metrics, MetricsSnapshot};
pub use ring::{local_queue, Owner, Stealer};
pub use scheduler::Scheduler;
