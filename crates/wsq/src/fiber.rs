//! The schedulable-unit contract.
//!
//! Fiber creation, stack allocation, and context switching are external
//! collaborators (spec §1, §6) — this crate only needs a cheap, `Copy`
//! handle that can be threaded through the ring, the global queue, and the
//! intrusive chain that connects them. `Scheduled` is that contract: it asks
//! implementors for one mutable link slot, the `schedlink` named in §6.
//!
//! A handle is expected to be a thin, pointer-sized reference to a fiber
//! object owned elsewhere (the execution context's fiber pool); the queue
//! never allocates, drops, or otherwise owns the fibers it moves around.

use crossbeam_utils::atomic::AtomicCell;

/// A schedulable unit that can be threaded through an intrusive chain.
///
/// The link returned by [`Scheduled::sched_link`] is valid only while the
/// handle is linked into a [`FiberChain`](crate::chain::FiberChain), a local
/// ring ([`Owner`](crate::ring::Owner)), or a
/// [`GlobalQueue`](crate::global::GlobalQueue) — exactly one of those at a
/// time, per spec §3's single-queue-membership invariant. Reading the link
/// outside that window is a logic error but not memory-unsafe.
///
/// The link slot is an [`AtomicCell`] rather than a plain `Cell`: a fiber
/// handle is `Copy + Send` and routinely crosses threads (a stolen fiber's
/// handle is copied into another worker's ring), so a `&'static` reference
/// to its link must itself be `Send`, which requires the referent to be
/// `Sync`. `Cell` is never `Sync`; `AtomicCell<Option<Self>>` is, for any
/// `Self: Send`.
pub trait Scheduled: Copy + Send {
    /// The successor slot used to build chains for the global queue.
    fn sched_link(&self) -> &AtomicCell<Option<Self>>;
}
