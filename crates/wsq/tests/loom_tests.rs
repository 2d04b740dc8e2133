//! Loom-based concurrency tests for the local ring's head/tail protocol.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! Loom exhaustively explores thread interleavings rather than relying on
//! chance scheduling, so it can find the torn-read and lost-update bugs
//! that only show up under a specific race. We model the protocol
//! in isolation at a small capacity (as the teacher's `loom_tests.rs`
//! does) rather than loom-instrumenting the production `wsq::ring` types
//! directly, since those use plain `std::sync::atomic` unconditionally.

#![cfg(feature = "loom")]

use loom::cell::UnsafeCell;
use loom::sync::atomic::{AtomicU32, Ordering};
use loom::sync::Arc;
use loom::thread;

const CAP: u32 = 4;

/// Single-producer / single-stealer model of one ring: push/get on the
/// owner side, grab on the stealer side (spec §4.2, §4.5, §4.7).
struct ModelRing {
    head: AtomicU32,
    tail: AtomicU32,
    buffer: [UnsafeCell<u32>; CAP as usize],
}

unsafe impl Send for ModelRing {}
unsafe impl Sync for ModelRing {}

impl ModelRing {
    fn new() -> Self {
        Self {
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
            buffer: [
                UnsafeCell::new(0),
                UnsafeCell::new(0),
                UnsafeCell::new(0),
                UnsafeCell::new(0),
            ],
        }
    }

    fn idx(pos: u32) -> usize {
        (pos % CAP) as usize
    }

    /// Owner-only fast-path push; returns false if observed full (the
    /// model has no global queue to overflow into).
    fn push(&self, value: u32) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        if tail.wrapping_sub(head) >= CAP {
            return false;
        }
        let idx = Self::idx(tail);
        self.buffer[idx].with_mut(|p| unsafe { *p = value });
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        true
    }

    /// Owner-only get (spec §4.5).
    fn get(&self) -> Option<u32> {
        let mut head = self.head.load(Ordering::Acquire);
        loop {
            let tail = self.tail.load(Ordering::Relaxed);
            if tail == head {
                return None;
            }
            let idx = Self::idx(head);
            let candidate = self.buffer[idx].with(|p| unsafe { *p });
            match self.head.compare_exchange(
                head,
                head.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(candidate),
                Err(actual) => head = actual,
            }
        }
    }

    /// Peer-callable grab: claims half the ring, returns the count taken
    /// (spec §4.7). The model ignores the stolen values (no destination
    /// buffer) since loom's state space only needs to confirm the counter
    /// protocol, not data movement.
    fn grab(&self) -> u32 {
        loop {
            let head = self.head.load(Ordering::Acquire);
            let tail = self.tail.load(Ordering::Acquire);
            let n = tail.wrapping_sub(head) / 2;
            if n == 0 {
                return 0;
            }
            if n > CAP / 2 {
                continue;
            }
            match self.head.compare_exchange(
                head,
                head.wrapping_add(n),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return n,
                Err(_) => continue,
            }
        }
    }
}

/// Owner pushes, then a single local `get` races a single peer `grab`:
/// exactly one of the two CASes on `head` should observe consistent
/// accounting (spec §8 scenario 5, restricted to loom's tractable state
/// space).
#[test]
fn loom_get_races_grab() {
    loom::model(|| {
        let ring = Arc::new(ModelRing::new());
        assert!(ring.push(1));
        assert!(ring.push(2));

        let ring_get = Arc::clone(&ring);
        let getter = thread::spawn(move || ring_get.get());

        let ring_grab = Arc::clone(&ring);
        let grabber = thread::spawn(move || ring_grab.grab());

        let got = getter.join().unwrap();
        let grabbed = grabber.join().unwrap();

        // At most 2 fibers existed; neither operation can over-claim, and
        // together they must account for no more than what was pushed.
        let got_count = got.is_some() as u32;
        assert!(got_count + grabbed <= 2);

        // head must never run past tail.
        let head = ring.head.load(Ordering::SeqCst);
        let tail = ring.tail.load(Ordering::SeqCst);
        assert!(tail.wrapping_sub(head) <= CAP);
    });
}

/// Two concurrent stealers racing `grab` against the same victim must
/// never both succeed in claiming overlapping slots.
#[test]
fn loom_concurrent_grabs_dont_double_claim() {
    loom::model(|| {
        let ring = Arc::new(ModelRing::new());
        assert!(ring.push(1));
        assert!(ring.push(2));
        assert!(ring.push(3));
        assert!(ring.push(4));

        let ring_a = Arc::clone(&ring);
        let a = thread::spawn(move || ring_a.grab());

        let ring_b = Arc::clone(&ring);
        let b = thread::spawn(move || ring_b.grab());

        let na = a.join().unwrap();
        let nb = b.join().unwrap();

        // Four fibers were present; total claimed by both grabs plus
        // whatever's left in the ring must equal four, with no double count.
        let head = ring.head.load(Ordering::SeqCst);
        let tail = ring.tail.load(Ordering::SeqCst);
        let remaining = tail.wrapping_sub(head);
        assert_eq!(na + nb + remaining, 4);
    });
}

/// Push and a concurrent grab: the producer must observe reclaimed
/// capacity via its next push once the stealer's `head` advance is
/// visible (spec §5 "Peer stealer -> owner producer").
#[test]
fn loom_push_observes_reclaimed_capacity() {
    loom::model(|| {
        let ring = Arc::new(ModelRing::new());
        for v in 1..=CAP {
            assert!(ring.push(v));
        }
        // Ring is now full; a concurrent grab must free half before the
        // owner's next push can land.
        let ring_grab = Arc::clone(&ring);
        let grabber = thread::spawn(move || ring_grab.grab());

        let n = grabber.join().unwrap();
        assert!(n >= 1);

        // After the grab committed, the owner must be able to push again.
        assert!(ring.push(99));
    });
}
