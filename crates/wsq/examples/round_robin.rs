//! A tiny multi-threaded demo: a pool of worker threads drain their local
//! rings, refill from the shared global queue, and steal from each other
//! once both run dry.
//!
//! Run with `cargo run --example round_robin`.

use crossbeam_utils::atomic::AtomicCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use wsq::{Backoff, Config, Scheduled, Scheduler};

/// A fiber stand-in: an id plus the intrusive link slot `Scheduled` needs.
/// Leaked so its link cell outlives every thread that might touch it,
/// matching the "owned by the execution context's fiber pool" contract
/// `Scheduled`'s doc comment describes.
#[derive(Clone, Copy)]
struct Job {
    link: &'static AtomicCell<Option<Job>>,
    id: u64,
}

impl Scheduled for Job {
    fn sched_link(&self) -> &AtomicCell<Option<Job>> {
        self.link
    }
}

fn job(id: u64) -> Job {
    Job {
        link: Box::leak(Box::new(AtomicCell::new(None))),
        id,
    }
}

const WORKERS: usize = 4;
const JOBS: u64 = 2_000;

fn main() {
    let pool = Scheduler::<Job, 256>::pool(WORKERS, Config::metrics_enabled())
        .expect("pool of at least one worker");

    // Seed worker 0 with every job; the rest start empty and must steal.
    for id in 0..JOBS {
        pool[0].enqueue(job(id));
    }

    let completed = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = pool
        .into_iter()
        .enumerate()
        .map(|(idx, worker)| {
            let completed = Arc::clone(&completed);
            thread::spawn(move || {
                let mut done = 0usize;
                let mut backoff = Backoff::new();
                while completed.load(Ordering::Relaxed) < JOBS as usize {
                    match worker.next() {
                        Some(_job) => {
                            done += 1;
                            completed.fetch_add(1, Ordering::Relaxed);
                            backoff.reset();
                        }
                        None => {
                            if completed.load(Ordering::Relaxed) >= JOBS as usize {
                                break;
                            }
                            backoff.snooze();
                        }
                    }
                }
                if let Some(snapshot) = worker.metrics() {
                    println!(
                        "worker {idx}: ran {done} jobs (pushes={}, local_pops={}, steals={})",
                        snapshot.pushes, snapshot.local_pops, snapshot.fibers_stolen
                    );
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    println!("all {JOBS} jobs completed");
}
