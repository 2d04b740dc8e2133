use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use crossbeam_utils::atomic::AtomicCell;
use std::sync::Arc;
use std::thread;
use wsq::{local_queue, Config, GlobalQueue, Scheduled};

const RING_CAP: usize = 256;

#[derive(Clone, Copy)]
struct Job(&'static AtomicCell<Option<Job>>, u64);

impl Scheduled for Job {
    fn sched_link(&self) -> &AtomicCell<Option<Job>> {
        self.0
    }
}

fn job(id: u64) -> Job {
    Job(Box::leak(Box::new(AtomicCell::new(None))), id)
}

/// Single owner: push then get, no contention. The floor for how fast the
/// fast paths in §4.2/§4.5 can go.
fn bench_push_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_get");
    group.throughput(Throughput::Elements(10_000));

    group.bench_function("uncontended", |b| {
        b.iter(|| {
            let global = Arc::new(GlobalQueue::new());
            let (owner, _stealer) = local_queue::<Job, RING_CAP>(Arc::clone(&global), Config::quiet());
            for id in 0..10_000u64 {
                owner.push(job(id));
                black_box(owner.get());
            }
        });
    });

    group.finish();
}

/// One producer overflowing its ring into the global queue continuously,
/// forcing the §4.3 slow path on every other push.
fn bench_overflow(c: &mut Criterion) {
    let mut group = c.benchmark_group("overflow");
    group.throughput(Throughput::Elements(10_000));

    group.bench_function("slow_path", |b| {
        b.iter(|| {
            let global = Arc::new(GlobalQueue::new());
            let (owner, _stealer) = local_queue::<Job, 8>(Arc::clone(&global), Config::quiet());
            for id in 0..10_000u64 {
                owner.push(job(id));
            }
        });
    });

    group.finish();
}

/// A producer filling its ring while one or more threads continuously
/// steal from it, measuring steal throughput under contention.
fn bench_steal_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("steal");

    for thieves in [1usize, 2, 4] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{thieves}_thieves")),
            &thieves,
            |b, &thieves| {
                b.iter(|| {
                    let global = Arc::new(GlobalQueue::new());
                    let (victim, victim_stealer) =
                        local_queue::<Job, RING_CAP>(Arc::clone(&global), Config::quiet());
                    for id in 0..RING_CAP as u64 {
                        victim.push(job(id));
                    }

                    let handles: Vec<_> = (0..thieves)
                        .map(|_| {
                            let stealer = victim_stealer.clone();
                            let global = Arc::clone(&global);
                            thread::spawn(move || {
                                let (thief, _thief_stealer) =
                                    local_queue::<Job, RING_CAP>(global, Config::quiet());
                                let mut stolen = 0usize;
                                for _ in 0..RING_CAP {
                                    // Drain anything left from the previous steal before
                                    // attempting another — `steal_from` requires an empty
                                    // destination ring.
                                    while thief.get().is_some() {
                                        stolen += 1;
                                    }
                                    if thief.steal_from(&stealer).is_some() {
                                        stolen += 1;
                                    }
                                }
                                black_box(stolen);
                            })
                        })
                        .collect();

                    for h in handles {
                        h.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_push_get, bench_overflow, bench_steal_contention);
criterion_main!(benches);
