//! Stress tests for multistore.
//!
//! These runs hammer one store from several threads and count every
//! observation that breaks the store's consistency guarantees.

use crate::fixtures::{shared, SharedUserStore, User, UserStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Operations whose outcome matched expectations.
    pub successful_ops: usize,
    /// Operations that errored or observed an inconsistent state.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Merges per-thread counts into one result.
    fn collect(counts: impl IntoIterator<Item = (usize, usize)>, duration: Duration) -> Self {
        let (successful, failed) = counts
            .into_iter()
            .fold((0, 0), |(s, f), (ts, tf)| (s + ts, f + tf));
        Self::new(successful, failed, duration)
    }

    /// Logs a summary of the run.
    pub fn log_summary(&self, name: &str) {
        info!(
            test = name,
            total = self.total_ops,
            successful = self.successful_ops,
            failed = self.failed_ops,
            duration = ?self.duration,
            ops_per_second = format_args!("{:.2}", self.ops_per_second),
            "stress run finished"
        );
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Iterations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
        }
    }
}

/// Each thread repeatedly inserts its own user, looks it up through every
/// index, removes it, and checks that it is gone.
///
/// Threads share last names, so they contend on the same buckets.
pub fn stress_insert_find_remove(config: &StressConfig) -> StressTestResult {
    let fixture = Arc::new(UserStore::new());
    let barrier = Arc::new(Barrier::new(config.threads));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let fixture = Arc::clone(&fixture);
            let barrier = Arc::clone(&barrier);
            let operations = config.operations;
            thread::spawn(move || {
                let last_name = if t % 2 == 0 { "Doe" } else { "Smith" };
                let user = User::new(t as u64, &format!("User{t}"), last_name);
                let mut successful = 0usize;
                let mut failed = 0usize;

                barrier.wait();
                for _ in 0..operations {
                    let visible = fixture.insert(user.clone()).unwrap_or(false)
                        && fixture.by_last_name(last_name).contains(&user)
                        && fixture.find_unique(&fixture.id, &user.id).ok().flatten()
                            == Some(user.clone());

                    let gone = fixture.remove(&user)
                        && !fixture.by_last_name(last_name).contains(&user)
                        && !fixture.contains(&user);

                    if visible && gone {
                        successful += 1;
                    } else {
                        failed += 1;
                    }
                }
                (successful, failed)
            })
        })
        .collect();

    let counts = handles.into_iter().map(|h| h.join().unwrap_or((0, 1)));
    let result = StressTestResult::collect(counts.collect::<Vec<_>>(), start.elapsed());
    debug!(remaining = fixture.len(), "insert/find/remove run done");
    result
}

/// One writer flips a shared user between two last names and reindexes it
/// while readers check that the user is in exactly one bucket.
///
/// Each reader snapshot counts as one operation.
pub fn stress_update_vs_readers(config: &StressConfig) -> StressTestResult {
    let fixture = Arc::new(SharedUserStore::new());
    let user = shared(User::new(1, "John", "Doe"));
    let mut failed_setup = 0usize;
    if fixture.insert(Arc::clone(&user)).is_err() {
        failed_setup += 1;
    }

    let readers = config.threads.saturating_sub(1).max(1);
    let done = Arc::new(AtomicBool::new(false));
    let start = Instant::now();

    let writer = {
        let fixture = Arc::clone(&fixture);
        let user = Arc::clone(&user);
        let done = Arc::clone(&done);
        let operations = config.operations;
        thread::spawn(move || {
            let mut failed = 0usize;
            for i in 0..operations {
                let next = if i % 2 == 0 { "Miller" } else { "Doe" };
                user.write().last_name = Some(next.to_string());
                if !matches!(fixture.update(&user), Ok(true)) {
                    failed += 1;
                }
            }
            done.store(true, Ordering::Release);
            (operations - failed, failed)
        })
    };

    let handles: Vec<_> = (0..readers)
        .map(|_| {
            let fixture = Arc::clone(&fixture);
            let user = Arc::clone(&user);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut successful = 0usize;
                let mut failed = 0usize;
                while !done.load(Ordering::Acquire) {
                    match fixture.entry_set(&fixture.last_name) {
                        Ok(entries) => {
                            let hits = entries.values().filter(|set| set.contains(&user)).count();
                            if hits == 1 {
                                successful += 1;
                            } else {
                                failed += 1;
                            }
                        }
                        Err(_) => failed += 1,
                    }
                }
                (successful, failed)
            })
        })
        .collect();

    let mut counts = vec![writer.join().unwrap_or((0, 1))];
    counts.extend(handles.into_iter().map(|h| h.join().unwrap_or((0, 1))));
    counts.push((0, failed_setup));
    StressTestResult::collect(counts, start.elapsed())
}
