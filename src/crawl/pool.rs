// src/crawl/pool.rs
// =============================================================================
// A bounded worker pool for crawl jobs.
//
// How it works:
// - start() spawns the job as a tokio task and returns immediately
// - inside the task, a semaphore ("the gate") with `max_concurrency` permits
//   decides when the job may actually run
// - wait() blocks until every started job has finished
//
// Two counters are kept next to the gate:
// - `available`: max_concurrency minus the jobs that are queued or running.
//   It can go negative when more jobs are queued than there are permits.
//   The crawl driver reads it to decide whether to slow down.
// - `active`: jobs started but not finished. It is incremented inside
//   start(), before the task even exists, so wait() can never miss a job
//   that was just dispatched.
//
// Rust concepts:
// - Arc: the pool state is shared between the pool handle and every task
// - Drop guards: counters are restored even if a job panics
// =============================================================================

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore};

// A unit of work handed to the pool
//
// The label only shows up in debug logs.
pub struct CrawlJob {
    pub label: String,
    routine: BoxFuture<'static, ()>,
}

impl CrawlJob {
    pub fn new<F>(label: impl Into<String>, routine: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            label: label.into(),
            routine: routine.boxed(),
        }
    }
}

#[derive(Debug)]
struct PoolState {
    max_concurrency: usize,
    gate: Semaphore,
    available: Mutex<isize>,
    active: AtomicUsize,
    idle: Notify,
}

#[derive(Debug, Clone)]
pub struct WorkerPool {
    state: Arc<PoolState>,
}

impl WorkerPool {
    // Panics if `max_concurrency` is zero; CrawlConfig::validate rejects that
    // before a pool is ever built.
    pub fn new(max_concurrency: usize) -> Self {
        assert!(max_concurrency > 0, "worker pool needs at least one slot");

        Self {
            state: Arc::new(PoolState {
                max_concurrency,
                gate: Semaphore::new(max_concurrency),
                available: Mutex::new(max_concurrency as isize),
                active: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.state.max_concurrency
    }

    // Free slots right now (negative when jobs are queued behind the gate)
    pub fn available_slots(&self) -> isize {
        *self.state.available.lock()
    }

    // Jobs started and not yet finished
    pub fn active_jobs(&self) -> usize {
        self.state.active.load(Ordering::SeqCst)
    }

    // Launches a job without waiting for it
    //
    // Must be called from within a tokio runtime. Jobs have no error channel:
    // a routine handles its own failures.
    pub fn start(&self, job: CrawlJob) {
        self.state.active.fetch_add(1, Ordering::SeqCst);

        let state = self.state.clone();
        tokio::spawn(async move {
            let CrawlJob { label, routine } = job;
            let slot = JobSlot::claim(state.clone());

            log::debug!("Acquiring lock for: {}", label);
            match state.gate.acquire().await {
                Ok(permit) => {
                    routine.await;
                    drop(permit);
                    log::debug!("Releasing lock for: {}", label);
                }
                // The gate is never closed, but don't run ungated if it is
                Err(e) => log::error!("Gate closed, dropping job {}: {}", label, e),
            }

            drop(slot);
        });
    }

    // Blocks until the pool has no active jobs
    //
    // Jobs started while waiting (for example by other jobs) are waited for
    // too. Returns immediately on an idle pool.
    pub async fn wait(&self) {
        loop {
            // Register interest before checking, so a notification that
            // fires in between is not lost
            let idle = self.state.idle.notified();
            if self.state.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            idle.await;
        }
    }
}

// Holds one job's share of the counters for the lifetime of its task
struct JobSlot {
    state: Arc<PoolState>,
}

impl JobSlot {
    fn claim(state: Arc<PoolState>) -> Self {
        *state.available.lock() -= 1;
        Self { state }
    }
}

impl Drop for JobSlot {
    fn drop(&mut self) {
        *self.state.available.lock() += 1;
        if self.state.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.state.idle.notify_waiters();
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a semaphore?
//    - A semaphore holds N permits; acquire() waits until one is free
//    - The permit is given back when it is dropped
//    - So at most N jobs can be past acquire() at any moment
//
// 2. Why count active jobs in start() and not inside the task?
//    - tokio::spawn only schedules the task, it may not run for a while
//    - If the task did the counting, wait() could look at the counter
//      before the task ever ran and wrongly conclude the pool is idle
//
// 3. What is Notify?
//    - A way for one task to wake up others without sending data
//    - notify_waiters() wakes every Notified future created before the call
//
// 4. What is a drop guard?
//    - A value whose Drop impl undoes something
//    - Drop also runs while a panic unwinds, so counters stay correct
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_never_more_jobs_than_capacity() {
        let pool = WorkerPool::new(3);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        for i in 0..40 {
            let running = running.clone();
            let peak = peak.clone();
            let finished = finished.clone();
            pool.start(CrawlJob::new(format!("job {i}"), async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                finished.fetch_add(1, Ordering::SeqCst);
            }));
        }

        pool.wait().await;

        assert_eq!(finished.load(Ordering::SeqCst), 40);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_wait_sees_a_job_started_just_before() {
        let pool = WorkerPool::new(2);
        let done = Arc::new(AtomicUsize::new(0));

        let flag = done.clone();
        pool.start(CrawlJob::new("only", async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(1, Ordering::SeqCst);
        }));
        pool.wait().await;

        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(pool.active_jobs(), 0);
    }

    #[tokio::test]
    async fn test_wait_on_idle_pool_returns() {
        let pool = WorkerPool::new(1);
        tokio::time::timeout(Duration::from_secs(1), pool.wait())
            .await
            .expect("idle pool should not block");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slots_go_negative_then_recover() {
        let pool = WorkerPool::new(2);
        let release = Arc::new(Notify::new());

        for i in 0..5 {
            let release = release.clone();
            pool.start(CrawlJob::new(format!("blocked {i}"), async move {
                release.notified().await;
            }));
        }

        // Let every task claim its slot
        for _ in 0..100 {
            if pool.available_slots() == -3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(pool.available_slots(), -3);

        // Unblock jobs until the pool drains
        while pool.active_jobs() > 0 {
            release.notify_waiters();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        pool.wait().await;

        assert_eq!(pool.available_slots(), 2);
    }

    #[tokio::test]
    async fn test_jobs_can_start_more_jobs() {
        let pool = WorkerPool::new(2);
        let count = Arc::new(AtomicUsize::new(0));

        let inner_pool = pool.clone();
        let outer_count = count.clone();
        pool.start(CrawlJob::new("parent", async move {
            outer_count.fetch_add(1, Ordering::SeqCst);
            let inner_count = outer_count.clone();
            inner_pool.start(CrawlJob::new("child", async move {
                inner_count.fetch_add(1, Ordering::SeqCst);
            }));
        }));
        pool.wait().await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panicking_job_releases_its_slot() {
        let pool = WorkerPool::new(1);
        pool.start(CrawlJob::new("boom", async {
            panic!("job failure");
        }));
        pool.wait().await;

        assert_eq!(pool.available_slots(), 1);
        assert_eq!(pool.active_jobs(), 0);
    }
}
