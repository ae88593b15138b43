//! Single-consumer serialized executor.
//!
//! The structural answer to concurrent mutation: one worker task owns the
//! state outright and drains an unbounded queue of jobs strictly in arrival
//! order, one at a time. Producer threads only enqueue and return, so no
//! lock ever guards the state itself; serialization happens at the queue
//! boundary.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// A unit of work executed against the serialized state.
pub type Job<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

// ----------------------------------------------------------------------------
// Executor Handle
// ----------------------------------------------------------------------------

/// Cloneable producer handle for a [`SerialExecutor`].
///
/// Any number of threads may hold clones and enqueue concurrently; every
/// call is non-blocking. A job may capture a clone of the handle and enqueue
/// further jobs (including delayed ones) from inside its own execution.
pub struct ExecutorHandle<S> {
    sender: mpsc::UnboundedSender<Job<S>>,
    /// Captured at spawn time so delayed jobs can be scheduled from plain
    /// producer threads that are not themselves inside the runtime.
    runtime: Handle,
    name: &'static str,
}

impl<S> Clone for ExecutorHandle<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            runtime: self.runtime.clone(),
            name: self.name,
        }
    }
}

impl<S: Send + 'static> ExecutorHandle<S> {
    /// Enqueue a job at the tail of the queue.
    ///
    /// After shutdown the job is dropped; producers are not surfaced an
    /// error, matching the drop-queued-work shutdown contract.
    pub fn enqueue(&self, job: impl FnOnce(&mut S) + Send + 'static) {
        if self.sender.send(Box::new(job)).is_err() {
            debug!(executor = self.name, "job dropped, worker stopped");
        }
    }

    /// Enqueue a job once `delay` has elapsed.
    ///
    /// The job joins the same total order as every other job at the moment
    /// it becomes ready; it never runs concurrently with anything else.
    pub fn enqueue_after(&self, delay: Duration, job: impl FnOnce(&mut S) + Send + 'static) {
        let sender = self.sender.clone();
        let name = self.name;
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if sender.send(Box::new(job)).is_err() {
                debug!(executor = name, "delayed job dropped, worker stopped");
            }
        });
    }
}

// ----------------------------------------------------------------------------
// Serial Executor
// ----------------------------------------------------------------------------

/// Owns the worker task that drains the queue and the state it guards.
pub struct SerialExecutor<S> {
    handle: ExecutorHandle<S>,
    worker: Option<JoinHandle<()>>,
}

impl<S: Send + 'static> SerialExecutor<S> {
    /// Spawn a worker that takes ownership of `state` and runs queued jobs
    /// against it in strict FIFO order.
    pub fn spawn(name: &'static str, state: S) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job<S>>();
        let runtime = Handle::current();
        let worker = tokio::spawn(async move {
            debug!(executor = name, "worker started");
            let mut state = state;
            while let Some(job) = receiver.recv().await {
                // A failing job must never take the queue down with it;
                // everything behind it still runs.
                let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| job(&mut state)));
                if let Err(panic) = outcome {
                    error!(
                        executor = name,
                        reason = panic_message(&panic),
                        "job panicked, continuing"
                    );
                }
            }
            debug!(executor = name, "worker stopped");
        });

        Self {
            handle: ExecutorHandle {
                sender,
                runtime,
                name,
            },
            worker: Some(worker),
        }
    }

    /// Get a producer handle.
    pub fn handle(&self) -> ExecutorHandle<S> {
        self.handle.clone()
    }

    /// Whether the worker is still draining the queue.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stop the worker. Idempotent.
    ///
    /// Jobs are synchronous closures, so the worker's only await point is
    /// the queue receive: an in-flight job always finishes, and anything
    /// still queued is dropped.
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

impl<S> Drop for SerialExecutor<S> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    /// Read the current state through the queue itself.
    async fn probe<S, T>(
        handle: &ExecutorHandle<S>,
        read: impl FnOnce(&mut S) -> T + Send + 'static,
    ) -> T
    where
        S: Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        handle.enqueue(move |state| {
            let _ = tx.send(read(state));
        });
        rx.await.expect("executor stopped")
    }

    #[tokio::test]
    async fn jobs_run_in_enqueue_order() {
        let executor = SerialExecutor::spawn("test", Vec::<u32>::new());
        let handle = executor.handle();

        for i in 0..100 {
            handle.enqueue(move |log| log.push(i));
        }

        let log = probe(&handle, |log| log.clone()).await;
        assert_eq!(log, (0..100).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_producers_never_interleave_mid_job() {
        // Each job appends its marker twice; serialized execution means the
        // pair is always adjacent no matter how producers race.
        let executor = SerialExecutor::spawn("test", Vec::<u32>::new());
        let handle = executor.handle();

        let producers: Vec<_> = (0..8)
            .map(|p| {
                let handle = handle.clone();
                tokio::spawn(async move {
                    for i in 0..50 {
                        let marker = p * 1000 + i;
                        handle.enqueue(move |log| {
                            log.push(marker);
                            log.push(marker);
                        });
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }

        let log = probe(&handle, |log| log.clone()).await;
        assert_eq!(log.len(), 8 * 50 * 2);
        for pair in log.chunks(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }

    #[tokio::test]
    async fn job_can_enqueue_further_jobs() {
        let executor = SerialExecutor::spawn("test", Vec::<&'static str>::new());
        let handle = executor.handle();

        let inner = handle.clone();
        handle.enqueue(move |log| {
            log.push("outer");
            inner.enqueue(|log| log.push("inner"));
        });
        handle.enqueue(|log| log.push("second"));

        let log = probe(&handle, |log| log.clone()).await;
        // The re-entrant job lands behind everything already queued.
        assert_eq!(log, vec!["outer", "second", "inner"]);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_job_joins_order_when_ready() {
        let executor = SerialExecutor::spawn("test", Vec::<&'static str>::new());
        let handle = executor.handle();

        handle.enqueue_after(Duration::from_millis(100), |log| log.push("delayed"));
        handle.enqueue(|log| log.push("immediate"));

        tokio::time::sleep(Duration::from_millis(150)).await;
        let log = probe(&handle, |log| log.clone()).await;
        assert_eq!(log, vec!["immediate", "delayed"]);
    }

    #[tokio::test]
    async fn panicking_job_does_not_poison_the_queue() {
        let executor = SerialExecutor::spawn("test", Vec::<u32>::new());
        let handle = executor.handle();

        handle.enqueue(|log| log.push(1));
        handle.enqueue(|_log| panic!("injected failure"));
        handle.enqueue(|log| log.push(2));

        let log = probe(&handle, |log| log.clone()).await;
        assert_eq!(log, vec![1, 2]);
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut executor = SerialExecutor::spawn("test", 0u32);
        assert!(executor.is_running());
        executor.shutdown();
        executor.shutdown();
        executor.shutdown();
    }

    #[tokio::test]
    async fn enqueue_after_shutdown_is_silent() {
        let mut executor = SerialExecutor::spawn("test", 0u32);
        let handle = executor.handle();
        executor.shutdown();

        // Give the abort a moment to take effect, then enqueue into the void.
        tokio::task::yield_now().await;
        handle.enqueue(|count| *count += 1);
        handle.enqueue_after(Duration::from_millis(1), |count| *count += 1);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
