//! Fixed-size worker pool over a bounded queue.
//!
//! `submit` waits while the queue is full; `finish` closes the queue and
//! waits until every worker has drained it. Dropping the pool without
//! calling `finish` aborts the workers and abandons queued items.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::error::WorkerError;

pub struct WorkerPool<T> {
    queue: mpsc::Sender<T>,
    workers: JoinSet<()>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Start `workers` tasks, each running `handler` on one item at a time.
    pub fn spawn<F, Fut>(workers: usize, capacity: usize, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (queue, rx) = mpsc::channel::<T>(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let handler = Arc::new(handler);

        let mut set = JoinSet::new();
        for _ in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let handler = Arc::clone(&handler);
            set.spawn(async move {
                loop {
                    // Hold the lock only while waiting for the next item.
                    let item = rx.lock().await.recv().await;
                    match item {
                        Some(item) => handler(item).await,
                        None => break,
                    }
                }
            });
        }
        Self { queue, workers: set }
    }

    /// Enqueue one item, waiting for queue space.
    pub async fn submit(&self, item: T) -> Result<(), WorkerError> {
        self.queue
            .send(item)
            .await
            .map_err(|_| WorkerError::Sink("worker pool stopped".into()))
    }

    /// Close the queue and wait for all workers to finish.
    pub async fn finish(self) {
        let Self { queue, mut workers } = self;
        drop(queue);
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "pool worker failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn finish_waits_for_every_item() {
        let done = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&done);
        let pool = WorkerPool::spawn(5, 2, move |n: u64| {
            let counter = Arc::clone(&counter);
            async move {
                tokio::time::sleep(Duration::from_millis(n % 3)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        for n in 0..50 {
            pool.submit(n).await.unwrap();
        }
        pool.finish().await;
        assert_eq!(done.load(Ordering::SeqCst), 50);
    }

    #[tokio::test]
    async fn runs_at_most_n_items_at_once() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (r, p) = (Arc::clone(&running), Arc::clone(&peak));
        let pool = WorkerPool::spawn(3, 10, move |_: u32| {
            let (running, peak) = (Arc::clone(&r), Arc::clone(&p));
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }
        });
        for n in 0..12 {
            pool.submit(n).await.unwrap();
        }
        pool.finish().await;
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn handler_state_dropped_after_finish() {
        let (tx, mut rx) = mpsc::channel::<u8>(16);
        let pool = WorkerPool::spawn(2, 4, move |n: u8| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(n).await;
            }
        });
        pool.submit(1).await.unwrap();
        pool.submit(2).await.unwrap();
        pool.finish().await;

        let mut got = Vec::new();
        while let Some(n) = rx.recv().await {
            got.push(n);
        }
        got.sort();
        assert_eq!(got, vec![1, 2]);
    }
}
