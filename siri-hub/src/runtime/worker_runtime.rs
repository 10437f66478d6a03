//! Bounded fire-and-forget worker pool for delivery tasks.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

pub(crate) const DEFAULT_MAX_IN_FLIGHT_DELIVERIES: usize = 32;

/// Caps the number of concurrently executing delivery tasks.
///
/// Spawning never blocks the caller and the caller never awaits completion;
/// excess tasks queue on the semaphore instead of growing the set of running
/// channels, so a large fan-out burst cannot exhaust resources.
#[derive(Clone)]
pub(crate) struct DeliveryWorkerPool {
    permits: Arc<Semaphore>,
}

impl DeliveryWorkerPool {
    pub(crate) fn new(max_in_flight: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Spawns one delivery task gated by the pool's permit cap.
    ///
    /// The returned handle is for tests; production callers drop it.
    pub(crate) fn spawn_delivery<F>(&self, delivery: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permits = self.permits.clone();
        tokio::spawn(async move {
            // Acquire fails only when the semaphore is closed, which this
            // pool never does.
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            delivery.await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::DeliveryWorkerPool;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn pool_caps_concurrent_deliveries() {
        let pool = DeliveryWorkerPool::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let running = running.clone();
                let peak = peak.clone();
                pool.spawn_delivery(async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.await.expect("delivery task should not panic");
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(running.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn all_queued_deliveries_eventually_run() {
        let pool = DeliveryWorkerPool::new(1);
        let completed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let completed = completed.clone();
                pool.spawn_delivery(async move {
                    completed.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.await.expect("delivery task should not panic");
        }

        assert_eq!(completed.load(Ordering::SeqCst), 8);
    }
}
