//! # Metrics Module
//!
//! Contatori di processo, condivisi tra tutte le richieste.
//!
//! ## Responsabilità:
//! - Definisce il trait `MetricsSink`, la capability iniettata nell'orchestratore
//! - Fornisce `AtomicMetrics`, implementazione lock-free basata su `AtomicU64`
//! - Espone uno snapshot serializzabile per `GET /api/metrics`

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub const IMAGE_BATCHES: &str = "image_batches";
pub const IMAGE_FILES_TOTAL: &str = "image_files_total";
pub const IMAGE_FAILURES: &str = "image_failures";
pub const VIDEO_BATCHES: &str = "video_batches";
pub const VIDEO_FAILURES: &str = "video_failures";

/// Anything that can count named events
pub trait MetricsSink: Send + Sync {
    fn incr(&self, key: &str, by: u64);
}

/// The five service counters
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    image_batches: AtomicU64,
    image_files_total: AtomicU64,
    image_failures: AtomicU64,
    video_batches: AtomicU64,
    video_failures: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, key: &str) -> Option<&AtomicU64> {
        match key {
            IMAGE_BATCHES => Some(&self.image_batches),
            IMAGE_FILES_TOTAL => Some(&self.image_files_total),
            IMAGE_FAILURES => Some(&self.image_failures),
            VIDEO_BATCHES => Some(&self.video_batches),
            VIDEO_FAILURES => Some(&self.video_failures),
            _ => None,
        }
    }

    /// Current value of every counter
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        [
            (IMAGE_BATCHES, &self.image_batches),
            (IMAGE_FILES_TOTAL, &self.image_files_total),
            (IMAGE_FAILURES, &self.image_failures),
            (VIDEO_BATCHES, &self.video_batches),
            (VIDEO_FAILURES, &self.video_failures),
        ]
        .into_iter()
        .map(|(key, counter)| (key, counter.load(Ordering::Relaxed)))
        .collect()
    }
}

impl MetricsSink for AtomicMetrics {
    fn incr(&self, key: &str, by: u64) {
        match self.counter(key) {
            Some(counter) => {
                counter.fetch_add(by, Ordering::Relaxed);
            }
            None => tracing::warn!("Unknown metric key: {}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_snapshot_starts_at_zero() {
        let metrics = AtomicMetrics::new();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.len(), 5);
        assert!(snapshot.values().all(|&v| v == 0));
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let metrics = AtomicMetrics::new();
        metrics.incr("bogus", 3);
        assert!(metrics.snapshot().values().all(|&v| v == 0));
    }

    #[tokio::test]
    async fn test_concurrent_increments_sum() {
        let metrics = Arc::new(AtomicMetrics::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                tokio::spawn(async move {
                    for _ in 0..100 {
                        metrics.incr(IMAGE_BATCHES, 1);
                        metrics.incr(IMAGE_FILES_TOTAL, 3);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot[IMAGE_BATCHES], 800);
        assert_eq!(snapshot[IMAGE_FILES_TOTAL], 2400);
        assert_eq!(snapshot[VIDEO_BATCHES], 0);
    }
}
