//! Request counters for the HubSpot client.
//!
//! Cheap to clone: every clone shares the same atomic counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    errors: AtomicU64,
    duration_ms: AtomicU64,
    objects_fetched: AtomicU64,
}

/// Shared counters for HTTP calls and CRM records read.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    counters: Arc<Counters>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed HTTP request.
    pub fn record_http_request(&self, duration: Duration) {
        self.counters.requests.fetch_add(1, Ordering::Relaxed);
        self.counters
            .duration_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed HTTP request (transport error or non-2xx status).
    pub fn record_http_error(&self) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record CRM records returned by a read, search or batch read.
    pub fn record_objects_fetched(&self, count: usize) {
        self.counters
            .objects_fetched
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn http_requests_total(&self) -> u64 {
        self.counters.requests.load(Ordering::Relaxed)
    }

    pub fn http_errors_total(&self) -> u64 {
        self.counters.errors.load(Ordering::Relaxed)
    }

    pub fn http_duration_total_ms(&self) -> u64 {
        self.counters.duration_ms.load(Ordering::Relaxed)
    }

    /// Mean request duration in milliseconds, zero before the first request.
    pub fn http_duration_avg_ms(&self) -> f64 {
        let count = self.http_requests_total();
        if count == 0 {
            return 0.0;
        }
        self.http_duration_total_ms() as f64 / count as f64
    }

    pub fn objects_fetched_total(&self) -> u64 {
        self.counters.objects_fetched.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            http_requests_total: self.http_requests_total(),
            http_errors_total: self.http_errors_total(),
            http_duration_avg_ms: self.http_duration_avg_ms(),
            objects_fetched_total: self.objects_fetched_total(),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub http_duration_avg_ms: f64,
    pub objects_fetched_total: u64,
}

/// Times one HTTP request and records it on completion.
pub struct HttpTimer {
    start: Instant,
    metrics: Metrics,
}

impl HttpTimer {
    pub fn new(metrics: &Metrics) -> Self {
        Self {
            start: Instant::now(),
            metrics: metrics.clone(),
        }
    }

    pub fn complete(self) {
        self.metrics.record_http_request(self.start.elapsed());
    }

    pub fn complete_with_error(self) {
        self.metrics.record_http_request(self.start.elapsed());
        self.metrics.record_http_error();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_average_duration() {
        let metrics = Metrics::new();
        assert_eq!(metrics.http_duration_avg_ms(), 0.0);

        metrics.record_http_request(Duration::from_millis(100));
        metrics.record_http_request(Duration::from_millis(200));
        assert_eq!(metrics.http_requests_total(), 2);
        assert_eq!(metrics.http_duration_total_ms(), 300);
        assert_eq!(metrics.http_duration_avg_ms(), 150.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = Metrics::new();
        let clone = metrics.clone();
        clone.record_objects_fetched(4);
        clone.record_http_error();

        let summary = metrics.summary();
        assert_eq!(summary.objects_fetched_total, 4);
        assert_eq!(summary.http_errors_total, 1);
    }

    #[test]
    fn test_http_timer_with_error() {
        let metrics = Metrics::new();
        HttpTimer::new(&metrics).complete_with_error();
        HttpTimer::new(&metrics).complete();

        assert_eq!(metrics.http_requests_total(), 2);
        assert_eq!(metrics.http_errors_total(), 1);
    }

    #[test]
    fn test_concurrent_access() {
        let metrics = Metrics::new();
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let m = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        m.record_http_request(Duration::from_millis(1));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.http_requests_total(), 200);
    }
}
