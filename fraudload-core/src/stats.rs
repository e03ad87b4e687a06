//! Request statistics for a run

use crate::user::RequestRecord;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Raw samples for one request name
#[derive(Debug, Default, Clone)]
struct EndpointStats {
    requests: u64,
    failures: u64,
    response_times_us: Vec<u64>,
    bytes: u64,
    failure_messages: HashMap<String, u64>,
}

/// Shared sink every virtual user records into
#[derive(Debug, Clone)]
pub struct RunStats {
    endpoints: Arc<Mutex<BTreeMap<String, EndpointStats>>>,
    total_requests: Arc<AtomicU64>,
    total_failures: Arc<AtomicU64>,
    started: Arc<Mutex<Instant>>,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            endpoints: Arc::new(Mutex::new(BTreeMap::new())),
            total_requests: Arc::new(AtomicU64::new(0)),
            total_failures: Arc::new(AtomicU64::new(0)),
            started: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub async fn record(&self, record: &RequestRecord) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        let mut endpoints = self.endpoints.lock().await;
        let stats = endpoints.entry(record.name.clone()).or_default();
        stats.requests += 1;
        stats
            .response_times_us
            .push(u64::try_from(record.elapsed.as_micros()).unwrap_or(u64::MAX));
        stats.bytes += record.response_length as u64;

        if let Some(failure) = record.classification.failure() {
            self.total_failures.fetch_add(1, Ordering::Relaxed);
            stats.failures += 1;
            *stats.failure_messages.entry(failure.to_string()).or_insert(0) += 1;
        }
    }

    /// Measure throughput from now on, e.g. once startup is done
    pub async fn restart_clock(&self) {
        *self.started.lock().await = Instant::now();
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures.load(Ordering::Relaxed)
    }

    /// Summarise everything recorded so far
    pub async fn summary(&self) -> RunSummary {
        let duration = self.started.lock().await.elapsed();
        let endpoints = self.endpoints.lock().await;

        let mut all = EndpointStats::default();
        let mut summaries = Vec::with_capacity(endpoints.len());

        for (name, stats) in endpoints.iter() {
            summaries.push(EndpointSummary::from_stats(name, stats, duration));

            all.requests += stats.requests;
            all.failures += stats.failures;
            all.bytes += stats.bytes;
            all.response_times_us.extend_from_slice(&stats.response_times_us);
            for (message, count) in &stats.failure_messages {
                *all.failure_messages.entry(message.clone()).or_insert(0) += count;
            }
        }

        RunSummary {
            endpoints: summaries,
            total: EndpointSummary::from_stats("Aggregated", &all, duration),
            duration,
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-request-name figures
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSummary {
    pub name: String,
    pub requests: u64,
    pub failures: u64,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
    pub requests_per_second: f64,
    pub bytes: u64,
    /// Failure messages, most frequent first
    pub failure_messages: Vec<(String, u64)>,
}

impl EndpointSummary {
    fn from_stats(name: &str, stats: &EndpointStats, duration: Duration) -> Self {
        let mut times = stats.response_times_us.clone();
        times.sort_unstable();

        let avg_ms = if times.is_empty() {
            0.0
        } else {
            times.iter().sum::<u64>() as f64 / times.len() as f64 / 1000.0
        };

        let secs = duration.as_secs_f64();
        let requests_per_second = if secs > 0.0 {
            stats.requests as f64 / secs
        } else {
            0.0
        };

        let mut failure_messages: Vec<(String, u64)> = stats
            .failure_messages
            .iter()
            .map(|(m, c)| (m.clone(), *c))
            .collect();
        failure_messages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            name: name.to_string(),
            requests: stats.requests,
            failures: stats.failures,
            min_ms: us_to_ms(times.first().copied().unwrap_or(0)),
            avg_ms,
            p50_ms: us_to_ms(percentile(&times, 50.0)),
            p95_ms: us_to_ms(percentile(&times, 95.0)),
            p99_ms: us_to_ms(percentile(&times, 99.0)),
            max_ms: us_to_ms(times.last().copied().unwrap_or(0)),
            requests_per_second,
            bytes: stats.bytes,
            failure_messages,
        }
    }

    pub fn failure_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.failures as f64 / self.requests as f64
        }
    }
}

/// Whole-run figures
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub endpoints: Vec<EndpointSummary>,
    pub total: EndpointSummary,
    pub duration: Duration,
}

impl RunSummary {
    pub fn endpoint(&self, name: &str) -> Option<&EndpointSummary> {
        self.endpoints.iter().find(|e| e.name == name)
    }
}

fn us_to_ms(us: u64) -> f64 {
    us as f64 / 1000.0
}

/// Nearest-rank percentile of an ascending slice
pub fn percentile(sorted: &[u64], pct: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classification, FailureKind};

    fn record(name: &str, ms: u64, classification: Classification) -> RequestRecord {
        RequestRecord {
            name: name.to_string(),
            endpoint: name.to_string(),
            classification,
            elapsed: Duration::from_millis(ms),
            response_length: 10,
        }
    }

    #[test]
    fn test_percentile() {
        let times: Vec<u64> = (1..=100).collect();
        assert_eq!(percentile(&times, 50.0), 50);
        assert_eq!(percentile(&times, 95.0), 95);
        assert_eq!(percentile(&times, 99.0), 99);
        assert_eq!(percentile(&times, 100.0), 100);
        assert_eq!(percentile(&[], 50.0), 0);
        assert_eq!(percentile(&[7], 99.0), 7);
    }

    #[tokio::test]
    async fn test_summary_groups_by_name() {
        let stats = RunStats::new();
        stats.record(&record("/auth", 5, Classification::Success)).await;
        stats.record(&record("/auth", 15, Classification::Success)).await;
        stats
            .record(&record(
                "/auth",
                25,
                Classification::Failure(FailureKind::Forbidden),
            ))
            .await;
        stats
            .record(&record(
                "/monitoring",
                8,
                Classification::Failure(FailureKind::Forbidden),
            ))
            .await;

        assert_eq!(stats.total_requests(), 4);
        assert_eq!(stats.total_failures(), 2);

        let summary = stats.summary().await;
        let auth = summary.endpoint("/auth").unwrap();
        assert_eq!(auth.requests, 3);
        assert_eq!(auth.failures, 1);
        assert_eq!(auth.min_ms, 5.0);
        assert_eq!(auth.max_ms, 25.0);
        assert!((auth.avg_ms - 15.0).abs() < 1e-9);

        assert_eq!(summary.total.requests, 4);
        assert_eq!(summary.total.bytes, 40);
        assert_eq!(
            summary.total.failure_messages,
            vec![("Forbidden - check scopes".to_string(), 2)]
        );
        assert!((summary.total.failure_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_sub_millisecond_latency_is_kept() {
        let stats = RunStats::new();
        let mut fast = record("/auth", 0, Classification::Success);
        fast.elapsed = Duration::from_micros(400);
        stats.record(&fast).await;
        fast.elapsed = Duration::from_micros(1_250);
        stats.record(&fast).await;

        let summary = stats.summary().await;
        let auth = summary.endpoint("/auth").unwrap();
        assert!((auth.min_ms - 0.4).abs() < 1e-9);
        assert!((auth.max_ms - 1.25).abs() < 1e-9);
        assert!((auth.p50_ms - 0.4).abs() < 1e-9);
        assert!((auth.avg_ms - 0.825).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_clock_excludes_startup_time() {
        let stats = RunStats::new();
        tokio::time::advance(Duration::from_secs(30)).await;

        stats.restart_clock().await;
        stats.record(&record("/auth", 5, Classification::Success)).await;
        stats.record(&record("/auth", 5, Classification::Success)).await;
        tokio::time::advance(Duration::from_secs(2)).await;

        let summary = stats.summary().await;
        assert_eq!(summary.duration, Duration::from_secs(2));
        assert!((summary.total.requests_per_second - 1.0).abs() < 1e-9);
    }
}
