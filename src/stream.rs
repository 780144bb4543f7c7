//! Periodic keep-alive emission. A producer runs on its own thread and sends
//! one item per interval until the consumer hangs up or the handle is
//! cancelled.

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::logs::LogLevel;

/// Granularity at which a sleeping emitter notices cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(20);

pub trait Producer: Send + 'static {
    type Item: Send + 'static;
    fn produce(&mut self) -> Self::Item;
}

pub struct Emitter {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<usize>>,
}

impl Emitter {
    /// Starts emitting. The first item is sent after one full interval.
    pub fn spawn<P: Producer>(interval: Duration, mut producer: P, tx: Sender<P::Item>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let handle = std::thread::spawn(move || {
            let mut sent = 0usize;
            let mut next = Instant::now() + interval;
            while flag.load(Ordering::SeqCst) {
                let now = Instant::now();
                if now < next {
                    std::thread::sleep((next - now).min(CANCEL_POLL));
                    continue;
                }
                if tx.send(producer.produce()).is_err() {
                    debug!(sent, "consumer disconnected; stopping emitter");
                    break;
                }
                sent += 1;
                next += interval;
            }
            flag.store(false, Ordering::SeqCst);
            sent
        });
        Self { running, handle: Some(handle) }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// A clone of the stop flag, e.g. for a Ctrl-C handler.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Stops the timer and returns how many items were sent.
    pub fn cancel(mut self) -> usize {
        self.shutdown()
    }

    /// Blocks until the emitter stops on its own (consumer gone or stop flag cleared).
    pub fn join(mut self) -> usize {
        self.handle.take().and_then(|h| h.join().ok()).unwrap_or(0)
    }

    fn shutdown(&mut self) -> usize {
        self.running.store(false, Ordering::SeqCst);
        self.handle.take().and_then(|h| h.join().ok()).unwrap_or(0)
    }
}

impl Drop for Emitter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub active_users: u32,
    pub requests_per_minute: u32,
    pub error_rate: f64,
    pub response_time: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub severity: LogLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub metrics: Metrics,
    pub alerts: Vec<MetricsAlert>,
}

/// Alerts raised for a metrics sample.
pub fn metrics_alerts(metrics: &Metrics, error_rate_alert: f64) -> Vec<MetricsAlert> {
    let mut alerts = Vec::new();
    if metrics.error_rate > error_rate_alert {
        alerts.push(MetricsAlert {
            kind: "HIGH_ERROR_RATE".to_string(),
            message: "High error rate detected".to_string(),
            severity: LogLevel::Warning,
        });
    }
    alerts
}

/// Synthetic live metrics for keep-alive streams.
pub struct MetricsSampler<R: Rng + Send + 'static> {
    rng: R,
    error_rate_alert: f64,
}

impl<R: Rng + Send + 'static> MetricsSampler<R> {
    pub fn new(rng: R, error_rate_alert: f64) -> Self {
        Self { rng, error_rate_alert }
    }
}

impl<R: Rng + Send + 'static> Producer for MetricsSampler<R> {
    type Item = MetricsSnapshot;

    fn produce(&mut self) -> MetricsSnapshot {
        let metrics = Metrics {
            active_users: self.rng.gen_range(50..150),
            requests_per_minute: self.rng.gen_range(500..1500),
            error_rate: self.rng.gen_range(0.0..0.05),
            response_time: self.rng.gen_range(50.0..250.0),
        };
        let alerts = metrics_alerts(&metrics, self.error_rate_alert);
        MetricsSnapshot {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            metrics,
            alerts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticLogLine {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub source: String,
}

/// Synthetic log lines for live log tailing.
pub struct LogLineSampler<R: Rng + Send + 'static> {
    rng: R,
}

impl<R: Rng + Send + 'static> LogLineSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send + 'static> Producer for LogLineSampler<R> {
    type Item = SyntheticLogLine;

    fn produce(&mut self) -> SyntheticLogLine {
        let level = [LogLevel::Info, LogLevel::Warning, LogLevel::Error][self.rng.gen_range(0..3)];
        let now = Utc::now();
        SyntheticLogLine {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message: format!("Synthetic log entry {}", now.timestamp_millis()),
            source: "system".to_string(),
        }
    }
}
