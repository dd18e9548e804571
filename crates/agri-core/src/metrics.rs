//! Request metrics registry.
//!
//! Counter and histogram families with a fixed, ordered set of label names,
//! backed by `DashMap` and atomics. Series are created lazily on first
//! observation and live as long as the registry. Rendering follows the
//! Prometheus text exposition format (version 0.0.4).
//!
//! Latency sums are accumulated as integer nanoseconds so observations stay
//! lock-free; they are rendered back as seconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{AgriError, Result};

/// Content type of [`MetricsRegistry::render`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Standard client-library latency buckets, in seconds.
pub const DEFAULT_LATENCY_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

const REQUESTS_TOTAL: &str = "http_requests_total";
const REQUEST_DURATION: &str = "http_request_duration_seconds";

const REQUEST_LABELS: &[&str] = &["method", "path", "status"];
const LATENCY_LABELS: &[&str] = &["method", "path"];

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn label_string(names: &[&str], values: &[String]) -> String {
    names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn write_header(out: &mut String, name: &str, help: &str, kind: &str) {
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
}

/// Build a series key, or `None` when the label arity does not match.
fn series_key(metric: &str, names: &[&str], values: &[&str]) -> Option<Vec<String>> {
    if names.len() != values.len() {
        tracing::warn!(
            metric,
            expected = names.len(),
            got = values.len(),
            "label arity mismatch, sample dropped"
        );
        return None;
    }
    Some(values.iter().map(|v| v.to_string()).collect())
}

/// Floats rendered the way Prometheus clients do (`1.0`, `0.005`).
fn format_float(v: f64) -> String {
    format!("{:?}", v)
}

pub struct CounterVec {
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub fn new(name: &'static str, help: &'static str, labels: &'static [&'static str]) -> Self {
        Self {
            name,
            help,
            labels,
            map: DashMap::new(),
        }
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[&str]) {
        self.add(values, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, values: &[&str], v: u64) {
        let Some(key) = series_key(self.name, self.labels, values) else {
            return;
        };
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value of a series; unseen series read as zero.
    pub fn get(&self, values: &[&str]) -> u64 {
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, out: &mut String) {
        write_header(out, self.name, self.help, "counter");

        let mut rows: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, val) in rows {
            let _ = writeln!(out, "{}{{{}}} {}", self.name, label_string(self.labels, &key), val);
        }
    }
}

struct AtomicHistogram {
    count: AtomicU64,
    sum_nanos: AtomicU64,
    buckets: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    fn new(buckets: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_nanos: AtomicU64::new(0),
            buckets: (0..buckets).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    fn snapshot(&self, bounds: &[f64]) -> HistogramSnapshot {
        HistogramSnapshot {
            count: self.count.load(Ordering::Relaxed),
            sum: self.sum_nanos.load(Ordering::Relaxed) as f64 / 1e9,
            buckets: bounds
                .iter()
                .zip(self.buckets.iter())
                .map(|(&le, c)| (le, c.load(Ordering::Relaxed)))
                .collect(),
        }
    }
}

/// Point-in-time view of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    pub count: u64,
    /// Sum of all observations, in seconds.
    pub sum: f64,
    /// Cumulative `(upper bound, count)` pairs, excluding `+Inf`.
    pub buckets: Vec<(f64, u64)>,
}

pub struct HistogramVec {
    name: &'static str,
    help: &'static str,
    labels: &'static [&'static str],
    bounds: Vec<f64>,
    map: DashMap<Vec<String>, AtomicHistogram>,
}

impl HistogramVec {
    /// `bounds` must already be validated (see [`validate_buckets`]).
    pub fn new(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
        bounds: Vec<f64>,
    ) -> Self {
        Self {
            name,
            help,
            labels,
            bounds,
            map: DashMap::new(),
        }
    }

    /// Record one observation in seconds. Negative or non-finite values count as zero.
    pub fn observe(&self, values: &[&str], seconds: f64) {
        let Some(key) = series_key(self.name, self.labels, values) else {
            return;
        };
        let seconds = if seconds.is_finite() && seconds > 0.0 { seconds } else { 0.0 };
        // `as` saturates for out-of-range floats.
        let nanos = (seconds * 1e9).round() as u64;

        let hist = self
            .map
            .entry(key)
            .or_insert_with(|| AtomicHistogram::new(self.bounds.len()));

        // count first: a concurrent render never sees a bucket above +Inf.
        hist.count.fetch_add(1, Ordering::Relaxed);
        let _ = hist
            .sum_nanos
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| Some(s.saturating_add(nanos)));

        // Cumulative buckets: every bound at or above the value.
        for (i, &le) in self.bounds.iter().enumerate() {
            if seconds <= le {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self, values: &[&str]) -> Option<HistogramSnapshot> {
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.map.get(&key).map(|h| h.snapshot(&self.bounds))
    }

    /// Render in Prometheus text exposition format (unit: seconds).
    fn render(&self, out: &mut String) {
        write_header(out, self.name, self.help, "histogram");

        let mut rows: Vec<(Vec<String>, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().snapshot(&self.bounds)))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, snap) in rows {
            let label_str = label_string(self.labels, &key);
            let prefix = if label_str.is_empty() {
                String::new()
            } else {
                format!("{},", label_str)
            };

            for (le, count) in &snap.buckets {
                let _ = writeln!(
                    out,
                    "{}_bucket{{{}le=\"{}\"}} {}",
                    self.name,
                    prefix,
                    format_float(*le),
                    count
                );
            }
            let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", self.name, prefix, snap.count);
            let _ = writeln!(out, "{}_sum{{{}}} {}", self.name, label_str, format_float(snap.sum));
            let _ = writeln!(out, "{}_count{{{}}} {}", self.name, label_str, snap.count);
        }
    }
}

/// Bucket bounds must be finite, positive and strictly increasing.
pub fn validate_buckets(bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(AgriError::Config("latency buckets must not be empty".into()));
    }
    if let Some(b) = bounds.iter().find(|b| !b.is_finite() || **b <= 0.0) {
        return Err(AgriError::Config(format!(
            "latency bucket bound must be finite and positive, got {b}"
        )));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(AgriError::Config(
            "latency buckets must be strictly increasing".into(),
        ));
    }
    Ok(())
}

/// Per-process HTTP request metrics: a request counter keyed by
/// (method, path, status) and a latency histogram keyed by (method, path).
///
/// Constructed explicitly and shared by handle; there is no global registry.
pub struct MetricsRegistry {
    requests: CounterVec,
    latency: HistogramVec,
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRegistry {
    /// Registry with [`DEFAULT_LATENCY_BUCKETS`].
    pub fn new() -> Self {
        Self::build(DEFAULT_LATENCY_BUCKETS.to_vec())
    }

    pub fn with_latency_buckets(bounds: Vec<f64>) -> Result<Self> {
        validate_buckets(&bounds)?;
        Ok(Self::build(bounds))
    }

    fn build(bounds: Vec<f64>) -> Self {
        Self {
            requests: CounterVec::new(REQUESTS_TOTAL, "Total HTTP requests", REQUEST_LABELS),
            latency: HistogramVec::new(
                REQUEST_DURATION,
                "HTTP request latency",
                LATENCY_LABELS,
                bounds,
            ),
        }
    }

    pub fn increment_counter(&self, method: &str, path: &str, status: u16) {
        self.requests.inc(&[method, path, &status.to_string()]);
    }

    pub fn observe_latency(&self, method: &str, path: &str, seconds: f64) {
        self.latency.observe(&[method, path], seconds);
    }

    pub fn request_count(&self, method: &str, path: &str, status: u16) -> u64 {
        self.requests.get(&[method, path, &status.to_string()])
    }

    pub fn latency(&self, method: &str, path: &str) -> Option<HistogramSnapshot> {
        self.latency.snapshot(&[method, path])
    }

    /// Render every family; recomputed from live state on each call.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.requests.render(&mut out);
        self.latency.render(&mut out);
        out
    }
}
