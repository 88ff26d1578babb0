//! Benchmark result records

use crate::types::filter::{FilterKind, FilterRequest};
use crate::utils::time::duration_nanos;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing comparison for one filter request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Filter that was run
    pub filter: FilterKind,

    /// Full request, including parameters
    pub request: FilterRequest,

    /// Image dimensions
    pub width: u32,
    pub height: u32,

    /// Host-side filter time (filter call only)
    #[serde(with = "duration_nanos", rename = "host_ns")]
    pub host_time: Duration,

    /// Bridge time, including allocation, copies and deallocation
    #[serde(with = "duration_nanos", rename = "bridge_ns")]
    pub bridge_time: Duration,

    /// `host_time / bridge_time`; above 1.0 means the module was faster.
    /// Stored as `null` when infinite.
    #[serde(with = "speedup_ratio")]
    pub speedup: f64,

    /// Pixel-for-pixel agreement of both outputs (None when not checked)
    pub outputs_match: Option<bool>,
}

impl BenchmarkResult {
    pub fn new(
        request: FilterRequest,
        width: u32,
        height: u32,
        host_time: Duration,
        bridge_time: Duration,
        outputs_match: Option<bool>,
    ) -> Self {
        Self {
            filter: request.kind(),
            request,
            width,
            height,
            host_time,
            bridge_time,
            speedup: speedup(host_time, bridge_time),
            outputs_match,
        }
    }

    /// True when the bridge path finished strictly faster than the host path
    pub fn bridge_faster(&self) -> bool {
        self.bridge_time < self.host_time
    }
}

/// Ratio of host time to bridge time.
///
/// A zero bridge time gives 1.0 if the host time is also zero and +inf otherwise.
pub fn speedup(host_time: Duration, bridge_time: Duration) -> f64 {
    let bridge = bridge_time.as_secs_f64();
    let host = host_time.as_secs_f64();
    if bridge == 0.0 {
        if host == 0.0 {
            1.0
        } else {
            f64::INFINITY
        }
    } else {
        host / bridge
    }
}

/// Serde helper writing an infinite speedup as `null` and reading it back
mod speedup_ratio {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ratio: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if ratio.is_finite() {
            serializer.serialize_f64(*ratio)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Option::<f64>::deserialize(deserializer).map(|ratio| ratio.unwrap_or(f64::INFINITY))
    }
}

/// Results for a set of filters over the same image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,

    pub width: u32,
    pub height: u32,

    /// Timed iterations per filter
    pub iterations: u32,

    /// Linear memory size of the filter module after the run, in bytes
    pub module_memory_bytes: usize,

    pub results: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    pub fn new(width: u32, height: u32, iterations: u32) -> Self {
        Self {
            generated_at: Utc::now(),
            width,
            height,
            iterations,
            module_memory_bytes: 0,
            results: Vec::new(),
        }
    }

    /// Number of results where the two outputs were compared and differed
    pub fn mismatches(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outputs_match == Some(false))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speedup_ratio() {
        let r = BenchmarkResult::new(
            FilterRequest::Invert,
            4,
            4,
            Duration::from_millis(10),
            Duration::from_millis(5),
            Some(true),
        );
        assert_eq!(r.filter, FilterKind::Invert);
        assert!((r.speedup - 2.0).abs() < 1e-9);
        assert!(r.bridge_faster());
    }

    #[test]
    fn test_bridge_slower_is_reported() {
        let r = BenchmarkResult::new(
            FilterRequest::Sobel,
            4,
            4,
            Duration::from_millis(2),
            Duration::from_millis(8),
            None,
        );
        assert!((r.speedup - 0.25).abs() < 1e-9);
        assert!(!r.bridge_faster());
    }

    #[test]
    fn test_speedup_zero_durations() {
        assert_eq!(speedup(Duration::ZERO, Duration::ZERO), 1.0);
        assert!(speedup(Duration::from_nanos(1), Duration::ZERO).is_infinite());
    }

    #[test]
    fn test_result_serializes_nanos() {
        let r = BenchmarkResult::new(
            FilterRequest::Blur { radius: 2 },
            8,
            8,
            Duration::from_micros(3),
            Duration::from_micros(2),
            Some(true),
        );
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["host_ns"], 3000);
        assert_eq!(value["bridge_ns"], 2000);
        assert_eq!(value["filter"], "blur");
    }

    #[test]
    fn test_infinite_speedup_survives_json() {
        let mut report = BenchmarkReport::new(2, 2, 1);
        report.results.push(BenchmarkResult::new(
            FilterRequest::Invert,
            2,
            2,
            Duration::from_nanos(40),
            Duration::ZERO,
            Some(true),
        ));
        report.results.push(BenchmarkResult::new(
            FilterRequest::Threshold { level: 9 },
            2,
            2,
            Duration::from_nanos(30),
            Duration::from_nanos(60),
            Some(true),
        ));

        let json = serde_json::to_string(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["results"][0]["speedup"].is_null());
        assert_eq!(value["results"][1]["speedup"], 0.5);

        let back: BenchmarkReport = serde_json::from_str(&json).unwrap();
        assert!(back.results[0].speedup.is_infinite());
        assert_eq!(back.results[0].host_time, Duration::from_nanos(40));
        assert_eq!(back.results[1], report.results[1]);
    }

    #[test]
    fn test_report_mismatches() {
        let mut report = BenchmarkReport::new(2, 2, 1);
        for matched in [Some(true), Some(false), None] {
            report.results.push(BenchmarkResult::new(
                FilterRequest::Invert,
                2,
                2,
                Duration::from_nanos(1),
                Duration::from_nanos(1),
                matched,
            ));
        }
        assert_eq!(report.mismatches(), 1);
    }
}
