//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Render counters and filter parameters at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Frame requests seen by the core.
    pub frames_requested: u64,
    /// Frames successfully produced.
    pub frames_produced: u64,
    /// Requests that ended in an error.
    pub frame_failures: u64,
    /// Threshold `c` in effect.
    pub threshold_c: i32,
    /// Bytes per sample (1 or 2).
    pub sample_bytes: usize,
}

/// Prometheus metrics registry for a binarize render.
pub struct MetricsRegistry {
    registry: Registry,

    frames_requested: IntCounter,
    frames_produced: IntCounter,
    frame_failures: IntCounter,

    threshold_c: IntGauge,
    sample_bytes: IntGauge,
}

impl MetricsRegistry {
    /// Creates a registry with every metric registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let frames_requested = IntCounter::new(
            "abrz_frames_requested_total",
            "Total frame requests seen by the core, dependencies included",
        )?;
        let frames_produced = IntCounter::new(
            "abrz_frames_produced_total",
            "Total frames successfully produced",
        )?;
        let frame_failures = IntCounter::new(
            "abrz_frame_failures_total",
            "Total frame requests that ended in an error",
        )?;
        let threshold_c = IntGauge::new("abrz_threshold_c", "Binarization threshold c")?;
        let sample_bytes = IntGauge::new("abrz_sample_bytes", "Bytes per sample of the filtered clip")?;

        registry.register(Box::new(frames_requested.clone()))?;
        registry.register(Box::new(frames_produced.clone()))?;
        registry.register(Box::new(frame_failures.clone()))?;
        registry.register(Box::new(threshold_c.clone()))?;
        registry.register(Box::new(sample_bytes.clone()))?;

        Ok(Self {
            registry,
            frames_requested,
            frames_produced,
            frame_failures,
            threshold_c,
            sample_bytes,
        })
    }

    /// Updates all metrics from a snapshot.
    ///
    /// Counters only move forward; a snapshot older than the last one
    /// leaves them unchanged.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        advance(&self.frames_requested, snapshot.frames_requested);
        advance(&self.frames_produced, snapshot.frames_produced);
        advance(&self.frame_failures, snapshot.frame_failures);

        self.threshold_c.set(i64::from(snapshot.threshold_c));
        self.sample_bytes.set(snapshot.sample_bytes as i64);
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::AdaptiveBinarize;
    use crate::format::{VideoFormat, VideoInfo};
    use crate::host::{Core, MemoryClip};

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        registry.update(&MetricsSnapshot {
            frames_requested: 9,
            frames_produced: 8,
            frame_failures: 1,
            threshold_c: -4,
            sample_bytes: 2,
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("abrz_frames_requested_total 9"));
        assert!(output.contains("abrz_frames_produced_total 8"));
        assert!(output.contains("abrz_frame_failures_total 1"));
        assert!(output.contains("abrz_threshold_c -4"));
        assert!(output.contains("abrz_sample_bytes 2"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();
        let mut snapshot = MetricsSnapshot {
            frames_requested: 10,
            ..Default::default()
        };
        registry.update(&snapshot);
        snapshot.frames_requested = 4;
        registry.update(&snapshot);

        assert!(registry.encode().unwrap().contains("abrz_frames_requested_total 10"));
    }

    #[test]
    fn test_render_counters_exported() {
        let info = VideoInfo::new(VideoFormat::GRAY16, 8, 8, 3);
        let node = AdaptiveBinarize::new(
            MemoryClip::noise(info, 1).into_node(),
            MemoryClip::noise(info, 2).into_node(),
            Some(12),
        )
        .unwrap()
        .into_node();

        let core = Core::new();
        core.render(&node).unwrap();
        let stats = core.stats();

        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            frames_requested: stats.requested,
            frames_produced: stats.produced,
            frame_failures: stats.failed,
            threshold_c: 12,
            sample_bytes: VideoFormat::GRAY16.bytes_per_sample(),
        });

        // three filter frames plus two source frames each
        let output = registry.encode().unwrap();
        assert!(output.contains("abrz_frames_requested_total 9"));
        assert!(output.contains("abrz_frames_produced_total 9"));
        assert!(output.contains("abrz_frame_failures_total 0"));
        assert!(output.contains("abrz_sample_bytes 2"));
    }
}
