//! Two-phase frame scheduler.
//!
//! For every frame the [`Core`] calls the node once with
//! [`ActivationReason::Initial`], resolves everything the node requested,
//! then calls it again with [`ActivationReason::AllFramesReady`]. If a
//! dependency fails the node gets an [`ActivationReason::Error`] call and
//! is never resumed; the error propagates to the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::node::{
    same_node, ActivationReason, FilterMode, FrameContext, FrameRef, HostError, Node,
};

/// Frame counters shared by all render threads.
#[derive(Debug, Default)]
pub struct RenderStats {
    requested: AtomicU64,
    produced: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`RenderStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStatsSnapshot {
    /// Frame requests received, dependencies included.
    pub requested: u64,
    /// Frames successfully produced.
    pub produced: u64,
    /// Requests that ended in an error.
    pub failed: u64,
}

impl RenderStats {
    /// Reads all counters.
    pub fn snapshot(&self) -> RenderStatsSnapshot {
        RenderStatsSnapshot {
            requested: self.requested.load(Ordering::Relaxed),
            produced: self.produced.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Context handed to a node while one of its frames is being produced.
struct RequestContext {
    node: Node,
    dependencies: Vec<Node>,
    requests: Vec<(usize, Node)>,
    ready: Vec<(usize, Node, FrameRef)>,
    violation: Option<HostError>,
}

impl RequestContext {
    fn new(node: &Node) -> Self {
        Self {
            node: Arc::clone(node),
            dependencies: node.dependencies(),
            requests: Vec::new(),
            ready: Vec::new(),
            violation: None,
        }
    }
}

impl FrameContext for RequestContext {
    fn request_frame(&mut self, n: usize, node: &Node) {
        if !self.dependencies.iter().any(|dep| same_node(dep, node)) {
            self.violation.get_or_insert(HostError::UndeclaredDependency {
                node: self.node.name().to_string(),
                dependency: node.name().to_string(),
            });
            return;
        }
        let duplicate = self
            .requests
            .iter()
            .any(|(m, other)| *m == n && same_node(other, node));
        if !duplicate {
            self.requests.push((n, Arc::clone(node)));
        }
    }

    fn get_frame(&mut self, n: usize, node: &Node) -> Result<FrameRef, HostError> {
        self.ready
            .iter()
            .find(|(m, other, _)| *m == n && same_node(other, node))
            .map(|(_, _, frame)| Arc::clone(frame))
            .ok_or_else(|| HostError::NotRequested {
                node: node.name().to_string(),
                n,
            })
    }
}

/// Drives nodes through the request/ready protocol.
#[derive(Debug, Default)]
pub struct Core {
    stats: RenderStats,
}

impl Core {
    /// Core with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces frame `n` of `node`, resolving its dependencies first.
    pub fn get_frame(&self, node: &Node, n: usize) -> Result<FrameRef, HostError> {
        self.stats.requested.fetch_add(1, Ordering::Relaxed);

        let result = self.produce(node, n);
        match &result {
            Ok(_) => {
                self.stats.produced.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(node = node.name(), n, error = %e, "Frame request failed");
            }
        }
        result
    }

    fn produce(&self, node: &Node, n: usize) -> Result<FrameRef, HostError> {
        let num_frames = node.video_info().num_frames;
        if n >= num_frames {
            return Err(HostError::FrameOutOfRange {
                node: node.name().to_string(),
                n,
                num_frames,
            });
        }

        let mut ctx = RequestContext::new(node);
        if let Some(frame) = node.get_frame(n, ActivationReason::Initial, &mut ctx)? {
            return Ok(frame);
        }
        if let Some(violation) = ctx.violation.take() {
            return Err(violation);
        }

        let requests = std::mem::take(&mut ctx.requests);
        for (dep_n, dep) in requests {
            match self.get_frame(&dep, dep_n) {
                Ok(frame) => ctx.ready.push((dep_n, dep, frame)),
                Err(e) => {
                    tracing::warn!(
                        node = node.name(),
                        n,
                        dependency = dep.name(),
                        error = %e,
                        "Upstream frame failed"
                    );
                    // Release what was already fetched before notifying the node.
                    ctx.ready.clear();
                    if let Err(cleanup) = node.get_frame(n, ActivationReason::Error, &mut ctx) {
                        tracing::warn!(
                            node = node.name(),
                            n,
                            error = %cleanup,
                            "Error activation failed"
                        );
                    }
                    return Err(e);
                }
            }
        }

        node.get_frame(n, ActivationReason::AllFramesReady, &mut ctx)?
            .ok_or_else(|| HostError::NoFrameProduced {
                node: node.name().to_string(),
                n,
            })
    }

    /// Produces every frame of `node`, in index order.
    ///
    /// Parallel nodes are rendered on the rayon pool; serial nodes on the
    /// calling thread. The first failure aborts the render.
    pub fn render(&self, node: &Node) -> Result<Vec<FrameRef>, HostError> {
        let num_frames = node.video_info().num_frames;
        tracing::debug!(
            node = node.name(),
            frames = num_frames,
            mode = ?node.filter_mode(),
            "Rendering clip"
        );

        match node.filter_mode() {
            FilterMode::Parallel => (0..num_frames)
                .into_par_iter()
                .map(|n| self.get_frame(node, n))
                .collect(),
            FilterMode::Serial => (0..num_frames).map(|n| self.get_frame(node, n)).collect(),
        }
    }

    /// Counters accumulated since the core was created.
    pub fn stats(&self) -> RenderStatsSnapshot {
        self.stats.snapshot()
    }
}
