//! Graph vertices and the context they fetch frames through.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::format::VideoInfo;
use crate::frame::Frame;

/// Shared, immutable frame handle. Dropping it releases the frame.
pub type FrameRef = Arc<Frame>;

/// Shared handle to a graph vertex. Dropping it releases the node.
pub type Node = Arc<dyn VideoNode>;

/// Errors raised while producing frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Index past the end of the clip.
    #[error("{node}: frame {n} out of range (clip has {num_frames} frames)")]
    FrameOutOfRange {
        node: String,
        n: usize,
        num_frames: usize,
    },
    /// `get_frame` without a matching `request_frame`.
    #[error("{node}: frame {n} was fetched without being requested")]
    NotRequested { node: String, n: usize },
    /// A node asked for frames from a node it did not declare.
    #[error("{node}: requested frames from {dependency}, which is not a declared dependency")]
    UndeclaredDependency { node: String, dependency: String },
    /// The ready phase returned no frame.
    #[error("{node}: no frame produced for index {n}")]
    NoFrameProduced { node: String, n: usize },
    /// The node's frame callback failed.
    #[error("{node}: frame {n} failed: {reason}")]
    FrameFailed {
        node: String,
        n: usize,
        reason: String,
    },
}

impl HostError {
    /// Wraps an error raised inside a node's frame callback.
    pub fn frame_failed(node: &str, n: usize, reason: impl fmt::Display) -> Self {
        HostError::FrameFailed {
            node: node.to_string(),
            n,
            reason: reason.to_string(),
        }
    }
}

/// Why the scheduler is invoking a node's frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationReason {
    /// First call for a frame: request dependencies.
    Initial,
    /// Every requested frame is available.
    AllFramesReady,
    /// A requested frame failed; the node will not be resumed.
    Error,
}

/// How many frames of a node may be produced concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Any number of frames at once, from any thread.
    Parallel,
    /// One frame at a time, in request order.
    Serial,
}

/// Fetches upstream frames on behalf of a node.
pub trait FrameContext {
    /// Asks for frame `n` of `node`; only valid in the initial phase.
    fn request_frame(&mut self, n: usize, node: &Node);

    /// Returns a previously requested frame; only valid once all frames
    /// are ready.
    fn get_frame(&mut self, n: usize, node: &Node) -> Result<FrameRef, HostError>;
}

/// A vertex of the frame graph.
pub trait VideoNode: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Metadata of every frame this node produces.
    fn video_info(&self) -> &VideoInfo;

    /// Concurrency the node supports. Defaults to parallel.
    fn filter_mode(&self) -> FilterMode {
        FilterMode::Parallel
    }

    /// Nodes this node may request frames from.
    fn dependencies(&self) -> Vec<Node> {
        Vec::new()
    }

    /// Frame callback, invoked once per activation phase.
    ///
    /// Returning `Ok(None)` from the initial phase suspends the request
    /// until every frame requested through `ctx` is ready.
    fn get_frame(
        &self,
        n: usize,
        reason: ActivationReason,
        ctx: &mut dyn FrameContext,
    ) -> Result<Option<FrameRef>, HostError>;
}

impl fmt::Debug for dyn VideoNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoNode")
            .field("name", &self.name())
            .field("video_info", self.video_info())
            .finish()
    }
}

/// True when both handles point at the same node.
#[inline]
pub fn same_node(a: &Node, b: &Node) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
