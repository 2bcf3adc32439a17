//! The `AdaptiveBinarize` filter.
//!
//! For every frame `n` the filter requests frame `n` from both inputs,
//! then writes `MAX` where `clip - clip2 <= -c` and zero elsewhere, plane
//! by plane, through the table built once at construction.

mod register;

pub use register::{create, plugin, FUNCTION_ARGS, FUNCTION_RETURNS, PLUGIN_IDENTIFIER, PLUGIN_NAMESPACE};

use std::sync::Arc;

use thiserror::Error;

use crate::format::{SampleWidth, VideoInfo};
use crate::frame::Frame;
use crate::host::{ActivationReason, FilterMode, FrameContext, FrameRef, HostError, Node, VideoNode};
use crate::lut::{LutSet, DEFAULT_THRESHOLD};
use crate::transform::transform_frame;

/// Name the filter is registered and logged under.
pub const FILTER_NAME: &str = "AdaptiveBinarize";

/// Construction errors. Each message names the filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// `clip` is variable-format, float, or not 8/16-bit.
    #[error("AdaptiveBinarize: only constant format 8 or 16 bit integer input supported")]
    UnsupportedFormat,
    /// `clip2` differs from `clip` in format or dimensions.
    #[error("AdaptiveBinarize: both clips must have the same format and dimensions")]
    FormatMismatch,
    /// The clips have different lengths.
    #[error("AdaptiveBinarize: both clips' number of frames do not match")]
    FrameCountMismatch { clip: usize, clip2: usize },
}

/// Filter instance state, immutable after construction.
pub struct AdaptiveBinarize {
    node: Node,
    node2: Node,
    info: VideoInfo,
    luts: LutSet,
}

impl AdaptiveBinarize {
    /// Validates both inputs and builds the table for their sample width.
    ///
    /// A missing `c` resolves to [`DEFAULT_THRESHOLD`]. On error both node
    /// handles are released before returning.
    pub fn new(node: Node, node2: Node, c: Option<i32>) -> Result<Self, FilterError> {
        let info = *node.video_info();
        let info2 = *node2.video_info();

        let sample_width = match info.format {
            Some(format) if info.is_constant_format() => SampleWidth::from_format(&format),
            _ => None,
        };
        let Some(sample_width) = sample_width else {
            tracing::warn!(clip = node.name(), format = ?info.format, "Rejected input format");
            return Err(FilterError::UnsupportedFormat);
        };

        if !info2.same_video_info(&info) {
            tracing::warn!(
                clip = node.name(),
                clip2 = node2.name(),
                "Rejected clips with different format or dimensions"
            );
            return Err(FilterError::FormatMismatch);
        }

        if info2.num_frames != info.num_frames {
            tracing::warn!(
                clip = info.num_frames,
                clip2 = info2.num_frames,
                "Rejected clips with different lengths"
            );
            return Err(FilterError::FrameCountMismatch {
                clip: info.num_frames,
                clip2: info2.num_frames,
            });
        }

        let c = c.unwrap_or(DEFAULT_THRESHOLD);
        let luts = LutSet::build(sample_width, c);

        tracing::info!(
            c,
            sample_width = %sample_width,
            width = info.width,
            height = info.height,
            frames = info.num_frames,
            "AdaptiveBinarize created"
        );

        Ok(Self {
            node,
            node2,
            info,
            luts,
        })
    }

    /// Threshold `c` in effect.
    #[inline]
    pub fn threshold(&self) -> i32 {
        self.luts.threshold()
    }

    /// Sample width the table was built for.
    #[inline]
    pub fn sample_width(&self) -> SampleWidth {
        self.luts.sample_width()
    }

    /// Wraps the filter into a graph node.
    pub fn into_node(self) -> Node {
        Arc::new(self)
    }

    fn produce(&self, n: usize, ctx: &mut dyn FrameContext) -> Result<FrameRef, HostError> {
        let src = ctx.get_frame(n, &self.node)?;
        let src2 = ctx.get_frame(n, &self.node2)?;

        let mut dst =
            Frame::new_like(&src).map_err(|e| HostError::frame_failed(FILTER_NAME, n, e))?;
        transform_frame(&src, &src2, &mut dst, &self.luts)
            .map_err(|e| HostError::frame_failed(FILTER_NAME, n, e))?;

        drop(src);
        drop(src2);

        tracing::trace!(n, planes = dst.num_planes(), "Frame binarized");
        Ok(Arc::new(dst))
    }
}

impl std::fmt::Debug for AdaptiveBinarize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveBinarize")
            .field("clip", &self.node.name())
            .field("clip2", &self.node2.name())
            .field("c", &self.threshold())
            .field("sample_width", &self.sample_width())
            .finish()
    }
}

impl VideoNode for AdaptiveBinarize {
    fn name(&self) -> &str {
        FILTER_NAME
    }

    fn video_info(&self) -> &VideoInfo {
        &self.info
    }

    fn filter_mode(&self) -> FilterMode {
        FilterMode::Parallel
    }

    fn dependencies(&self) -> Vec<Node> {
        vec![Arc::clone(&self.node), Arc::clone(&self.node2)]
    }

    fn get_frame(
        &self,
        n: usize,
        reason: ActivationReason,
        ctx: &mut dyn FrameContext,
    ) -> Result<Option<FrameRef>, HostError> {
        match reason {
            ActivationReason::Initial => {
                ctx.request_frame(n, &self.node);
                ctx.request_frame(n, &self.node2);
                Ok(None)
            }
            ActivationReason::AllFramesReady => self.produce(n, ctx).map(Some),
            ActivationReason::Error => Ok(None),
        }
    }
}
