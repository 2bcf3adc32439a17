//! In-memory source clips.
//!
//! Sources have no dependencies: they answer the initial activation with
//! a finished frame.

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

use crate::format::{SampleWidth, VideoInfo};
use crate::frame::{Frame, Sample};

use super::node::{ActivationReason, FrameContext, FrameRef, HostError, Node, VideoNode};

#[derive(Debug, Clone, Copy)]
enum Synth {
    Blank(u32),
    Noise(u64),
}

enum Content {
    Frames(Vec<FrameRef>),
    Synth(Synth),
}

/// A source node whose frames live in memory or are synthesized on demand.
pub struct MemoryClip {
    name: String,
    info: VideoInfo,
    content: Content,
}

impl MemoryClip {
    /// Wraps explicit frames.
    ///
    /// When every frame shares format and dimensions the clip reports them;
    /// otherwise it reports a variable format (no format, zero size).
    pub fn from_frames(name: impl Into<String>, frames: Vec<Frame>) -> Self {
        let info = match frames.first() {
            Some(first) => {
                let constant = frames.iter().all(|f| {
                    f.format() == first.format()
                        && f.width() == first.width()
                        && f.height() == first.height()
                });
                if constant {
                    VideoInfo::new(first.format(), first.width(), first.height(), frames.len())
                } else {
                    VideoInfo {
                        format: None,
                        ..VideoInfo::new(first.format(), 0, 0, frames.len())
                    }
                }
            }
            None => VideoInfo {
                format: None,
                ..VideoInfo::new(crate::format::VideoFormat::GRAY8, 0, 0, 0)
            },
        };

        Self {
            name: name.into(),
            info,
            content: Content::Frames(frames.into_iter().map(Arc::new).collect()),
        }
    }

    /// Clip of `info.num_frames` frames with every sample set to `value`.
    ///
    /// `value` is truncated to the format's bit depth.
    pub fn blank(info: VideoInfo, value: u32) -> Self {
        Self {
            name: "BlankClip".to_string(),
            info,
            content: Content::Synth(Synth::Blank(value)),
        }
    }

    /// Clip of uniformly distributed samples, reproducible per `seed` and
    /// frame index.
    pub fn noise(info: VideoInfo, seed: u64) -> Self {
        Self {
            name: format!("NoiseClip({seed})"),
            info,
            content: Content::Synth(Synth::Noise(seed)),
        }
    }

    /// Renames the clip for logs and errors.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the reported metadata.
    pub fn with_info(mut self, info: VideoInfo) -> Self {
        self.info = info;
        self
    }

    /// Wraps the clip into a graph node.
    pub fn into_node(self) -> Node {
        Arc::new(self)
    }

    fn synthesize(&self, n: usize, synth: Synth) -> Result<Frame, HostError> {
        let format = self
            .info
            .format
            .ok_or_else(|| HostError::frame_failed(&self.name, n, "clip has no constant format"))?;
        let mut frame = Frame::new(format, self.info.width, self.info.height)
            .map_err(|e| HostError::frame_failed(&self.name, n, e))?;

        let mask = if format.bits_per_sample >= 32 {
            u32::MAX
        } else {
            (1u32 << format.bits_per_sample) - 1
        };

        let filled = match synth {
            Synth::Blank(value) => {
                let value = value & mask;
                fill(&mut frame, || value)
            }
            Synth::Noise(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(n as u64);
                fill(&mut frame, || rng.next_u32() & mask)
            }
        };
        filled.map_err(|e| HostError::frame_failed(&self.name, n, e))?;

        Ok(frame)
    }
}

fn fill(frame: &mut Frame, next: impl FnMut() -> u32) -> Result<(), crate::frame::ViewError> {
    match frame.plane(0).sample_width() {
        SampleWidth::Byte => fill_planes::<u8>(frame, next),
        SampleWidth::Word => fill_planes::<u16>(frame, next),
    }
}

fn fill_planes<T: Sample>(
    frame: &mut Frame,
    mut next: impl FnMut() -> u32,
) -> Result<(), crate::frame::ViewError> {
    for plane in 0..frame.num_planes() {
        let mut view = frame.plane_mut(plane).view_mut::<T>()?;
        for y in 0..view.height() {
            for sample in view.row_mut(y) {
                *sample = T::from_u32_truncating(next());
            }
        }
    }
    Ok(())
}

impl VideoNode for MemoryClip {
    fn name(&self) -> &str {
        &self.name
    }

    fn video_info(&self) -> &VideoInfo {
        &self.info
    }

    fn get_frame(
        &self,
        n: usize,
        reason: ActivationReason,
        _ctx: &mut dyn FrameContext,
    ) -> Result<Option<FrameRef>, HostError> {
        if reason != ActivationReason::Initial {
            return Ok(None);
        }
        match &self.content {
            Content::Frames(frames) => frames
                .get(n)
                .map(|frame| Some(Arc::clone(frame)))
                .ok_or_else(|| HostError::FrameOutOfRange {
                    node: self.name.clone(),
                    n,
                    num_frames: frames.len(),
                }),
            Content::Synth(synth) => self.synthesize(n, *synth).map(|f| Some(Arc::new(f))),
        }
    }
}
