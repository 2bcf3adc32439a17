//! Host frame-graph runtime.
//!
//! The filter only talks to the graph through the [`VideoNode`] and
//! [`FrameContext`] traits. This module provides an in-process
//! implementation of the other side: a [`Core`] that drives the two-phase
//! request/ready protocol, [`MemoryClip`] sources, and a [`Plugin`]
//! registry that constructs filters from named argument maps.

mod memory;
mod node;
mod plugin;
mod scheduler;

pub use memory::MemoryClip;
pub use node::{
    same_node, ActivationReason, FilterMode, FrameContext, FrameRef, HostError, Node, VideoNode,
};
pub use plugin::{
    ArgMap, ArgSpec, ArgType, CreateFn, Function, Plugin, PluginError, PluginMetadata, Signature,
    Value,
};
pub use scheduler::{Core, RenderStats, RenderStatsSnapshot};
