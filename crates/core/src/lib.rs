//! Face extraction core.
//!
//! Pulls frames from a video file or a folder of images, runs detection and
//! alignment through pluggable backends, applies an optional chain of
//! post-processing actions (diagnostic overlays, identity filtering), and
//! persists resumable per-frame alignment metadata.

pub mod alignments;
pub mod config;
pub mod detection;
pub mod media;
pub mod pipeline;
pub mod postprocess;
pub mod shared;
