//! Moviola Media - decoder side of the movie player
//!
//! This crate handles:
//! - The `MovieDecoder` interface the player drives
//! - The `FrameSink` decoders push frames and samples into
//! - Stream metadata (`MediaInfo`)
//! - A synthetic colour-bar/sine-tone decoder for demos and tests

pub mod decoder;
pub mod info;
pub mod test_pattern;

pub use decoder::{FrameSink, MovieDecoder};
pub use info::{AudioStreamInfo, MediaInfo, StreamType, VideoStreamInfo};
pub use test_pattern::{TestPatternConfig, TestPatternDecoder};
