//! Moviola Audio - streaming playback
//!
//! Architecture:
//! - `StreamingAudioClip`: lock-free SPSC sample buffer between a producer
//!   (decoder) and a consumer (the engine)
//! - `Mixer`: combines playing voices with volume, pan and a limiter
//! - `AudioEngine`: the `AudioBackend`; mixes voices into its output clip
//! - `AudioOutput`: feeds the engine output to the default cpal device

pub mod backend;
pub mod engine;
pub mod mixer;
pub mod output;
pub mod streaming;

pub use backend::{AudioBackend, AudioPosition, PlaybackHandle};
pub use engine::{AudioEngine, VoiceHandle};
pub use mixer::{MixSource, Mixer, MixerChannel};
pub use output::AudioOutput;
pub use streaming::StreamingAudioClip;
