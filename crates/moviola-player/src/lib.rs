//! Moviola Player - movie playback
//!
//! A `MoviePlayer` drives a `MovieDecoder` from a background thread, keeps
//! a short queue of decoded frames and a streaming audio clip topped up, and
//! presents frames against its own clock:
//!
//! ```text
//! decode driver ──request──► decoder ──frames──► MovieSink ──channel──► ingest worker
//!                                     ──samples─► StreamingAudioClip        │
//!                                                                           ▼
//!                      update(dt) ◄── promote due frames ◄──────────── FrameQueue
//!                      render(rc) ──► render target ──► sprite()
//! ```

pub mod config;
pub mod driver;
pub mod frame_queue;
pub mod ingest;
pub mod player;
pub mod presenter;
mod shared;
pub mod sink;
pub mod state;
pub mod stream;

pub use config::PlayerConfig;
pub use frame_queue::{FrameQueue, PendingFrame};
pub use moviola_media::StreamType;
pub use player::{MoviePlayer, ResetHook};
pub use sink::MovieSink;
pub use state::PlayerState;
pub use stream::Stream;
