//! Rankcast Stream Engine
//!
//! Runs the external encoder that loops the still image into a live RTMP
//! stream, and keeps it running.
//!
//! The encoder and the renderer share nothing but the image file: the
//! encoder re-reads it at the input frame rate, so every atomic replacement
//! shows up in the stream without a restart.

pub mod encoder;
pub mod supervisor;

pub use encoder::{command_exists, EncoderConfig};
pub use supervisor::{describe_exit, RestartPolicy, StreamHandle, StreamState, StreamSupervisor};
