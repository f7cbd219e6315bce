//! Streaming line reader.
//!
//! A background task reads any byte source and hands decoded lines to the
//! caller one at a time through a bounded channel, so large inputs are never
//! held in memory at once.

pub mod source;
pub mod streamer;

pub use source::LineSource;
pub use streamer::{stream_lines, LineItem, LineStream, LineStreamer, DEFAULT_MAX_LINE_BYTES};
