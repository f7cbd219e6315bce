//! # fileutil
//!
//! Filesystem utility primitives for CLI tools.
//!
//! - **Line streaming**: read any byte source line by line on a background
//!   task, with a bounded line buffer and explicit cancellation
//! - **Age sweeps**: delete files older than a threshold, narrowed by name
//!   prefix, suffix, regex or a custom predicate, with an optional callback
//!   that takes over deletion
//! - **Paths**: existence checks, owner-only folder creation, stdin detection
//! - **Downloads**: single-GET file download with certificate checks on by default
//! - **Virtual disks**: truncate, format and mount a file-backed disk

pub mod cli;
pub mod common;
pub mod disk;
pub mod net;
pub mod reader;
pub mod sweep;
