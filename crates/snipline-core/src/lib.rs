//! Snipline Core - foundation types shared by the media and session crates
//!
//! This crate provides:
//! - Time representation (TimePoint, TimeRange) with exact arithmetic
//! - Position label and FFmpeg timecode formatting/parsing
//! - The shared error type

pub mod error;
pub mod time;

pub use error::{Result, SniplineError};
pub use time::{format_position, parse_timecode, TimePoint, TimeRange};
