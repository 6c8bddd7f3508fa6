//! Integration test crate for Snipline.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It drives `EditSession` end to end over in-memory media services.

#[cfg(test)]
mod fakes;

#[cfg(test)]
mod session;

#[cfg(test)]
mod render;
