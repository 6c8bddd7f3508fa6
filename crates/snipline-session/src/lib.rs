//! Snipline Session - the edit-session state machine
//!
//! Tracks what has been loaded, marked, cut and composed, and decides which
//! commands are legal:
//! - `EditSession` with a single `handle(Command)` entry point
//! - Direct in/out editing and fixed-length segment accumulation modes
//! - Session notifications for the UI layer
//! - Background rendering with cancellation

pub mod command;
pub mod config;
pub mod error;
pub mod session;
pub mod worker;

pub use command::{Availability, Command, Outcome, SessionEvent};
pub use config::{EditMode, SessionConfig};
pub use error::{SessionError, SessionResult};
pub use session::EditSession;
pub use worker::{RenderEvent, RenderHandle, RenderJob, RenderKind};
