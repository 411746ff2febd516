//! Multi-model AI chat TUI.
//!
//! The conversation session, the model catalog, and the capability seam live
//! here so embedding hosts and tests can drive them without a terminal; the
//! `polychat` binary wires them to a ratatui surface.

pub mod app;
pub mod capability;
pub mod catalog;
pub mod config;
pub mod demo;
pub mod handler;
pub mod readiness;
pub mod session;
pub mod tui;
pub mod ui;

pub use capability::{CapabilityReply, CapabilitySlot, ChatCapability, ChatOptions, Turn};
pub use catalog::ModelInfo;
pub use session::{ChatRole, Message, Session};
