//! Foundational low-level utilities shared across Warden crates.
//!
//! Provides atomic file-write helpers, time/formatting utilities, and mention
//! sanitization used by the bot runtime and the promotion renderer.

pub mod atomic_io;
pub mod sanitize;
pub mod time_utils;
pub mod tracing_setup;

pub use atomic_io::write_text_atomic;
pub use sanitize::sanitize_everyone;
pub use time_utils::{current_unix_timestamp, current_unix_timestamp_ms, render_clock, utc_now_iso8601};
pub use tracing_setup::init_tracing;
