//! CLI command handlers

pub mod commands;

pub use commands::{process, render_preview, require_input};
