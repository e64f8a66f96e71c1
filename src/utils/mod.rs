//! Utility modules for common functionality
//!
//! Logging setup, progress display and tag formatting used by the CLI.

pub mod logger;
pub mod progress;
pub mod tag_utils;
