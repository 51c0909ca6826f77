//! Input and parsing helper functions for the CLI.
//!
//! This module provides utilities for:
//! - Password prompting and reading command input (`input`)
//! - Duration and address parsing (`parsing`)

mod input;
mod parsing;

// Re-export public API
pub use input::{prompt_new_password, prompt_password, read_input};
pub use parsing::{parse_duration, parse_ip};
