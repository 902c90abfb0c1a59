//! # Hex Development Tools
//!
//! Command-line tools for development:
//! - Save-file and data-table validators
//! - Headless simulation runner

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod simulate;
pub mod validate;

pub use error::{ToolError, ToolResult};
