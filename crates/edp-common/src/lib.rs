//! EDP Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error taxonomy and logging for the EDP workspace members.
//!
//! # Overview
//!
//! - **Error Handling**: the pipeline-wide error taxonomy splitting failures
//!   into retryable and fatal classes
//! - **Logging**: tracing subscriber setup (console and rotating file output)
//!
//! # Example
//!
//! ```no_run
//! use edp_common::{PipelineError, Result};
//!
//! fn parse_count(raw: &str) -> Result<usize> {
//!     raw.parse()
//!         .map_err(|_| PipelineError::Schema(format!("not a count: {raw}")))
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{PipelineError, Result};
