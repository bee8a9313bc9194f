//! Error handling for the shell.
//!
//! Errors only surface at the edges of the program: loading configuration,
//! parsing the command line, reading fixture data and driving the line editor.
//! The completion engine itself never returns an error; API failures are
//! logged and degraded to fallback suggestions.
//!
//! # Example
//!
//! ```rust,no_run
//! use xcsh::error::{ConfigError, Result, ShellError};
//!
//! fn check_ttl(ttl: u64) -> Result<()> {
//!     if ttl == 0 {
//!         return Err(ShellError::Config(ConfigError::InvalidValue {
//!             field: "completion.cache_ttl_secs".to_string(),
//!             value: ttl.to_string(),
//!         }));
//!     }
//!     Ok(())
//! }
//! ```

pub mod kinds;

pub use kinds::{ApiError, ConfigError, Result, ShellError};
