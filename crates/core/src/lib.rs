//! catalog-qa core library
//!
//! Foundational utilities shared by every catalog-qa crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, ConfigOverrides, RetrievalConfig};
pub use error::{AppError, AppResult};
