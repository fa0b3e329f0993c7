/*!
 * Core Module
 * Fundamental probe types, limits, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use config::ProbeConfig;
pub use errors::*;
pub use types::*;
