/*!
 * Probe Configuration
 *
 * Shared runtime settings. Resolved from defaults, then environment,
 * then command-line flags (applied by the binary).
 */

use super::errors::ProbeError;
use super::limits::{FILL_BYTE, PAGE_SIZE};
use super::types::ProbeResult;
use std::path::PathBuf;

/// Environment variable overriding the directory for transient files
pub const TMPDIR_ENV: &str = "MEMPROBE_TMPDIR";

/// Settings shared by every probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Stride used when touching buffers
    pub page_size: usize,
    /// Pattern byte written on first fill
    pub fill_byte: u8,
    /// Directory for transient backing files
    pub temp_dir: PathBuf,
    /// Emit one JSON document instead of human-readable lines
    pub json: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            fill_byte: FILL_BYTE,
            temp_dir: std::env::temp_dir(),
            json: false,
        }
    }
}

impl ProbeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(TMPDIR_ENV).filter(|v| !v.is_empty()) {
            config.temp_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn with_fill_byte(mut self, byte: u8) -> Self {
        self.fill_byte = byte;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn validate(&self) -> ProbeResult<()> {
        if self.page_size == 0 || !self.page_size.is_power_of_two() {
            return Err(ProbeError::InvalidConfig(format!(
                "page size must be a non-zero power of two, got {}",
                self.page_size
            )));
        }
        Ok(())
    }
}

/// Reject a zero-sized request for the named setting
pub fn require_nonzero(name: &str, value: usize) -> ProbeResult<()> {
    if value == 0 {
        return Err(ProbeError::InvalidConfig(format!("{name} must be greater than zero")));
    }
    Ok(())
}
