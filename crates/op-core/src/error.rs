//! Error types for oxidized-ppc

use thiserror::Error;

/// Top-level emulator error
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Memory subsystem errors
///
/// Out-of-range guest accesses are not errors: reads yield zero and writes
/// are dropped. Only construction of the backing store can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Failed to allocate {size} bytes of guest RAM")]
    AllocationFailed { size: usize },
}

/// Configuration loading/saving errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type alias for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;
