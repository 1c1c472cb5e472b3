//! Core infrastructure for oxidized-ppc
//!
//! Configuration loading, the shared error taxonomy and logging setup used by
//! the decoder and memory crates.

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{EmulatorError, Result};
