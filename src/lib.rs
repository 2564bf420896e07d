//! Library crate for portprobe exposing reusable scanning modules.
pub mod error;
pub mod ports;
pub mod probe;
pub mod scanner;
pub mod services;
pub mod shuffle;
pub mod targets;
pub mod types;

pub use error::{Result, ScanError};
