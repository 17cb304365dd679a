//! Configuration management for the sweep services.
//!
//! Provides environment detection, configuration loading from YAML files with
//! environment variable overrides, secret handling, and the shared typed
//! configuration structs consumed by the pipeline and the sweeper binary.

mod environment;
mod load;
mod secret;
pub mod shared;

pub use environment::*;
pub use load::*;
pub use secret::*;
