pub mod clients;
pub mod concurrency;
pub mod enumerator;
pub mod error;
mod macros;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod remover;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod tracker;
pub mod types;
pub mod workers;
