use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Default number of concurrent delete workers.
const DEFAULT_MAX_DELETE_WORKERS: u16 = 8;

/// Configuration for a bulk deletion pipeline run.
///
/// Identifies the objects to delete (bucket plus key prefix) and bounds the
/// concurrency of the worker pool that deletes them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Name of the bucket whose objects are swept.
    pub bucket: String,
    /// Key prefix selecting the objects to delete.
    ///
    /// An empty prefix selects every object in the bucket.
    #[serde(default)]
    pub prefix: String,
    /// Number of delete workers running concurrently.
    #[serde(default = "default_max_delete_workers")]
    pub max_delete_workers: u16,
    /// Whether the sweeper exits non-zero when any individual delete failed.
    ///
    /// Per-object failures never abort the run either way; this only decides
    /// how the final report is judged.
    #[serde(default)]
    pub fail_on_delete_errors: bool,
}

fn default_max_delete_workers() -> u16 {
    DEFAULT_MAX_DELETE_WORKERS
}

impl PipelineConfig {
    /// Validates pipeline configuration settings.
    ///
    /// Checks that a bucket is named and that the worker count is non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bucket.is_empty() {
            return Err(ValidationError::EmptyBucket);
        }

        if self.max_delete_workers == 0 {
            return Err(ValidationError::MaxDeleteWorkersZero);
        }

        Ok(())
    }
}
