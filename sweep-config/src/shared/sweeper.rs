use serde::{Deserialize, Serialize};

use crate::shared::pipeline::PipelineConfig;
use crate::shared::{S3Config, ValidationError};

/// Complete configuration for the sweeper service.
///
/// Aggregates everything required to run one bulk deletion: the pipeline
/// settings and the object store connection. Loaded from configuration files
/// at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SweeperConfig {
    /// Configuration for the deletion pipeline.
    pub pipeline: PipelineConfig,
    /// Connection configuration for the object store.
    pub s3: S3Config,
}

impl SweeperConfig {
    /// Validates the complete sweeper configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pipeline.validate()?;
        self.s3.validate()
    }
}
