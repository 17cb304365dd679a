use serde::{Deserialize, Serialize};

use crate::SerializableSecretString;
use crate::shared::ValidationError;

/// Connection settings for the S3-compatible object store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct S3Config {
    /// Region of the target bucket.
    pub region: String,
    /// Access key id used for static credentials.
    pub access_key_id: String,
    /// Secret access key used for static credentials.
    pub secret_access_key: SerializableSecretString,
    /// Optional endpoint override for S3-compatible stores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl S3Config {
    /// Validates the S3 connection settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.region.is_empty() {
            return Err(ValidationError::EmptyRegion);
        }

        Ok(())
    }
}
