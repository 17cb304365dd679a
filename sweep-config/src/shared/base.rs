use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The target bucket name is empty.
    #[error("`bucket` cannot be empty")]
    EmptyBucket,
    /// Maximum delete workers cannot be zero.
    #[error("`max_delete_workers` cannot be zero")]
    MaxDeleteWorkersZero,
    /// The S3 region is empty.
    #[error("`region` cannot be empty")]
    EmptyRegion,
}
