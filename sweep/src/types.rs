use serde::Serialize;
use std::fmt;

use crate::error::SweepError;

/// Identifier of a single object in the store.
///
/// Equality is by value; two refs naming the same bucket and key are the same
/// object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectRef {
    /// Bucket containing the object.
    pub bucket: String,
    /// Full key of the object within the bucket.
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// One unit of work moving through the pipeline.
///
/// Wraps the object to delete plus the sequence number assigned at enqueue
/// time. Tasks are immutable and live only for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTask {
    object: ObjectRef,
    sequence: u64,
}

impl DeleteTask {
    pub(crate) fn new(object: ObjectRef, sequence: u64) -> Self {
        Self { object, sequence }
    }

    /// The object this task deletes.
    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    /// Position of this task in enumeration order.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Consumes the task, returning the wrapped object.
    pub fn into_object(self) -> ObjectRef {
        self.object
    }
}

/// Outcome recorded when a task is acknowledged.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The object was deleted (or was already gone, which counts the same).
    Deleted,
    /// The delete failed; the error is recorded, never propagated.
    Failed(SweepError),
}

/// One object that could not be deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepFailure {
    /// The object whose delete failed.
    pub object: ObjectRef,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Aggregate result of one pipeline run.
///
/// `succeeded + failed == submitted` holds whenever a report is produced,
/// including runs cut short by an enumeration failure.
#[derive(Debug)]
pub struct SweepReport {
    /// Number of objects enumerated and handed to the worker pool.
    pub submitted: u64,
    /// Number of objects successfully deleted.
    pub succeeded: u64,
    /// Number of objects whose delete failed.
    pub failed: u64,
    /// The failed objects, in acknowledgment order.
    pub failures: Vec<SweepFailure>,
    /// Set when enumeration stopped before listing every object.
    ///
    /// The counts above then cover only the objects enumerated before the
    /// failure.
    pub enumeration_error: Option<SweepError>,
}
