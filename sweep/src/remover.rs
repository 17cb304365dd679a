use std::future::Future;

use crate::error::SweepResult;
use crate::types::ObjectRef;

/// Deleting collaborator.
///
/// The operation is assumed idempotent: deleting an object that no longer
/// exists counts as success. Implementations must tolerate concurrent use
/// from every worker in the pool.
pub trait ObjectRemover {
    fn delete_object(&self, object: &ObjectRef) -> impl Future<Output = SweepResult<()>> + Send;
}
