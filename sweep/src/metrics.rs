use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge};

static REGISTER_METRICS: Once = Once::new();

pub const SWEEP_OBJECTS_SUBMITTED_TOTAL: &str = "sweep_objects_submitted_total";
pub const SWEEP_OBJECTS_DELETED_TOTAL: &str = "sweep_objects_deleted_total";
pub const SWEEP_OBJECTS_FAILED_TOTAL: &str = "sweep_objects_failed_total";
pub const SWEEP_ACTIVE_WORKERS: &str = "sweep_active_workers";

/// Registers metrics emitted by the sweep pipeline. Called when a pipeline is
/// created; safe to call multiple times, registration happens only once.
pub(crate) fn register_metrics() {
    REGISTER_METRICS.call_once(|| {
        describe_counter!(
            SWEEP_OBJECTS_SUBMITTED_TOTAL,
            Unit::Count,
            "Total number of objects enumerated and handed to the worker pool"
        );

        describe_counter!(
            SWEEP_OBJECTS_DELETED_TOTAL,
            Unit::Count,
            "Total number of objects successfully deleted"
        );

        describe_counter!(
            SWEEP_OBJECTS_FAILED_TOTAL,
            Unit::Count,
            "Total number of objects whose delete failed"
        );

        describe_gauge!(
            SWEEP_ACTIVE_WORKERS,
            Unit::Count,
            "Number of delete workers that have not yet stopped"
        );
    });
}
