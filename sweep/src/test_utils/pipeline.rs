use sweep_config::shared::PipelineConfig;

use crate::pipeline::Pipeline;
use crate::test_utils::store::FakeObjectStore;

/// Builds a pipeline that both lists from and deletes against `store`.
pub fn create_pipeline(
    store: &FakeObjectStore,
    bucket: &str,
    prefix: &str,
    max_delete_workers: u16,
) -> Pipeline<FakeObjectStore, FakeObjectStore> {
    let config = PipelineConfig {
        bucket: bucket.to_string(),
        prefix: prefix.to_string(),
        max_delete_workers,
        fail_on_delete_errors: false,
    };

    Pipeline::new(config, store.clone(), store.clone())
}
