use sweep::clients::s3::S3Client;
use sweep::enumerator::ObjectLister;
use sweep::pipeline::Pipeline;
use sweep::remover::ObjectRemover;
use sweep::types::SweepReport;
use sweep_config::shared::{PipelineConfig, S3Config, SweeperConfig};
use tracing::{error, info, warn};

use crate::config::load_sweeper_config;

pub async fn start_sweeper() -> anyhow::Result<()> {
    info!("starting sweeper service");
    let config = load_sweeper_config()?;

    log_config(&config);

    let s3_client = S3Client::connect(&config.s3).await;
    s3_client.healthcheck(&config.pipeline.bucket).await?;

    let fail_on_delete_errors = config.pipeline.fail_on_delete_errors;
    let pipeline = Pipeline::new(config.pipeline, s3_client.clone(), s3_client);
    let report = run_pipeline(pipeline).await?;

    render_report(&report);

    if let Some(err) = &report.enumeration_error {
        anyhow::bail!("sweep aborted during enumeration: {err}");
    }

    if fail_on_delete_errors && report.failed > 0 {
        anyhow::bail!("{} objects could not be deleted", report.failed);
    }

    info!("sweeper service completed");
    Ok(())
}

fn log_config(config: &SweeperConfig) {
    log_pipeline_config(&config.pipeline);
    log_s3_config(&config.s3);
}

fn log_pipeline_config(config: &PipelineConfig) {
    info!(
        bucket = config.bucket,
        prefix = config.prefix,
        max_delete_workers = config.max_delete_workers,
        fail_on_delete_errors = config.fail_on_delete_errors,
        "pipeline config"
    );
}

fn log_s3_config(config: &S3Config) {
    info!(
        region = config.region,
        endpoint = config.endpoint.as_deref().unwrap_or("default"),
        "s3 connection config",
    );
}

#[tracing::instrument(skip(pipeline), fields(bucket = pipeline.bucket()))]
async fn run_pipeline<L, R>(pipeline: Pipeline<L, R>) -> anyhow::Result<SweepReport>
where
    L: ObjectLister,
    R: ObjectRemover + Clone + Send + Sync + 'static,
{
    // Listen for shutdown signals while the pipeline runs; a signal stops
    // enumeration and the run drains the already-submitted objects.
    let shutdown_tx = pipeline.shutdown_tx();
    let shutdown_handle = tokio::spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};

        // SIGTERM is what orchestrators send before a hard kill.
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("SIGINT (Ctrl+C) received, shutting down pipeline");
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down pipeline");
            }
        }

        if let Err(e) = shutdown_tx.shutdown() {
            warn!("failed to send shutdown signal: {:?}", e);
        }
    });

    let result = pipeline.run().await;

    // If the pipeline finished on its own, the signal listener is still
    // pending; drop it rather than wait for a signal that never comes.
    shutdown_handle.abort();
    let _ = shutdown_handle.await;

    Ok(result?)
}

fn render_report(report: &SweepReport) {
    for failure in &report.failures {
        error!("failed to delete {}: {}", failure.object, failure.reason);
    }

    info!(
        submitted = report.submitted,
        succeeded = report.succeeded,
        failed = report.failed,
        failures = report.failures.len(),
        "sweep summary"
    );

    let rendered = serde_json::json!({
        "submitted": report.submitted,
        "succeeded": report.succeeded,
        "failed": report.failed,
        "failures": &report.failures,
        "enumeration_error": report.enumeration_error.as_ref().map(|err| err.to_string()),
    });

    println!("{rendered}");
}
