use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use secrecy::ExposeSecret;
use sweep_config::shared::S3Config;
use tracing::{debug, info};

use crate::enumerator::{ObjectLister, ObjectPage};
use crate::error::{ErrorKind, SweepResult};
use crate::remover::ObjectRemover;
use crate::sweep_error;
use crate::types::ObjectRef;

/// Error code S3 returns for operations on a key that does not exist.
const NO_SUCH_KEY: &str = "NoSuchKey";

/// S3 client implementing both pipeline collaborators.
///
/// The inner SDK client is cheaply cloneable and safe for concurrent use, so
/// a single instance is shared across the whole worker pool.
#[derive(Debug, Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Creates an S3 client from static credentials.
    ///
    /// An endpoint override switches the client to path-style addressing,
    /// which S3-compatible stores generally require.
    pub async fn connect(config: &S3Config) -> S3Client {
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.expose_secret().to_string(),
            None,
            None,
            "static",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = config.endpoint.clone() {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        S3Client {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Verifies the bucket is reachable with the configured credentials.
    pub async fn healthcheck(&self, bucket: &str) -> SweepResult<()> {
        info!("checking access to bucket '{}'", bucket);

        self.client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| {
                sweep_error!(
                    ErrorKind::ConfigError,
                    "Bucket is not accessible",
                    DisplayErrorContext(&err)
                )
            })?;

        Ok(())
    }
}

impl ObjectLister for S3Client {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<&str>,
    ) -> SweepResult<ObjectPage> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation.map(str::to_string))
            .send()
            .await
            .map_err(|err| {
                sweep_error!(
                    ErrorKind::EnumerationFailed,
                    "Failed to list objects",
                    DisplayErrorContext(&err)
                )
            })?;

        let keys = response
            .contents()
            .iter()
            .filter_map(|object| object.key())
            .map(str::to_string)
            .collect::<Vec<_>>();

        debug!("listed {} objects from bucket '{}'", keys.len(), bucket);

        Ok(ObjectPage {
            keys,
            next_token: response.next_continuation_token().map(str::to_string),
        })
    }
}

impl ObjectRemover for S3Client {
    async fn delete_object(&self, object: &ObjectRef) -> SweepResult<()> {
        let result = self
            .client
            .delete_object()
            .bucket(&object.bucket)
            .key(&object.key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            // Deletes are idempotent: a key that is already gone counts as
            // deleted.
            Err(err)
                if err
                    .as_service_error()
                    .and_then(|service_err| service_err.code())
                    == Some(NO_SUCH_KEY) =>
            {
                debug!("object {} was already gone", object);
                Ok(())
            }
            Err(err) => Err(sweep_error!(
                ErrorKind::DeleteFailed,
                "Failed to delete object",
                DisplayErrorContext(&err)
            )),
        }
    }
}
