use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;

use crate::adapters::object_store::{ObjectStore, ObjectStoreError, StoredObject};

/// S3 error codes returned when an `If-Match` precondition fails.
const CONFLICT_ERROR_CODES: [&str; 2] = ["PreconditionFailed", "ConditionalRequestConflict"];

pub struct S3ObjectStore {
    bucket: String,
    s3_client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(bucket: impl Into<String>, s3_client: aws_sdk_s3::Client) -> Self {
        Self {
            bucket: bucket.into(),
            s3_client,
        }
    }
}

impl ObjectStore for S3ObjectStore {
    fn get_object(&self, key: &str) -> Result<StoredObject, ObjectStoreError> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(bucket.clone())
                    .key(object_key.clone())
                    .send()
                    .await
                    .map_err(|error| {
                        ObjectStoreError::Failed(format!(
                            "failed to read s3://{bucket}/{object_key}: {}",
                            DisplayErrorContext(&error)
                        ))
                    })?;

                let version = output.e_tag().map(str::to_string);
                let body = output.body.collect().await.map_err(|error| {
                    ObjectStoreError::Failed(format!(
                        "failed to read body of s3://{bucket}/{object_key}: {error}"
                    ))
                })?;

                Ok::<_, ObjectStoreError>(StoredObject {
                    body: body.into_bytes().to_vec(),
                    version,
                })
            })
        })
    }

    fn put_object(
        &self,
        key: &str,
        body: &[u8],
        expected_version: Option<&str>,
    ) -> Result<(), ObjectStoreError> {
        let bucket = self.bucket.clone();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let if_match = expected_version.map(str::to_string);
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket.clone())
                    .key(object_key.clone())
                    .set_if_match(if_match)
                    .content_type("application/json")
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        if error
                            .code()
                            .is_some_and(|code| CONFLICT_ERROR_CODES.contains(&code))
                        {
                            ObjectStoreError::Conflict { key: object_key }
                        } else {
                            ObjectStoreError::Failed(format!(
                                "failed to write object to s3://{bucket}/{object_key}: {}",
                                DisplayErrorContext(&error)
                            ))
                        }
                    })
            })
        })
    }
}
