use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::{debug, info};

use super::{ObjectStorage, StorageError};

/// S3 / MinIO backed object storage for a single bucket.
#[derive(Clone)]
pub struct S3ObjectStorage {
    client: S3Client,
    bucket: String,
    public_base: String,
}

impl S3ObjectStorage {
    pub fn new(client: S3Client, bucket: String, public_base: String) -> Self {
        Self {
            client,
            bucket,
            public_base,
        }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put(&self, path: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Write {
                path: path.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, path);
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes, StorageError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::Read {
                path: path.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let data = object.body.collect().await.map_err(|e| StorageError::Read {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        debug!("Downloaded s3://{}/{}", self.bucket, path);
        Ok(data.into_bytes())
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                path: path.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        info!("Deleted s3://{}/{}", self.bucket, path);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        public_object_url(&self.public_base, &self.bucket, path)
    }
}

/// `{base}/{bucket}/{path}` with each path segment percent-encoded.
fn public_object_url(base: &str, bucket: &str, path: &str) -> String {
    let Ok(mut url) = reqwest::Url::parse(base) else {
        return format!("{base}/{bucket}/{path}");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(bucket).extend(path.split('/'));
    }
    url.to_string()
}
