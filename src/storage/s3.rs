//! S3-compatible object store backend.
//!
//! Works against AWS S3 and S3-compatible providers (the production
//! deployment uses one behind a custom endpoint).

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Builder, Credentials, Region},
    primitives::ByteStream,
    Client,
};
use bytes::Bytes;

use super::{ObjectStore, StorageError, StorageResult};

#[derive(Clone, Debug)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Endpoint URL of the provider, e.g. `https://storage.yandexcloud.net`.
    pub endpoint: String,
    /// Host used when constructing public URLs
    /// (`https://<bucket>.<public_host>/<key>`). Usually the endpoint host.
    pub public_host: String,
    pub access_key: String,
    pub secret_key: String,
}

pub struct S3Store {
    client: Client,
    bucket: String,
    public_host: String,
}

impl S3Store {
    pub fn new(config: S3Config) -> Self {
        let creds = Credentials::new(
            config.access_key,
            config.secret_key,
            None,
            None,
            "static",
        );

        let sdk_config = Builder::new()
            .region(Region::new(config.region))
            .endpoint_url(config.endpoint)
            .credentials_provider(creds)
            .behavior_version_latest()
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket,
            public_host: config.public_host,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Other(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Other(e.to_string()))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://{}.{}/{}", self.bucket, self.public_host, key)
    }
}
