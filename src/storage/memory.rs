//! In-memory object store for tests.

#![allow(dead_code)] // Inspection helpers are only called from tests

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use super::{ObjectStore, StorageResult};

#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, (Bytes, String)>>,
    public_host: String,
    bucket: String,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_host: "storage.test".to_string(),
            bucket: "artifacts".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.read().get(key).map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> StorageResult<()> {
        self.objects
            .write()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.write().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://{}.{}/{}", self.bucket, self.public_host, key)
    }
}
