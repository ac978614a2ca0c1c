//! Artifact manager: team solution files and their metadata records.
//!
//! Every artifact is one object in the object store plus one record in the
//! base, linked only by the URL stored on the record. The two writes are
//! not transactional: an object put followed by a failed record create
//! leaves the object orphaned, and a delete that fails halfway leaves the
//! stores diverged. There is no compensation and no reconciliation.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;

use crate::domain::Artifact;
use crate::error::{AppError, Result};
use crate::mapper;
use crate::records::{Fields, RecordsBase, RecordsError, SelectOptions, SortDirection};
use crate::schema;
use crate::storage::ObjectStore;

pub struct ArtifactUpload {
    pub team_id: String,
    /// Display name shown in listings, independent of the file name.
    pub name: String,
    /// Original file name; only the extension survives into the storage key.
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

pub struct ArtifactManager {
    base: Arc<dyn RecordsBase>,
    store: Arc<dyn ObjectStore>,
}

impl ArtifactManager {
    pub fn new(base: Arc<dyn RecordsBase>, store: Arc<dyn ObjectStore>) -> Self {
        Self { base, store }
    }

    /// Upload the file and create its linked record.
    ///
    /// The storage key is a fresh v4 UUID carrying the original file
    /// extension; no existence check is performed.
    pub async fn upload(&self, upload: ArtifactUpload) -> Result<Artifact> {
        let extension = last_segment(&upload.file_name, '.');
        let key = format!("{}.{}", uuid::Uuid::new_v4(), extension);

        self.store
            .put(&key, upload.bytes, &upload.content_type)
            .await?;
        let file_url = self.store.public_url(&key);

        // The object is already written; if anything below fails it stays
        // behind with no record pointing at it.
        let team_record_id = self.lookup_team_record_id(&upload.team_id).await?;

        let mut fields = Fields::new();
        fields.insert(
            schema::artifact::TEAM.to_string(),
            serde_json::json!([team_record_id]),
        );
        fields.insert(schema::artifact::NAME.to_string(), upload.name.clone().into());
        fields.insert(schema::artifact::FILE_URL.to_string(), file_url.clone().into());

        let created = self
            .base
            .create(schema::tables::ARTIFACTS, vec![fields])
            .await?;
        let record = created.first().ok_or_else(|| {
            AppError::Records(RecordsError::Api {
                status: 500,
                message: "create returned no records".to_string(),
            })
        })?;

        tracing::info!(artifact = %record.id, team = %upload.team_id, key = %key, "artifact uploaded");
        Ok(Artifact {
            id: record.id.clone(),
            team_id: upload.team_id,
            name: upload.name,
            file_url,
            created_at: Utc::now(),
        })
    }

    /// The team's artifacts, newest first.
    pub async fn list_for_team(&self, team_id: &str) -> Result<Vec<Artifact>> {
        let formula = format!("FIND(\"{}\", {{{}}})", team_id, schema::artifact::TEAM);
        let records = self
            .base
            .select(
                schema::tables::ARTIFACTS,
                SelectOptions::filter(formula)
                    .sorted_by(schema::artifact::CREATED_AT, SortDirection::Desc),
            )
            .await?;

        let mut artifacts = Vec::with_capacity(records.len());
        for record in &records {
            artifacts.push(mapper::artifact_from_record(record, team_id)?);
        }
        Ok(artifacts)
    }

    /// Delete the object (key recovered from the URL's last path segment),
    /// then the record. Destroying an unknown record id is an error.
    pub async fn delete(&self, artifact_id: &str, file_url: &str) -> Result<()> {
        let key = last_segment(file_url, '/');
        self.store.delete(key).await?;
        self.base
            .destroy(schema::tables::ARTIFACTS, &[artifact_id.to_string()])
            .await?;
        tracing::info!(artifact = %artifact_id, key = %key, "artifact deleted");
        Ok(())
    }

    async fn lookup_team_record_id(&self, team_id: &str) -> Result<String> {
        let formula = format!("{{{}}} = \"{}\"", schema::team::ID, team_id);
        let records = self
            .base
            .select(schema::tables::TEAMS, SelectOptions::filter(formula).max(1))
            .await?;
        records
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or(AppError::TeamNotFound)
    }
}

/// Everything after the last separator; the whole input when the
/// separator does not occur.
fn last_segment(s: &str, separator: char) -> &str {
    s.rsplit(separator).next().unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MemoryBase;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn seed_team(base: &MemoryBase, id: &str) {
        let fields = match json!({
            "ID": id,
            "Название": "Code Wizards",
            "Хакатон": ["hack1"],
            "Участники": ["u1"],
            "Лидер": ["u1"],
            "Код приглашения": "WIZARDS1",
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        base.seed(schema::tables::TEAMS, id, fields);
    }

    fn setup() -> (Arc<MemoryBase>, Arc<MemoryStore>, ArtifactManager) {
        let base = Arc::new(MemoryBase::new());
        let store = Arc::new(MemoryStore::new());
        seed_team(&base, "t1");
        let manager = ArtifactManager::new(base.clone(), store.clone());
        (base, store, manager)
    }

    fn upload_request(name: &str, file_name: &str) -> ArtifactUpload {
        ArtifactUpload {
            team_id: "t1".to_string(),
            name: name.to_string(),
            file_name: file_name.to_string(),
            content_type: "application/zip".to_string(),
            bytes: Bytes::from_static(b"PK\x03\x04"),
        }
    }

    #[tokio::test]
    async fn test_upload_creates_one_object_and_one_record() {
        let (base, store, manager) = setup();

        let artifact = manager.upload(upload_request("Demo", "solution.zip")).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(artifact.file_url.ends_with(".zip"));

        let listed = manager.list_for_team("t1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Demo");
        assert!(listed[0].file_url.ends_with(".zip"));

        // The record links back to the team's store-level id.
        let records = base
            .select(schema::tables::ARTIFACTS, SelectOptions::default())
            .await
            .unwrap();
        assert_eq!(records[0].list_field(schema::artifact::TEAM), vec!["t1"]);
        let key = last_segment(&artifact.file_url, '/');
        assert_eq!(store.content_type(key).as_deref(), Some("application/zip"));
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let (_base, _store, manager) = setup();
        manager.upload(upload_request("First", "a.zip")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        manager.upload(upload_request("Second", "b.zip")).await.unwrap();

        let listed = manager.list_for_team("t1").await.unwrap();
        let names: Vec<_> = listed.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn test_delete_removes_object_and_record() {
        let (_base, store, manager) = setup();
        let artifact = manager.upload(upload_request("Demo", "solution.zip")).await.unwrap();

        manager.delete(&artifact.id, &artifact.file_url).await.unwrap();
        assert!(store.is_empty());
        assert!(manager.list_for_team("t1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_artifact_is_an_error() {
        let (_base, _store, manager) = setup();
        let err = manager
            .delete("recNope", "https://artifacts.storage.test/gone.zip")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Records(RecordsError::RecordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_record_create_orphans_the_object() {
        let (base, store, manager) = setup();
        base.fail_next_create();

        let err = manager.upload(upload_request("Demo", "solution.zip")).await.unwrap_err();
        assert!(matches!(err, AppError::Records(_)));

        // The object was written before the record create failed and
        // nothing cleans it up.
        assert_eq!(store.len(), 1);
        assert!(manager.list_for_team("t1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_for_unknown_team_still_writes_the_object() {
        let (_base, store, manager) = setup();
        let mut request = upload_request("Demo", "solution.zip");
        request.team_id = "t9".to_string();

        let err = manager.upload(request).await.unwrap_err();
        assert!(matches!(err, AppError::TeamNotFound));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_extension_of_dotless_file_name_is_the_whole_name() {
        let (_base, _store, manager) = setup();
        let artifact = manager.upload(upload_request("Notes", "readme")).await.unwrap();
        assert!(artifact.file_url.ends_with(".readme"));
    }
}
