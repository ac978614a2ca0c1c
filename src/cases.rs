//! Case (challenge) management.
//!
//! Case-to-team and case-to-link associations are literal id lists stored
//! on the case record. Edits fetch the current list, modify it in memory,
//! and write it back; the other side of the association is never touched,
//! and nothing enforces referential integrity.

use std::sync::Arc;

use crate::domain::{Case, CaseDraft, CasePatch};
use crate::error::{AppError, Result};
use crate::mapper;
use crate::records::{Fields, RecordUpdate, RecordsBase, RecordsError, SelectOptions, SortDirection};
use crate::schema;

pub struct CaseManager {
    base: Arc<dyn RecordsBase>,
}

impl CaseManager {
    pub fn new(base: Arc<dyn RecordsBase>) -> Self {
        Self { base }
    }

    pub async fn all(&self) -> Result<Vec<Case>> {
        let records = self
            .base
            .select(
                schema::tables::CASES,
                SelectOptions::default().sorted_by(schema::case::ID, SortDirection::Asc),
            )
            .await?;
        Ok(records.iter().map(mapper::case_from_record).collect())
    }

    /// Lookup by store-level record id; `None` when the record is gone.
    pub async fn by_id(&self, case_id: &str) -> Result<Option<Case>> {
        match self.base.find(schema::tables::CASES, case_id).await {
            Ok(record) => Ok(Some(mapper::case_from_record(&record))),
            Err(RecordsError::RecordNotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn by_hackathon(&self, hackathon_id: &str) -> Result<Vec<Case>> {
        let formula = format!("FIND(\"{}\", {{{}}})", hackathon_id, schema::case::HACKATHONS);
        let records = self
            .base
            .select(
                schema::tables::CASES,
                SelectOptions::filter(formula).sorted_by(schema::case::ID, SortDirection::Asc),
            )
            .await?;
        Ok(records.iter().map(mapper::case_from_record).collect())
    }

    pub async fn create(&self, draft: CaseDraft) -> Result<Case> {
        if draft.name.trim().is_empty() {
            return Err(AppError::Validation("case name is required".to_string()));
        }

        let mut fields = Fields::new();
        fields.insert(schema::case::NAME.to_string(), draft.name.into());
        fields.insert(schema::case::DESCRIPTION.to_string(), draft.description.into());
        if let Some(info) = draft.results_upload_info {
            fields.insert(schema::case::RESULTS_UPLOAD_INFO.to_string(), info.into());
        }
        if let Some(deadline) = draft.deadline {
            fields.insert(schema::case::DEADLINE.to_string(), deadline.into());
        }
        fields.insert(
            schema::case::HACKATHONS.to_string(),
            serde_json::json!(draft.hackathon_ids),
        );

        let created = self.base.create(schema::tables::CASES, vec![fields]).await?;
        let record = created.first().ok_or_else(|| {
            AppError::Records(RecordsError::Api {
                status: 500,
                message: "create returned no records".to_string(),
            })
        })?;
        tracing::info!(case = %record.id, "case created");
        Ok(mapper::case_from_record(record))
    }

    /// Merge the patch into the record; absent fields stay untouched.
    pub async fn update(&self, case_id: &str, patch: CasePatch) -> Result<Case> {
        let mut fields = Fields::new();
        if let Some(name) = patch.name {
            fields.insert(schema::case::NAME.to_string(), name.into());
        }
        if let Some(description) = patch.description {
            fields.insert(schema::case::DESCRIPTION.to_string(), description.into());
        }
        if let Some(info) = patch.results_upload_info {
            fields.insert(schema::case::RESULTS_UPLOAD_INFO.to_string(), info.into());
        }
        if let Some(deadline) = patch.deadline {
            fields.insert(schema::case::DEADLINE.to_string(), deadline.into());
        }
        if let Some(hackathon_ids) = patch.hackathon_ids {
            fields.insert(
                schema::case::HACKATHONS.to_string(),
                serde_json::json!(hackathon_ids),
            );
        }

        self.write(case_id, fields).await
    }

    pub async fn delete(&self, case_id: &str) -> Result<()> {
        self.base
            .destroy(schema::tables::CASES, &[case_id.to_string()])
            .await?;
        tracing::info!(case = %case_id, "case deleted");
        Ok(())
    }

    /// Add the team to the case's list if it is not there yet.
    pub async fn assign_team(&self, case_id: &str, team_id: &str) -> Result<Case> {
        self.edit_list(case_id, schema::case::TEAMS, |mut ids| {
            if !ids.iter().any(|id| id == team_id) {
                ids.push(team_id.to_string());
            }
            ids
        })
        .await
    }

    pub async fn unassign_team(&self, case_id: &str, team_id: &str) -> Result<Case> {
        self.edit_list(case_id, schema::case::TEAMS, |ids| {
            ids.into_iter().filter(|id| id != team_id).collect()
        })
        .await
    }

    pub async fn add_link(&self, case_id: &str, link_id: &str) -> Result<Case> {
        self.edit_list(case_id, schema::case::LINKS, |mut ids| {
            if !ids.iter().any(|id| id == link_id) {
                ids.push(link_id.to_string());
            }
            ids
        })
        .await
    }

    pub async fn remove_link(&self, case_id: &str, link_id: &str) -> Result<Case> {
        self.edit_list(case_id, schema::case::LINKS, |ids| {
            ids.into_iter().filter(|id| id != link_id).collect()
        })
        .await
    }

    /// Fetch-modify-write of one id-list field. Subject to the same lost-
    /// update window as every list mutation against the base.
    async fn edit_list<F>(&self, case_id: &str, field: &str, edit: F) -> Result<Case>
    where
        F: FnOnce(Vec<String>) -> Vec<String>,
    {
        let current = self
            .by_id(case_id)
            .await?
            .ok_or_else(|| AppError::CaseNotFound(case_id.to_string()))?;
        let ids = match field {
            f if f == schema::case::TEAMS => current.team_ids,
            _ => current.link_ids,
        };

        let mut fields = Fields::new();
        fields.insert(field.to_string(), serde_json::json!(edit(ids)));
        self.write(case_id, fields).await
    }

    async fn write(&self, case_id: &str, fields: Fields) -> Result<Case> {
        let updated = self
            .base
            .update(
                schema::tables::CASES,
                vec![RecordUpdate {
                    id: case_id.to_string(),
                    fields,
                }],
            )
            .await?;
        let record = updated.first().ok_or_else(|| {
            AppError::Records(RecordsError::Api {
                status: 500,
                message: "update returned no records".to_string(),
            })
        })?;
        Ok(mapper::case_from_record(record))
    }
}
