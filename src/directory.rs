//! Team directory: membership lookups and mutations.
//!
//! Member lists are mutated by reading the full list, editing it in
//! memory, and writing the whole list back. Two concurrent edits of the
//! same team can therefore lose one of the writes (last write wins);
//! the base offers no atomic append and no version check.

use std::sync::Arc;

use crate::domain::{Team, TeamDraft};
use crate::error::{AppError, Result};
use crate::mapper;
use crate::records::{Fields, Record, RecordUpdate, RecordsBase, SelectOptions};
use crate::schema;

/// A mapped team together with its store-level record id, which mutation
/// calls need (the domain id is a display number, not an address).
#[derive(Clone, Debug)]
pub struct TeamRecord {
    pub record_id: String,
    pub team: Team,
}

pub struct TeamDirectory {
    base: Arc<dyn RecordsBase>,
}

impl TeamDirectory {
    pub fn new(base: Arc<dyn RecordsBase>) -> Self {
        Self { base }
    }

    /// The team the user belongs to, if any. Zero matches is the normal
    /// "no team yet" branch, not an error.
    pub async fn find_team_by_member(&self, user_id: &str) -> Result<Option<Team>> {
        let formula = format!("FIND(\"{}\", {{{}}})", user_id, schema::team::MEMBERS);
        let records = self
            .base
            .select(schema::tables::TEAMS, SelectOptions::filter(formula).max(1))
            .await?;
        match records.first() {
            Some(record) => Ok(Some(mapper::team_from_record(record)?)),
            None => Ok(None),
        }
    }

    pub async fn find_team_by_invite_code(&self, code: &str) -> Result<TeamRecord> {
        let formula = format!("{{{}}} = \"{}\"", schema::team::INVITE_CODE, code);
        let records = self
            .base
            .select(schema::tables::TEAMS, SelectOptions::filter(formula).max(1))
            .await?;
        let record = records.first().ok_or(AppError::TeamNotFound)?;
        Ok(TeamRecord {
            record_id: record.id.clone(),
            team: mapper::team_from_record(record)?,
        })
    }

    /// Join a team via its invite code. Joining a team the user is already
    /// a member of is an error, not a silent no-op.
    ///
    /// Returns the team as it was fetched before the membership write;
    /// callers re-fetch state instead of trusting this snapshot.
    pub async fn join_team_by_invite_code(&self, code: &str, user_id: &str) -> Result<Team> {
        let user = self.lookup_user_record(user_id).await?;
        let found = self.find_team_by_invite_code(code).await?;

        let mut members = found.team.member_ids.clone();
        if members.contains(&user.id) {
            return Err(AppError::AlreadyMember);
        }
        members.push(user.id);

        self.write_members(&found.record_id, members).await?;
        tracing::info!(team = %found.record_id, user = %user_id, "user joined team");
        Ok(found.team)
    }

    /// Create a team with the creator as sole member and leader and a
    /// freshly minted invite code.
    pub async fn create_team(&self, draft: TeamDraft, creator_id: &str) -> Result<Team> {
        if draft.name.trim().is_empty() {
            return Err(AppError::Validation("team name is required".to_string()));
        }
        if draft.hackathon_id.trim().is_empty() {
            return Err(AppError::Validation("hackathon is required".to_string()));
        }

        let creator = self.lookup_user_record(creator_id).await?;
        let code = mint_invite_code();

        let mut fields = Fields::new();
        fields.insert(schema::team::NAME.to_string(), draft.name.into());
        if !draft.description.is_empty() {
            fields.insert(schema::team::DESCRIPTION.to_string(), draft.description.into());
        }
        fields.insert(
            schema::team::HACKATHON.to_string(),
            serde_json::json!([draft.hackathon_id]),
        );
        fields.insert(
            schema::team::MEMBERS.to_string(),
            serde_json::json!([creator.id.clone()]),
        );
        fields.insert(
            schema::team::LEADER.to_string(),
            serde_json::json!([creator.id]),
        );
        fields.insert(schema::team::INVITE_CODE.to_string(), code.into());

        let created = self.base.create(schema::tables::TEAMS, vec![fields]).await?;
        let record = created.first().ok_or_else(|| {
            AppError::Records(crate::records::RecordsError::Api {
                status: 500,
                message: "create returned no records".to_string(),
            })
        })?;
        tracing::info!(team = %record.id, creator = %creator_id, "team created");
        Ok(mapper::team_from_record(record)?)
    }

    /// Remove the user from the team's member list. Removing a user who is
    /// not a member writes the list back unchanged.
    pub async fn leave_team(&self, team_id: &str, user_id: &str) -> Result<()> {
        let user = self.lookup_user_record(user_id).await?;
        let found = self.lookup_team_record(team_id).await?;

        let members: Vec<String> = found
            .team
            .member_ids
            .iter()
            .filter(|id| **id != user.id)
            .cloned()
            .collect();

        self.write_members(&found.record_id, members).await?;
        tracing::info!(team = %found.record_id, user = %user_id, "user left team");
        Ok(())
    }

    async fn write_members(&self, record_id: &str, members: Vec<String>) -> Result<()> {
        let mut fields = Fields::new();
        fields.insert(
            schema::team::MEMBERS.to_string(),
            serde_json::json!(members),
        );
        self.base
            .update(
                schema::tables::TEAMS,
                vec![RecordUpdate {
                    id: record_id.to_string(),
                    fields,
                }],
            )
            .await?;
        Ok(())
    }

    async fn lookup_user_record(&self, user_id: &str) -> Result<Record> {
        let formula = format!("{{{}}} = \"{}\"", schema::user::ID, user_id);
        let records = self
            .base
            .select(schema::tables::USERS, SelectOptions::filter(formula).max(1))
            .await?;
        records.into_iter().next().ok_or(AppError::UserNotFound)
    }

    async fn lookup_team_record(&self, team_id: &str) -> Result<TeamRecord> {
        let formula = format!("{{{}}} = \"{}\"", schema::team::ID, team_id);
        let records = self
            .base
            .select(schema::tables::TEAMS, SelectOptions::filter(formula).max(1))
            .await?;
        let record = records.first().ok_or(AppError::TeamNotFound)?;
        Ok(TeamRecord {
            record_id: record.id.clone(),
            team: mapper::team_from_record(record)?,
        })
    }
}

fn mint_invite_code() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::MemoryBase;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("fields must be an object"),
        }
    }

    /// One user record; ids are seeded so the record id coincides with the
    /// display id, as in the production base's rendering.
    fn seed_user(base: &MemoryBase, id: &str, name: &str) {
        base.seed(
            schema::tables::USERS,
            id,
            fields(json!({
                "ID": id,
                "Почта": format!("{}@example.com", id),
                "Полное имя": name,
                "Роль": "Участник",
            })),
        );
    }

    fn seed_team(base: &MemoryBase, id: &str, name: &str, code: &str, members: &[&str]) {
        base.seed(
            schema::tables::TEAMS,
            id,
            fields(json!({
                "ID": id,
                "Название": name,
                "Хакатон": ["hack1"],
                "Участники": members,
                "Лидер": [members[0]],
                "Код приглашения": code,
            })),
        );
    }

    fn directory(base: Arc<MemoryBase>) -> TeamDirectory {
        TeamDirectory::new(base)
    }

    #[tokio::test]
    async fn test_find_team_by_member() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1", "Ada");
        seed_team(&base, "t1", "Code Wizards", "WIZARDS1", &["u1"]);
        let directory = directory(base);

        let team = directory.find_team_by_member("u1").await.unwrap().unwrap();
        assert_eq!(team.name, "Code Wizards");

        assert!(directory.find_team_by_member("u9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_invite_code() {
        let base = Arc::new(MemoryBase::new());
        seed_team(&base, "t1", "Code Wizards", "WIZARDS1", &["u1"]);
        let directory = directory(base);

        let err = directory
            .find_team_by_invite_code("NOPE")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TeamNotFound));
    }

    #[tokio::test]
    async fn test_join_adds_exactly_once() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1", "Ada");
        seed_user(&base, "u2", "Grace");
        seed_team(&base, "t1", "Code Wizards", "WIZARDS1", &["u1"]);
        let directory = directory(base);

        directory
            .join_team_by_invite_code("WIZARDS1", "u2")
            .await
            .unwrap();
        let team = directory.find_team_by_member("u2").await.unwrap().unwrap();
        assert_eq!(team.member_ids, vec!["u1", "u2"]);

        // A second join with the same user is rejected, not duplicated.
        let err = directory
            .join_team_by_invite_code("WIZARDS1", "u2")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyMember));
        let team = directory.find_team_by_member("u2").await.unwrap().unwrap();
        assert_eq!(team.member_ids, vec!["u1", "u2"]);
    }

    #[tokio::test]
    async fn test_join_requires_known_user() {
        let base = Arc::new(MemoryBase::new());
        seed_team(&base, "t1", "Code Wizards", "WIZARDS1", &["u1"]);
        let directory = directory(base);

        let err = directory
            .join_team_by_invite_code("WIZARDS1", "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }

    #[tokio::test]
    async fn test_join_then_leave_keeps_creator() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1", "Ada");
        seed_user(&base, "u2", "Grace");
        seed_team(&base, "t1", "Code Wizards", "WIZARDS1", &["u1"]);
        let directory = directory(base);

        directory
            .join_team_by_invite_code("WIZARDS1", "u2")
            .await
            .unwrap();
        directory.leave_team("t1", "u2").await.unwrap();

        let team = directory.find_team_by_member("u1").await.unwrap().unwrap();
        assert_eq!(team.member_ids, vec!["u1"]);
        assert_eq!(team.created_by, "u1");
    }

    #[tokio::test]
    async fn test_create_team() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1", "Ada");
        let directory = directory(base);

        let team = directory
            .create_team(
                TeamDraft {
                    name: "Code Wizards".to_string(),
                    description: "we cast spells".to_string(),
                    hackathon_id: "hack1".to_string(),
                },
                "u1",
            )
            .await
            .unwrap();

        assert_eq!(team.member_ids, vec!["u1"]);
        assert_eq!(team.created_by, "u1");
        assert_eq!(team.code.len(), 8);
        assert_eq!(team.hackathon_id, "hack1");

        // And the creator now finds their team.
        assert!(directory.find_team_by_member("u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_team_validates() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1", "Ada");
        let directory = directory(base);

        let err = directory
            .create_team(
                TeamDraft {
                    name: "  ".to_string(),
                    description: String::new(),
                    hackathon_id: "hack1".to_string(),
                },
                "u1",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
