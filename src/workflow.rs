//! Team-management workflow.
//!
//! The screen-level state is an explicit tagged union: a user either has
//! no team yet (create/join actions) or has one (artifact actions,
//! leave). Entering the has-team state loads the team's artifacts.
//! Mutations re-fetch the state afterwards instead of trusting the
//! mutation's own return value, so the caller always sees what the base
//! now holds. Every action is one blocking request sequence; a failure
//! leaves the previous state in place.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;

use crate::artifacts::{ArtifactManager, ArtifactUpload};
use crate::directory::TeamDirectory;
use crate::domain::{Artifact, Team, TeamDraft};
use crate::error::{AppError, Result};
use crate::session::Session;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TeamState {
    NoTeam,
    HasTeam {
        team: Team,
        artifacts: Vec<Artifact>,
    },
}

pub struct TeamWorkflow {
    directory: Arc<TeamDirectory>,
    artifacts: Arc<ArtifactManager>,
}

impl TeamWorkflow {
    pub fn new(directory: Arc<TeamDirectory>, artifacts: Arc<ArtifactManager>) -> Self {
        Self {
            directory,
            artifacts,
        }
    }

    pub async fn current_state(&self, session: &Session) -> Result<TeamState> {
        match self
            .directory
            .find_team_by_member(&session.user.id)
            .await?
        {
            None => Ok(TeamState::NoTeam),
            Some(team) => {
                let artifacts = self.artifacts.list_for_team(&team.id).await?;
                Ok(TeamState::HasTeam { team, artifacts })
            }
        }
    }

    pub async fn create_team(&self, session: &Session, draft: TeamDraft) -> Result<TeamState> {
        self.directory
            .create_team(draft, &session.user.id)
            .await?;
        self.current_state(session).await
    }

    pub async fn join_with_code(&self, session: &Session, code: &str) -> Result<TeamState> {
        if code.trim().is_empty() {
            return Err(AppError::Validation("invite code is required".to_string()));
        }
        self.directory
            .join_team_by_invite_code(code.trim(), &session.user.id)
            .await?;
        self.current_state(session).await
    }

    /// Leave the current team. A user without a team has nothing to
    /// leave and simply stays in the no-team state.
    pub async fn leave_team(&self, session: &Session) -> Result<TeamState> {
        let Some(team) = self
            .directory
            .find_team_by_member(&session.user.id)
            .await?
        else {
            return Ok(TeamState::NoTeam);
        };

        self.directory
            .leave_team(&team.id, &session.user.id)
            .await?;
        self.current_state(session).await
    }

    pub async fn upload_artifact(
        &self,
        session: &Session,
        name: &str,
        file_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<TeamState> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "solution name is required".to_string(),
            ));
        }
        if bytes.is_empty() {
            return Err(AppError::Validation("a file is required".to_string()));
        }

        let team = self
            .directory
            .find_team_by_member(&session.user.id)
            .await?
            .ok_or(AppError::TeamNotFound)?;

        self.artifacts
            .upload(ArtifactUpload {
                team_id: team.id,
                name: name.to_string(),
                file_name: file_name.to_string(),
                content_type: content_type.to_string(),
                bytes,
            })
            .await?;

        self.current_state(session).await
    }

    pub async fn delete_artifact(
        &self,
        session: &Session,
        artifact_id: &str,
        file_url: &str,
    ) -> Result<TeamState> {
        self.artifacts.delete(artifact_id, file_url).await?;
        self.current_state(session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{User, UserRole};
    use crate::records::{Fields, MemoryBase};
    use crate::schema;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("fields must be an object"),
        }
    }

    fn seed_user(base: &MemoryBase, id: &str) {
        base.seed(
            schema::tables::USERS,
            id,
            fields(json!({
                "ID": id,
                "Почта": format!("{}@example.com", id),
                "Полное имя": id,
                "Роль": "Участник",
            })),
        );
    }

    fn seed_team(base: &MemoryBase, id: &str, code: &str, members: &[&str]) {
        base.seed(
            schema::tables::TEAMS,
            id,
            fields(json!({
                "ID": id,
                "Название": "Code Wizards",
                "Хакатон": ["hack1"],
                "Участники": members,
                "Лидер": [members[0]],
                "Код приглашения": code,
            })),
        );
    }

    fn session(user_id: &str) -> Session {
        Session::new(User {
            id: user_id.to_string(),
            email: format!("{user_id}@example.com"),
            name: user_id.to_string(),
            role: UserRole::Participant,
        })
    }

    fn workflow(base: Arc<MemoryBase>, store: Arc<MemoryStore>) -> TeamWorkflow {
        TeamWorkflow::new(
            Arc::new(TeamDirectory::new(base.clone())),
            Arc::new(ArtifactManager::new(base, store)),
        )
    }

    #[tokio::test]
    async fn test_no_team_then_create() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1");
        let workflow = workflow(base, Arc::new(MemoryStore::new()));
        let session = session("u1");

        assert!(matches!(
            workflow.current_state(&session).await.unwrap(),
            TeamState::NoTeam
        ));

        let state = workflow
            .create_team(
                &session,
                TeamDraft {
                    name: "Code Wizards".to_string(),
                    description: String::new(),
                    hackathon_id: "hack1".to_string(),
                },
            )
            .await
            .unwrap();

        match state {
            TeamState::HasTeam { team, artifacts } => {
                assert_eq!(team.member_ids, vec!["u1"]);
                assert!(artifacts.is_empty());
            }
            TeamState::NoTeam => panic!("expected a team after creation"),
        }
    }

    #[tokio::test]
    async fn test_join_refetches_state() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1");
        seed_user(&base, "u2");
        seed_team(&base, "t1", "WIZARDS1", &["u1"]);
        let workflow = workflow(base, Arc::new(MemoryStore::new()));
        let session = session("u2");

        let state = workflow.join_with_code(&session, "WIZARDS1").await.unwrap();
        match state {
            TeamState::HasTeam { team, .. } => {
                // The re-fetched member list already includes the joiner,
                // unlike the join call's own (stale) snapshot.
                assert_eq!(team.member_ids, vec!["u1", "u2"]);
            }
            TeamState::NoTeam => panic!("expected a team after joining"),
        }
    }

    #[tokio::test]
    async fn test_join_validates_code() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1");
        let workflow = workflow(base, Arc::new(MemoryStore::new()));

        let err = workflow
            .join_with_code(&session("u1"), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_leave_returns_to_no_team() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1");
        seed_user(&base, "u2");
        seed_team(&base, "t1", "WIZARDS1", &["u1", "u2"]);
        let workflow = workflow(base.clone(), Arc::new(MemoryStore::new()));
        let session = session("u2");

        let state = workflow.leave_team(&session).await.unwrap();
        assert!(matches!(state, TeamState::NoTeam));

        // Leaving again from the no-team state is a no-op.
        let state = workflow.leave_team(&session).await.unwrap();
        assert!(matches!(state, TeamState::NoTeam));
    }

    #[tokio::test]
    async fn test_upload_and_delete_artifact() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1");
        seed_team(&base, "t1", "WIZARDS1", &["u1"]);
        let workflow = workflow(base, Arc::new(MemoryStore::new()));
        let session = session("u1");

        let state = workflow
            .upload_artifact(
                &session,
                "Demo",
                "solution.zip",
                "application/zip",
                Bytes::from_static(b"PK"),
            )
            .await
            .unwrap();

        let (artifact_id, file_url) = match &state {
            TeamState::HasTeam { artifacts, .. } => {
                assert_eq!(artifacts.len(), 1);
                assert_eq!(artifacts[0].name, "Demo");
                (artifacts[0].id.clone(), artifacts[0].file_url.clone())
            }
            TeamState::NoTeam => panic!("expected a team"),
        };

        let state = workflow
            .delete_artifact(&session, &artifact_id, &file_url)
            .await
            .unwrap();
        match state {
            TeamState::HasTeam { artifacts, .. } => assert!(artifacts.is_empty()),
            TeamState::NoTeam => panic!("expected a team"),
        }
    }

    #[tokio::test]
    async fn test_upload_validation_happens_before_any_remote_call() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1");
        seed_team(&base, "t1", "WIZARDS1", &["u1"]);
        let store = Arc::new(MemoryStore::new());
        let workflow = workflow(base, store.clone());
        let session = session("u1");

        let err = workflow
            .upload_artifact(&session, " ", "a.zip", "application/zip", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = workflow
            .upload_artifact(&session, "Demo", "a.zip", "application/zip", Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Nothing reached the object store.
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_upload_without_team() {
        let base = Arc::new(MemoryBase::new());
        seed_user(&base, "u1");
        let workflow = workflow(base, Arc::new(MemoryStore::new()));

        let err = workflow
            .upload_artifact(
                &session("u1"),
                "Demo",
                "a.zip",
                "application/zip",
                Bytes::from_static(b"x"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TeamNotFound));
    }
}
