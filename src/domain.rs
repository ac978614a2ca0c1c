//! Internal domain model.
//!
//! Everything the rest of the application works with lives here; the raw
//! records-base field names never leave the mapper boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application-level user role.
///
/// The records base distinguishes organizers from jury members; both act as
/// administrators here, so the mapping is lossy in that direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Participant,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub hackathon_id: String,
    /// Store-level ids of member records, in join order.
    pub member_ids: Vec<String>,
    /// Store-level id of the creator/leader record. Present in
    /// `member_ids` at creation; never re-validated afterwards.
    pub created_by: String,
    pub project_id: Option<String>,
    /// Shared invite code. Uniqueness is trusted to the records base.
    pub code: String,
}

/// Input for creating a new team.
#[derive(Clone, Debug, Deserialize)]
pub struct TeamDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub hackathon_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HackathonStatus {
    Draft,
    Upcoming,
    Active,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hackathon {
    pub id: String,
    pub title: String,
    pub description: String,
    pub publish_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: HackathonStatus,
    pub image: Option<String>,
    pub location: Option<String>,
}

/// A case (challenge) offered to teams within a hackathon.
///
/// The association lists are literal id lists stored on the record; there
/// is no referential integrity, so edits are fetch-modify-write on one
/// side only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Store-level record id (case mutations address records directly).
    pub id: String,
    /// Human-facing sequential number from the base.
    pub number: i64,
    pub name: String,
    pub description: String,
    pub results_upload_info: Option<String>,
    pub deadline: Option<String>,
    pub hackathon_ids: Vec<String>,
    pub team_ids: Vec<String>,
    pub link_ids: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CaseDraft {
    pub name: String,
    pub description: String,
    pub results_upload_info: Option<String>,
    pub deadline: Option<String>,
    #[serde(default)]
    pub hackathon_ids: Vec<String>,
}

/// Partial update for a case; `None` fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CasePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub results_upload_info: Option<String>,
    pub deadline: Option<String>,
    pub hackathon_ids: Option<Vec<String>>,
}
