//! Translation between raw base records and the domain model.
//!
//! Pure functions, no I/O. Enumerated values are mapped exhaustively and
//! anything outside the known set is a hard error rather than a silent
//! default, so a drifting base schema fails loudly.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::domain::{Artifact, Case, Hackathon, HackathonStatus, Team, User, UserRole};
use crate::records::Record;
use crate::schema;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Record {record} is missing field {field:?}")]
    MissingField { record: String, field: String },

    #[error("Unparseable date in {field:?}: {value}")]
    BadDate { field: String, value: String },
}

pub type MapResult<T> = Result<T, MapError>;

pub fn role_from_base(raw: &str) -> MapResult<UserRole> {
    match raw {
        schema::user::ROLE_PARTICIPANT => Ok(UserRole::Participant),
        schema::user::ROLE_ORGANIZER | schema::user::ROLE_JURY => Ok(UserRole::Admin),
        other => Err(MapError::UnknownRole(other.to_string())),
    }
}

/// Lossy inverse of [`role_from_base`]: an admin always writes back as an
/// organizer, never as jury.
pub fn role_to_base(role: UserRole) -> &'static str {
    match role {
        UserRole::Participant => schema::user::ROLE_PARTICIPANT,
        UserRole::Admin => schema::user::ROLE_ORGANIZER,
    }
}

pub fn status_from_base(raw: &str) -> MapResult<HackathonStatus> {
    match raw {
        schema::hackathon::STATUS_DRAFT => Ok(HackathonStatus::Draft),
        schema::hackathon::STATUS_REGISTRATION_OPEN => Ok(HackathonStatus::Upcoming),
        // The deployed base has one historic row whose status cell holds
        // the role word; it must keep reading as an active hackathon.
        schema::hackathon::STATUS_STARTED | schema::user::ROLE_ORGANIZER => {
            Ok(HackathonStatus::Active)
        }
        schema::hackathon::STATUS_FINISHED => Ok(HackathonStatus::Completed),
        other => Err(MapError::UnknownStatus(other.to_string())),
    }
}

pub fn user_from_record(record: &Record) -> MapResult<User> {
    Ok(User {
        id: require_scalar(record, schema::user::ID)?,
        email: require_scalar(record, schema::user::EMAIL)?,
        name: require_scalar(record, schema::user::FULL_NAME)?,
        role: role_from_base(&require_scalar(record, schema::user::ROLE)?)?,
    })
}

pub fn team_from_record(record: &Record) -> MapResult<Team> {
    Ok(Team {
        id: require_scalar(record, schema::team::ID)?,
        name: require_scalar(record, schema::team::NAME)?,
        description: record
            .str_field(schema::team::DESCRIPTION)
            .unwrap_or_default()
            .to_string(),
        hackathon_id: require_link(record, schema::team::HACKATHON)?,
        member_ids: record.list_field(schema::team::MEMBERS),
        created_by: require_link(record, schema::team::LEADER)?,
        project_id: record.first_link(schema::team::CASE),
        code: require_scalar(record, schema::team::INVITE_CODE)?,
    })
}

pub fn hackathon_from_record(record: &Record) -> MapResult<Hackathon> {
    let status_raw = require_scalar(record, schema::hackathon::STATUS)?;

    Ok(Hackathon {
        id: scalar(record, schema::hackathon::ID).unwrap_or_default(),
        title: record
            .str_field(schema::hackathon::TITLE)
            .unwrap_or_default()
            .to_string(),
        description: record
            .str_field(schema::hackathon::DESCRIPTION)
            .unwrap_or_default()
            .to_string(),
        publish_date: date_field(record, schema::hackathon::PUBLISH_DATE)?,
        registration_deadline: date_field(record, schema::hackathon::REGISTRATION_DEADLINE)?,
        start_date: date_field(record, schema::hackathon::CASES_OPEN_DATE)?,
        end_date: date_field(record, schema::hackathon::SUBMISSION_DEADLINE)?,
        status: status_from_base(&status_raw)?,
        image: cover_url(record),
        location: record
            .str_field(schema::hackathon::LOCATION)
            .map(str::to_string),
    })
}

pub fn case_from_record(record: &Record) -> Case {
    Case {
        id: record.id.clone(),
        number: record.i64_field(schema::case::ID).unwrap_or_default(),
        name: record
            .str_field(schema::case::NAME)
            .unwrap_or_default()
            .to_string(),
        description: record
            .str_field(schema::case::DESCRIPTION)
            .unwrap_or_default()
            .to_string(),
        results_upload_info: record
            .str_field(schema::case::RESULTS_UPLOAD_INFO)
            .map(str::to_string),
        deadline: record.str_field(schema::case::DEADLINE).map(str::to_string),
        hackathon_ids: record.list_field(schema::case::HACKATHONS),
        team_ids: record.list_field(schema::case::TEAMS),
        link_ids: record.list_field(schema::case::LINKS),
    }
}

pub fn artifact_from_record(record: &Record, team_id: &str) -> MapResult<Artifact> {
    let created_at = match record.str_field(schema::artifact::CREATED_AT) {
        Some(raw) => parse_date(raw).ok_or_else(|| MapError::BadDate {
            field: schema::artifact::CREATED_AT.to_string(),
            value: raw.to_string(),
        })?,
        // The creation field is computed by the base from the record's
        // creation time, so the envelope timestamp is the same value.
        None => record
            .created_time
            .ok_or_else(|| MapError::MissingField {
                record: record.id.clone(),
                field: schema::artifact::CREATED_AT.to_string(),
            })?,
    };

    Ok(Artifact {
        id: record.id.clone(),
        team_id: team_id.to_string(),
        name: record
            .str_field(schema::artifact::NAME)
            .unwrap_or_default()
            .to_string(),
        file_url: record
            .str_field(schema::artifact::FILE_URL)
            .unwrap_or_default()
            .to_string(),
        created_at,
    })
}

/// A scalar field as text; numbers (autonumber ids) read as their decimal
/// form.
fn scalar(record: &Record, field: &str) -> Option<String> {
    match record.fields.get(field) {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn require_scalar(record: &Record, field: &str) -> MapResult<String> {
    scalar(record, field).ok_or_else(|| MapError::MissingField {
        record: record.id.clone(),
        field: field.to_string(),
    })
}

fn require_link(record: &Record, field: &str) -> MapResult<String> {
    record
        .first_link(field)
        .ok_or_else(|| MapError::MissingField {
            record: record.id.clone(),
            field: field.to_string(),
        })
}

fn date_field(record: &Record, field: &str) -> MapResult<Option<DateTime<Utc>>> {
    match record.str_field(field) {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| MapError::BadDate {
                field: field.to_string(),
                value: raw.to_string(),
            }),
    }
}

/// The base serves timestamps as RFC 3339 and date-only columns as plain
/// dates; both are accepted, dates as midnight UTC.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn cover_url(record: &Record) -> Option<String> {
    record
        .fields
        .get(schema::hackathon::COVER)?
        .as_array()?
        .first()?
        .get("url")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Fields;
    use serde_json::json;

    fn record(id: &str, fields: serde_json::Value) -> Record {
        let fields: Fields = match fields {
            serde_json::Value::Object(map) => map,
            _ => panic!("fields must be an object"),
        };
        Record {
            id: id.to_string(),
            fields,
            created_time: None,
        }
    }

    #[test]
    fn test_role_round_trip_is_lossy_but_idempotent() {
        // Jury collapses to admin...
        let admin = role_from_base(schema::user::ROLE_JURY).unwrap();
        assert_eq!(admin, UserRole::Admin);
        // ...and maps back to organizer, which stays admin forever after.
        let external = role_to_base(admin);
        assert_eq!(external, schema::user::ROLE_ORGANIZER);
        assert_eq!(role_from_base(external).unwrap(), UserRole::Admin);

        let participant = role_from_base(schema::user::ROLE_PARTICIPANT).unwrap();
        assert_eq!(role_to_base(participant), schema::user::ROLE_PARTICIPANT);
    }

    #[test]
    fn test_unknown_role_and_status_are_errors() {
        assert!(matches!(
            role_from_base("Наставник"),
            Err(MapError::UnknownRole(_))
        ));
        assert!(matches!(
            status_from_base("Отменён"),
            Err(MapError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        use HackathonStatus::*;
        assert_eq!(status_from_base(schema::hackathon::STATUS_DRAFT).unwrap(), Draft);
        assert_eq!(
            status_from_base(schema::hackathon::STATUS_REGISTRATION_OPEN).unwrap(),
            Upcoming
        );
        assert_eq!(status_from_base(schema::hackathon::STATUS_STARTED).unwrap(), Active);
        assert_eq!(status_from_base(schema::hackathon::STATUS_FINISHED).unwrap(), Completed);
        // The mistyped production row.
        assert_eq!(status_from_base(schema::user::ROLE_ORGANIZER).unwrap(), Active);
    }

    #[test]
    fn test_user_mapping_requires_role() {
        let full = record(
            "recU",
            json!({"ID": 7, "Почта": "a@b.c", "Полное имя": "Ada", "Роль": "Участник"}),
        );
        let user = user_from_record(&full).unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.role, UserRole::Participant);

        let missing = record("recU", json!({"ID": 7, "Почта": "a@b.c", "Полное имя": "Ada"}));
        assert!(matches!(
            user_from_record(&missing),
            Err(MapError::MissingField { .. })
        ));
    }

    #[test]
    fn test_team_mapping() {
        let rec = record(
            "recT",
            json!({
                "ID": 3,
                "Название": "Code Wizards",
                "Хакатон": ["recH1"],
                "Участники": ["recU1", "recU2"],
                "Лидер": ["recU1"],
                "Код приглашения": "AB12CD34",
            }),
        );
        let team = team_from_record(&rec).unwrap();
        assert_eq!(team.id, "3");
        assert_eq!(team.description, "");
        assert_eq!(team.member_ids, vec!["recU1", "recU2"]);
        assert_eq!(team.created_by, "recU1");
        assert_eq!(team.project_id, None);

        let mut no_code = rec.clone();
        no_code.fields.remove(schema::team::INVITE_CODE);
        assert!(matches!(
            team_from_record(&no_code),
            Err(MapError::MissingField { .. })
        ));
    }

    #[test]
    fn test_hackathon_mapping_and_dates() {
        let rec = record(
            "recH",
            json!({
                "ID": 1,
                "Название": "Spring Hack",
                "Статус": "Открыта регистрация",
                "Дата публикации": "2026-03-01",
                "Дедлайн регистрации": "2026-03-10T18:00:00.000Z",
                "Обложка": [{"url": "https://img.test/cover.png"}],
            }),
        );
        let hackathon = hackathon_from_record(&rec).unwrap();
        assert_eq!(hackathon.status, HackathonStatus::Upcoming);
        assert_eq!(
            hackathon.publish_date.unwrap().to_rfc3339(),
            "2026-03-01T00:00:00+00:00"
        );
        assert!(hackathon.registration_deadline.is_some());
        assert_eq!(hackathon.start_date, None);
        assert_eq!(hackathon.image.as_deref(), Some("https://img.test/cover.png"));

        let bad = record("recH", json!({"Статус": "Закончился", "Дата публикации": "soon"}));
        assert!(matches!(
            hackathon_from_record(&bad),
            Err(MapError::BadDate { .. })
        ));
    }

    #[test]
    fn test_case_mapping_defaults() {
        let rec = record("recC", json!({"Название": "Routing"}));
        let case = case_from_record(&rec);
        assert_eq!(case.id, "recC");
        assert_eq!(case.number, 0);
        assert!(case.hackathon_ids.is_empty());
        assert!(case.team_ids.is_empty());
    }

    #[test]
    fn test_artifact_mapping_falls_back_to_record_timestamp() {
        let mut rec = record("recA", json!({"Название": "Demo", "Ссылка": "https://x/y.zip"}));
        rec.created_time = Some(Utc::now());
        let artifact = artifact_from_record(&rec, "5").unwrap();
        assert_eq!(artifact.team_id, "5");
        assert_eq!(artifact.name, "Demo");

        let explicit = record(
            "recA",
            json!({"Название": "Demo", "Ссылка": "u", "Дата создания": "2026-04-01T10:00:00.000Z"}),
        );
        let artifact = artifact_from_record(&explicit, "5").unwrap();
        assert_eq!(artifact.created_at.to_rfc3339(), "2026-04-01T10:00:00+00:00");
    }
}
