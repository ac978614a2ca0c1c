//! Account registration and login against the users table.
//!
//! Credentials live in the base: the password field is compared verbatim,
//! which is the external contract the deployed base dictates.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::{User, UserRole};
use crate::error::{AppError, Result};
use crate::mapper;
use crate::records::{Record, RecordsBase, SelectOptions};
use crate::schema;

#[derive(Clone, Debug, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

pub struct Accounts {
    base: Arc<dyn RecordsBase>,
}

impl Accounts {
    pub fn new(base: Arc<dyn RecordsBase>) -> Self {
        Self { base }
    }

    pub async fn register(&self, registration: Registration) -> Result<User> {
        let Registration {
            email,
            password,
            full_name,
        } = registration;
        if email.trim().is_empty() || password.is_empty() || full_name.trim().is_empty() {
            return Err(AppError::Validation(
                "email, password and full name are required".to_string(),
            ));
        }

        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }

        let mut fields = crate::records::Fields::new();
        fields.insert(schema::user::PASSWORD.to_string(), password.into());
        fields.insert(schema::user::FULL_NAME.to_string(), full_name.into());
        fields.insert(schema::user::EMAIL.to_string(), email.into());
        fields.insert(
            schema::user::ROLE.to_string(),
            mapper::role_to_base(UserRole::Participant).into(),
        );

        let created = self.base.create(schema::tables::USERS, vec![fields]).await?;
        let record = created
            .first()
            .ok_or_else(|| AppError::Records(crate::records::RecordsError::Api {
                status: 500,
                message: "create returned no records".to_string(),
            }))?;

        tracing::info!(user = %record.id, "registered new participant");
        Ok(mapper::user_from_record(record)?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let record = self
            .find_by_email(email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if record.str_field(schema::user::PASSWORD) != Some(password) {
            return Err(AppError::AuthFailed);
        }

        Ok(mapper::user_from_record(&record)?)
    }

    /// Resolve a user by their display id, e.g. when rebuilding a session
    /// context from a request.
    pub async fn by_id(&self, user_id: &str) -> Result<User> {
        let formula = format!("{{{}}} = \"{}\"", schema::user::ID, user_id);
        let records = self
            .base
            .select(schema::tables::USERS, SelectOptions::filter(formula).max(1))
            .await?;
        let record = records.first().ok_or(AppError::UserNotFound)?;
        Ok(mapper::user_from_record(record)?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Record>> {
        let formula = format!("{{{}}} = '{}'", schema::user::EMAIL, email);
        let records = self
            .base
            .select(schema::tables::USERS, SelectOptions::filter(formula).max(1))
            .await?;
        Ok(records.into_iter().next())
    }
}
