//! Read-side hackathon catalog.
//!
//! Status filters run in the base's formula language so the application
//! never downloads more than the slice it renders.

use std::sync::Arc;

use crate::domain::Hackathon;
use crate::error::{AppError, Result};
use crate::mapper;
use crate::records::{RecordsBase, SelectOptions};
use crate::schema;

pub struct HackathonCatalog {
    base: Arc<dyn RecordsBase>,
}

impl HackathonCatalog {
    pub fn new(base: Arc<dyn RecordsBase>) -> Self {
        Self { base }
    }

    pub async fn active(&self) -> Result<Vec<Hackathon>> {
        self.by_status(schema::hackathon::STATUS_STARTED).await
    }

    pub async fn upcoming(&self) -> Result<Vec<Hackathon>> {
        self.by_status(schema::hackathon::STATUS_REGISTRATION_OPEN)
            .await
    }

    pub async fn completed(&self) -> Result<Vec<Hackathon>> {
        self.by_status(schema::hackathon::STATUS_FINISHED).await
    }

    pub async fn all(&self) -> Result<Vec<Hackathon>> {
        let records = self
            .base
            .select(schema::tables::HACKATHONS, SelectOptions::default())
            .await?;
        map_all(&records)
    }

    pub async fn by_id(&self, id: &str) -> Result<Hackathon> {
        let formula = format!("{{{}}} = {}", schema::hackathon::ID, id);
        let records = self
            .base
            .select(
                schema::tables::HACKATHONS,
                SelectOptions::filter(formula).max(1),
            )
            .await?;
        let record = records
            .first()
            .ok_or_else(|| AppError::HackathonNotFound(id.to_string()))?;
        Ok(mapper::hackathon_from_record(record)?)
    }

    async fn by_status(&self, status: &str) -> Result<Vec<Hackathon>> {
        let formula = format!("{{{}}} = '{}'", schema::hackathon::STATUS, status);
        let records = self
            .base
            .select(schema::tables::HACKATHONS, SelectOptions::filter(formula))
            .await?;
        map_all(&records)
    }
}

fn map_all(records: &[crate::records::Record]) -> Result<Vec<Hackathon>> {
    records
        .iter()
        .map(|r| mapper::hackathon_from_record(r).map_err(AppError::from))
        .collect()
}
