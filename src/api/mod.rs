pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::accounts::Accounts;
use crate::artifacts::ArtifactManager;
use crate::cases::CaseManager;
use crate::directory::TeamDirectory;
use crate::hackathons::HackathonCatalog;
use crate::records::RecordsBase;
use crate::storage::ObjectStore;
use crate::workflow::TeamWorkflow;

/// Application state shared across handlers.
pub struct AppState {
    pub accounts: Accounts,
    pub workflow: TeamWorkflow,
    pub hackathons: HackathonCatalog,
    pub cases: CaseManager,
}

impl AppState {
    pub fn new(base: Arc<dyn RecordsBase>, store: Arc<dyn ObjectStore>) -> Self {
        let directory = Arc::new(TeamDirectory::new(base.clone()));
        let artifacts = Arc::new(ArtifactManager::new(base.clone(), store));

        Self {
            accounts: Accounts::new(base.clone()),
            workflow: TeamWorkflow::new(directory, artifacts),
            hackathons: HackathonCatalog::new(base.clone()),
            cases: CaseManager::new(base),
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health))
        // Auth
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        // Team workflow (the caller's identity travels in X-User-Id)
        .route("/api/team", get(handlers::team_state))
        .route("/api/team", post(handlers::create_team))
        .route("/api/team/join", post(handlers::join_team))
        .route("/api/team/leave", post(handlers::leave_team))
        .route("/api/team/artifacts", post(handlers::upload_artifact))
        .route("/api/artifacts/:id", delete(handlers::delete_artifact))
        // Catalog
        .route("/api/hackathons", get(handlers::list_hackathons))
        .route("/api/hackathons/:id", get(handlers::get_hackathon))
        // Cases
        .route("/api/cases", get(handlers::list_cases))
        .route("/api/cases", post(handlers::create_case))
        .route("/api/cases/:id", get(handlers::get_case))
        .route("/api/cases/:id", axum::routing::patch(handlers::update_case))
        .route("/api/cases/:id", delete(handlers::delete_case))
        .route(
            "/api/cases/:id/teams/:team_id",
            post(handlers::assign_team_to_case).delete(handlers::unassign_team_from_case),
        )
        .route(
            "/api/cases/:id/links/:link_id",
            post(handlers::add_link_to_case).delete(handlers::remove_link_from_case),
        )
}
