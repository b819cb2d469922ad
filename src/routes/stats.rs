use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::domain::user::Role;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_donors: u64,
    pub total_requests: u64,
    pub total_funding: f64,
}

/// Recomputed from the store on every call; nothing is cached.
pub async fn admin_stats(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<AdminStats>, ApiError> {
    let total_donors = state.store.count_users_with_role(Role::Donor).await?;
    let total_requests = state.store.count_requests().await?;
    let total_funding = state.store.total_funding().await?;
    Ok(Json(AdminStats {
        total_donors,
        total_requests,
        total_funding,
    }))
}
