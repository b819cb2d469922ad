use std::sync::Arc;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use serde::Serialize;

use crate::domain::user::Role;
use crate::error::ApiError;
use crate::state::AppState;

mod payments;
mod requests;
mod stats;
mod users;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/role/{email}", get(users::user_role))
        .route("/update/user/status", patch(users::update_user_status))
        .route("/update/user/role", patch(users::update_user_role))
        .route("/users/update/{email}", patch(users::update_profile))
        .route("/requests", post(requests::create_request))
        .route("/requests-public", get(requests::public_requests))
        .route("/request-details/{id}", get(requests::request_details))
        .route("/my-donation-requests", get(requests::my_requests))
        .route("/all-donation-requests", get(requests::all_requests))
        .route("/my-requests-recent", get(requests::recent_requests))
        .route("/requests/confirm/{id}", patch(requests::confirm_request))
        .route("/requests/status-update/{id}", patch(requests::update_status))
        .route("/requests/update/{id}", put(requests::update_request))
        .route("/requests/{id}", delete(requests::delete_request))
        .route("/search", get(requests::search))
        .route("/admin-stats", get(stats::admin_stats))
        .route("/funds", get(payments::list_funds))
        .route("/create-payment-checkout", post(payments::create_checkout))
        .route("/success-payment", post(payments::finalize_payment))
        .with_state(state)
}

/// Insert results mirror the store's shape; a duplicate reports no new id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub inserted_id: Option<String>,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub modified_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted_count: u64,
}

/// Role checks re-read the stored user record for the verified email; the
/// guard itself never looks at roles.
pub(crate) async fn stored_role(state: &AppState, email: &str) -> Result<Option<Role>, ApiError> {
    Ok(state
        .store
        .find_user_by_email(email)
        .await?
        .map(|user| user.role))
}
