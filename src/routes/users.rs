use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use mongodb::bson::DateTime;
use serde::Deserialize;

use crate::domain::user::{ProfileUpdate, Role, User, UserStatus};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::{CreatedResponse, UpdateResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub blood_group: String,
    pub district: String,
    pub upazila: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub email: String,
    pub status: UserStatus,
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub email: String,
    pub role: Role,
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUser>,
) -> Result<Json<CreatedResponse>, ApiError> {
    if state
        .store
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Ok(Json(CreatedResponse {
            inserted_id: None,
            message: "user already exists",
        }));
    }

    let user = User {
        id: None,
        name: payload.name,
        email: payload.email,
        avatar: payload.avatar,
        blood_group: payload.blood_group,
        district: payload.district,
        upazila: payload.upazila,
        role: Role::Donor,
        status: UserStatus::Active,
        created_at: DateTime::now(),
    };
    let inserted_id = state.store.insert_user(user).await?;
    Ok(Json(CreatedResponse {
        inserted_id: Some(inserted_id),
        message: "user created",
    }))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.store.list_users().await?))
}

pub async fn user_role(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(email): Path<String>,
) -> Result<Json<Option<User>>, ApiError> {
    Ok(Json(state.store.find_user_by_email(&email).await?))
}

pub async fn update_user_status(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(payload): Json<StatusChange>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let modified_count = state
        .store
        .set_user_status(&payload.email, payload.status)
        .await?;
    Ok(Json(UpdateResponse { modified_count }))
}

pub async fn update_user_role(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(payload): Json<RoleChange>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let modified_count = state
        .store
        .set_user_role(&payload.email, payload.role)
        .await?;
    Ok(Json(UpdateResponse { modified_count }))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(email): Path<String>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let modified_count = state.store.update_user_profile(&email, &payload).await?;
    Ok(Json(UpdateResponse { modified_count }))
}
