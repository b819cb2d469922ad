use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::domain::request::{DonationRequest, RequestStatus, RequestUpdate, SearchFilter};
use crate::domain::user::Role;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::{stored_role, CreatedResponse, DeleteResponse, UpdateResponse};
use crate::state::AppState;
use crate::store::Page;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonationRequest {
    pub requester_name: String,
    pub requester_email: String,
    pub recipient_name: String,
    pub district: String,
    pub upazila: String,
    pub hospital_name: String,
    pub full_address: String,
    pub blood_group: String,
    pub donation_date: String,
    pub donation_time: String,
    pub request_message: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<RequestStatus>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl ListQuery {
    fn page(&self) -> Page {
        let default = Page::default();
        Page {
            page: self.page.unwrap_or(default.page),
            size: self.size.unwrap_or(default.size),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestPage {
    pub total: u64,
    pub requests: Vec<DonationRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPayload {
    pub donor_name: String,
    pub donor_email: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: RequestStatus,
}

fn parse_request_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::NotFound("request not found".into()))
}

pub async fn create_request(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(payload): Json<NewDonationRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    // Status and creation time are server-assigned whatever the client sent.
    let request = DonationRequest {
        id: None,
        requester_name: payload.requester_name,
        requester_email: payload.requester_email,
        recipient_name: payload.recipient_name,
        district: payload.district,
        upazila: payload.upazila,
        hospital_name: payload.hospital_name,
        full_address: payload.full_address,
        blood_group: payload.blood_group,
        donation_date: payload.donation_date,
        donation_time: payload.donation_time,
        request_message: payload.request_message,
        status: RequestStatus::Pending,
        donor_name: None,
        donor_email: None,
        created_at: DateTime::now(),
    };
    let inserted_id = state.store.insert_request(request).await?;
    Ok(Json(CreatedResponse {
        inserted_id: Some(inserted_id),
        message: "request created",
    }))
}

pub async fn public_requests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DonationRequest>>, ApiError> {
    Ok(Json(state.store.pending_requests().await?))
}

pub async fn request_details(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DonationRequest>, ApiError> {
    let id = parse_request_id(&id)?;
    let request = state
        .store
        .find_request(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("request not found".into()))?;
    Ok(Json(request))
}

pub async fn my_requests(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<RequestPage>, ApiError> {
    let (requests, total) = state
        .store
        .requests_by_requester(&user.email, query.status, query.page())
        .await?;
    Ok(Json(RequestPage { total, requests }))
}

pub async fn all_requests(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<RequestPage>, ApiError> {
    match stored_role(&state, &user.email).await? {
        Some(Role::Admin) | Some(Role::Volunteer) => {}
        _ => {
            return Err(ApiError::Forbidden(
                "admin or volunteer access required".into(),
            ))
        }
    }
    let (requests, total) = state.store.all_requests(query.page()).await?;
    Ok(Json(RequestPage { total, requests }))
}

pub async fn recent_requests(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<DonationRequest>>, ApiError> {
    let scope = match stored_role(&state, &user.email).await? {
        Some(Role::Donor) | None => Some(user.email.as_str()),
        _ => None,
    };
    Ok(Json(state.store.recent_requests(scope, 3).await?))
}

pub async fn confirm_request(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<ConfirmPayload>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let id = parse_request_id(&id)?;
    let modified_count = state
        .store
        .assign_donor(id, &payload.donor_name, &payload.donor_email)
        .await?;
    Ok(Json(UpdateResponse { modified_count }))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let id = parse_request_id(&id)?;
    let modified_count = state.store.set_request_status(id, payload.status).await?;
    Ok(Json(UpdateResponse { modified_count }))
}

pub async fn update_request(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<RequestUpdate>,
) -> Result<Json<UpdateResponse>, ApiError> {
    if let Some(Role::Volunteer) = stored_role(&state, &user.email).await? {
        return Err(ApiError::Forbidden(
            "volunteers are not allowed to edit requests".into(),
        ));
    }
    let id = parse_request_id(&id)?;
    let modified_count = state.store.update_request(id, &payload).await?;
    Ok(Json(UpdateResponse { modified_count }))
}

pub async fn delete_request(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    match stored_role(&state, &user.email).await? {
        Some(Role::Admin) => {}
        _ => return Err(ApiError::Forbidden("admin access required".into())),
    }
    let id = parse_request_id(&id)?;
    let deleted_count = state.store.delete_request(id).await?;
    Ok(Json(DeleteResponse { deleted_count }))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SearchFilter>,
) -> Result<Json<Vec<DonationRequest>>, ApiError> {
    Ok(Json(state.store.search_requests(&filter).await?))
}
