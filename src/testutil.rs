//! In-memory doubles and request helpers shared by the route tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::{oid::ObjectId, DateTime};
use serde_json::Value;
use tower::ServiceExt;

use crate::domain::payment::Payment;
use crate::domain::request::{DonationRequest, RequestStatus, RequestUpdate, SearchFilter};
use crate::domain::user::{ProfileUpdate, Role, User, UserStatus};
use crate::infra::checkout::{CheckoutGateway, CheckoutSession};
use crate::routes;
use crate::security::jwt::{Claims, JwtVerifier};
use crate::state::AppState;
use crate::store::{Page, Store};

pub const TEST_SECRET: &str = "test-secret";

pub fn app(store: Arc<MemStore>) -> Router {
    app_with_checkout(store, Arc::new(FakeCheckout::default()))
}

pub fn app_with_checkout(store: Arc<MemStore>, checkout: Arc<dyn CheckoutGateway>) -> Router {
    let state = AppState::new(store, JwtVerifier::new(TEST_SECRET.into()), checkout);
    routes::router(state)
}

pub fn token_for(email: &str) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock should be past the epoch")
        .as_secs() as i64;
    let claims = Claims {
        email: email.to_string(),
        exp: now + 3600,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("token should encode")
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should be handled");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, payload: &Value) -> Request<Body> {
    builder(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(payload).expect("payload should serialize"),
        ))
        .expect("request should build")
}

pub fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    builder(method, uri, token)
        .body(Body::empty())
        .expect("request should build")
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
}

pub fn user(email: &str, role: Role) -> User {
    User {
        id: Some(ObjectId::new()),
        name: "Test User".into(),
        email: email.into(),
        avatar: None,
        blood_group: "A+".into(),
        district: "Dhaka".into(),
        upazila: "Dhanmondi".into(),
        role,
        status: UserStatus::Active,
        created_at: DateTime::now(),
    }
}

pub fn donation_request(requester: &str, status: RequestStatus, created_ms: i64) -> DonationRequest {
    DonationRequest {
        id: Some(ObjectId::new()),
        requester_name: "Requester".into(),
        requester_email: requester.into(),
        recipient_name: "Patient".into(),
        district: "Dhaka".into(),
        upazila: "Savar".into(),
        hospital_name: "Dhaka Medical College".into(),
        full_address: "Secretariat Road, Dhaka".into(),
        blood_group: "O-".into(),
        donation_date: "2025-06-10".into(),
        donation_time: "10:30".into(),
        request_message: "Urgent transfusion needed".into(),
        status,
        donor_name: None,
        donor_email: None,
        created_at: DateTime::from_millis(created_ms),
    }
}

pub fn payment(transaction_id: &str, amount: f64) -> Payment {
    Payment {
        id: Some(ObjectId::new()),
        transaction_id: transaction_id.into(),
        amount,
        currency: "usd".into(),
        email: Some("donor@example.com".into()),
        name: Some("Test Donor".into()),
        paid_at: DateTime::now(),
    }
}

pub fn paid_session(id: &str, transaction_id: &str, amount_cents: i64) -> CheckoutSession {
    CheckoutSession {
        id: id.to_string(),
        url: None,
        payment_status: "paid".into(),
        payment_intent: Some(transaction_id.to_string()),
        amount_total: Some(amount_cents),
        currency: Some("usd".into()),
        customer_email: Some("donor@example.com".into()),
        customer_name: Some("Test Donor".into()),
    }
}

/// Store double with the same per-operation semantics as the Mongo
/// implementation, newest-first ordering included.
#[derive(Default)]
pub struct MemStore {
    pub users: Mutex<Vec<User>>,
    pub requests: Mutex<Vec<DonationRequest>>,
    pub payments: Mutex<Vec<Payment>>,
}

fn sorted_desc(mut requests: Vec<DonationRequest>) -> Vec<DonationRequest> {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    requests
}

fn page_slice(items: Vec<DonationRequest>, page: Page) -> (Vec<DonationRequest>, u64) {
    let total = items.len() as u64;
    let start = (page.offset() as usize).min(items.len());
    let end = start.saturating_add(page.size as usize).min(items.len());
    (items[start..end].to_vec(), total)
}

#[async_trait]
impl Store for MemStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, mut user: User) -> Result<String> {
        let id = user.id.unwrap_or_else(ObjectId::new);
        user.id = Some(id);
        self.users.lock().unwrap().push(user);
        Ok(id.to_hex())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn set_user_status(&self, email: &str, status: UserStatus) -> Result<u64> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.status = status;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn set_user_role(&self, email: &str, role: Role) -> Result<u64> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.role = role;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_user_profile(&self, email: &str, update: &ProfileUpdate) -> Result<u64> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.name = update.name.clone();
                if update.avatar.is_some() {
                    user.avatar = update.avatar.clone();
                }
                user.blood_group = update.blood_group.clone();
                user.district = update.district.clone();
                user.upazila = update.upazila.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count_users_with_role(&self, role: Role) -> Result<u64> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role == role)
            .count() as u64)
    }

    async fn insert_request(&self, mut request: DonationRequest) -> Result<String> {
        let id = request.id.unwrap_or_else(ObjectId::new);
        request.id = Some(id);
        self.requests.lock().unwrap().push(request);
        Ok(id.to_hex())
    }

    async fn find_request(&self, id: ObjectId) -> Result<Option<DonationRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == Some(id))
            .cloned())
    }

    async fn requests_by_requester(
        &self,
        email: &str,
        status: Option<RequestStatus>,
        page: Page,
    ) -> Result<(Vec<DonationRequest>, u64)> {
        let items: Vec<_> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.requester_email == email)
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        Ok(page_slice(sorted_desc(items), page))
    }

    async fn all_requests(&self, page: Page) -> Result<(Vec<DonationRequest>, u64)> {
        let items = self.requests.lock().unwrap().clone();
        Ok(page_slice(sorted_desc(items), page))
    }

    async fn recent_requests(
        &self,
        requester: Option<&str>,
        limit: i64,
    ) -> Result<Vec<DonationRequest>> {
        let items: Vec<_> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| requester.map_or(true, |email| r.requester_email == email))
            .cloned()
            .collect();
        let mut items = sorted_desc(items);
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn pending_requests(&self) -> Result<Vec<DonationRequest>> {
        let items: Vec<_> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        Ok(sorted_desc(items))
    }

    async fn search_requests(&self, filter: &SearchFilter) -> Result<Vec<DonationRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                filter
                    .blood_group
                    .as_ref()
                    .map_or(true, |v| &r.blood_group == v)
                    && filter.district.as_ref().map_or(true, |v| &r.district == v)
                    && filter.upazila.as_ref().map_or(true, |v| &r.upazila == v)
            })
            .cloned()
            .collect())
    }

    async fn assign_donor(
        &self,
        id: ObjectId,
        donor_name: &str,
        donor_email: &str,
    ) -> Result<u64> {
        let mut requests = self.requests.lock().unwrap();
        match requests.iter_mut().find(|r| r.id == Some(id)) {
            Some(request) => {
                request.status = RequestStatus::Inprogress;
                request.donor_name = Some(donor_name.to_string());
                request.donor_email = Some(donor_email.to_string());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn set_request_status(&self, id: ObjectId, status: RequestStatus) -> Result<u64> {
        let mut requests = self.requests.lock().unwrap();
        match requests.iter_mut().find(|r| r.id == Some(id)) {
            Some(request) => {
                request.status = status;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_request(&self, id: ObjectId, update: &RequestUpdate) -> Result<u64> {
        let mut requests = self.requests.lock().unwrap();
        match requests.iter_mut().find(|r| r.id == Some(id)) {
            Some(request) => {
                request.recipient_name = update.recipient_name.clone();
                request.district = update.district.clone();
                request.upazila = update.upazila.clone();
                request.hospital_name = update.hospital_name.clone();
                request.full_address = update.full_address.clone();
                request.blood_group = update.blood_group.clone();
                request.donation_date = update.donation_date.clone();
                request.donation_time = update.donation_time.clone();
                request.request_message = update.request_message.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_request(&self, id: ObjectId) -> Result<u64> {
        let mut requests = self.requests.lock().unwrap();
        let before = requests.len();
        requests.retain(|r| r.id != Some(id));
        Ok((before - requests.len()) as u64)
    }

    async fn count_requests(&self) -> Result<u64> {
        Ok(self.requests.lock().unwrap().len() as u64)
    }

    async fn find_payment_by_transaction(&self, transaction_id: &str) -> Result<Option<Payment>> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.transaction_id == transaction_id)
            .cloned())
    }

    async fn insert_payment(&self, mut payment: Payment) -> Result<String> {
        let id = payment.id.unwrap_or_else(ObjectId::new);
        payment.id = Some(id);
        self.payments.lock().unwrap().push(payment);
        Ok(id.to_hex())
    }

    async fn list_payments(&self) -> Result<Vec<Payment>> {
        let mut payments = self.payments.lock().unwrap().clone();
        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(payments)
    }

    async fn total_funding(&self) -> Result<f64> {
        Ok(self.payments.lock().unwrap().iter().map(|p| p.amount).sum())
    }
}

/// Checkout double: sessions live in a map, created ones start unpaid.
#[derive(Default)]
pub struct FakeCheckout {
    pub sessions: Mutex<HashMap<String, CheckoutSession>>,
}

impl FakeCheckout {
    pub fn with_session(session: CheckoutSession) -> Self {
        let fake = Self::default();
        fake.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
        fake
    }
}

#[async_trait]
impl CheckoutGateway for FakeCheckout {
    async fn create_session(
        &self,
        amount_cents: i64,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<CheckoutSession> {
        let mut sessions = self.sessions.lock().unwrap();
        let id = format!("cs_test_{}", sessions.len() + 1);
        let session = CheckoutSession {
            id: id.clone(),
            url: Some(format!("https://checkout.test/{id}")),
            payment_status: "unpaid".into(),
            payment_intent: None,
            amount_total: Some(amount_cents),
            currency: Some("usd".into()),
            customer_email: email.map(str::to_string),
            customer_name: name.map(str::to_string),
        };
        sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such session: {session_id}"))
    }
}
