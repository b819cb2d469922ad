pub mod mongo;

use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::domain::payment::Payment;
use crate::domain::request::{DonationRequest, RequestStatus, RequestUpdate, SearchFilter};
use crate::domain::user::{ProfileUpdate, Role, User, UserStatus};

/// Offset pagination: `page` is zero-based, offset = size * page.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: u64,
    pub size: u64,
}

impl Page {
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 0, size: 10 }
    }
}

/// The document store behind every handler. One method per operation; each
/// call is independently atomic and nothing here spans a transaction.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn insert_user(&self, user: User) -> Result<String>;
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn set_user_status(&self, email: &str, status: UserStatus) -> Result<u64>;
    async fn set_user_role(&self, email: &str, role: Role) -> Result<u64>;
    async fn update_user_profile(&self, email: &str, update: &ProfileUpdate) -> Result<u64>;
    async fn count_users_with_role(&self, role: Role) -> Result<u64>;

    async fn insert_request(&self, request: DonationRequest) -> Result<String>;
    async fn find_request(&self, id: ObjectId) -> Result<Option<DonationRequest>>;
    async fn requests_by_requester(
        &self,
        email: &str,
        status: Option<RequestStatus>,
        page: Page,
    ) -> Result<(Vec<DonationRequest>, u64)>;
    async fn all_requests(&self, page: Page) -> Result<(Vec<DonationRequest>, u64)>;
    async fn recent_requests(
        &self,
        requester: Option<&str>,
        limit: i64,
    ) -> Result<Vec<DonationRequest>>;
    async fn pending_requests(&self) -> Result<Vec<DonationRequest>>;
    async fn search_requests(&self, filter: &SearchFilter) -> Result<Vec<DonationRequest>>;
    async fn assign_donor(
        &self,
        id: ObjectId,
        donor_name: &str,
        donor_email: &str,
    ) -> Result<u64>;
    async fn set_request_status(&self, id: ObjectId, status: RequestStatus) -> Result<u64>;
    async fn update_request(&self, id: ObjectId, update: &RequestUpdate) -> Result<u64>;
    async fn delete_request(&self, id: ObjectId) -> Result<u64>;
    async fn count_requests(&self) -> Result<u64>;

    async fn find_payment_by_transaction(&self, transaction_id: &str) -> Result<Option<Payment>>;
    async fn insert_payment(&self, payment: Payment) -> Result<String>;
    async fn list_payments(&self) -> Result<Vec<Payment>>;
    async fn total_funding(&self) -> Result<f64>;
}
