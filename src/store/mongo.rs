use anyhow::Result;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_document, Document};
use mongodb::{Collection, Database};

use crate::domain::payment::Payment;
use crate::domain::request::{DonationRequest, RequestStatus, RequestUpdate, SearchFilter};
use crate::domain::user::{ProfileUpdate, Role, User, UserStatus};
use crate::store::{Page, Store};

pub struct MongoStore {
    users: Collection<User>,
    requests: Collection<DonationRequest>,
    payments: Collection<Payment>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection("users"),
            requests: db.collection("requests"),
            payments: db.collection("payments"),
        }
    }
}

fn search_document(filter: &SearchFilter) -> Document {
    let mut query = Document::new();
    if let Some(group) = &filter.blood_group {
        query.insert("bloodGroup", group);
    }
    if let Some(district) = &filter.district {
        query.insert("district", district);
    }
    if let Some(upazila) = &filter.upazila {
        query.insert("upazila", upazila);
    }
    query
}

fn inserted_hex(inserted_id: mongodb::bson::Bson) -> String {
    inserted_id
        .as_object_id()
        .map(|id| id.to_hex())
        .unwrap_or_default()
}

#[async_trait]
impl Store for MongoStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    async fn insert_user(&self, user: User) -> Result<String> {
        let res = self.users.insert_one(&user).await?;
        Ok(inserted_hex(res.inserted_id))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let cursor = self
            .users
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn set_user_status(&self, email: &str, status: UserStatus) -> Result<u64> {
        let res = self
            .users
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "status": status.as_str() } },
            )
            .await?;
        Ok(res.modified_count)
    }

    async fn set_user_role(&self, email: &str, role: Role) -> Result<u64> {
        let res = self
            .users
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "role": role.as_str() } },
            )
            .await?;
        Ok(res.modified_count)
    }

    async fn update_user_profile(&self, email: &str, update: &ProfileUpdate) -> Result<u64> {
        let set = to_document(update)?;
        let res = self
            .users
            .update_one(doc! { "email": email }, doc! { "$set": set })
            .await?;
        Ok(res.modified_count)
    }

    async fn count_users_with_role(&self, role: Role) -> Result<u64> {
        Ok(self
            .users
            .count_documents(doc! { "role": role.as_str() })
            .await?)
    }

    async fn insert_request(&self, request: DonationRequest) -> Result<String> {
        let res = self.requests.insert_one(&request).await?;
        Ok(inserted_hex(res.inserted_id))
    }

    async fn find_request(&self, id: ObjectId) -> Result<Option<DonationRequest>> {
        Ok(self.requests.find_one(doc! { "_id": id }).await?)
    }

    async fn requests_by_requester(
        &self,
        email: &str,
        status: Option<RequestStatus>,
        page: Page,
    ) -> Result<(Vec<DonationRequest>, u64)> {
        let mut query = doc! { "requesterEmail": email };
        if let Some(status) = status {
            query.insert("status", status.as_str());
        }
        let total = self.requests.count_documents(query.clone()).await?;
        let cursor = self
            .requests
            .find(query)
            .sort(doc! { "createdAt": -1 })
            .skip(page.offset())
            .limit(page.size as i64)
            .await?;
        Ok((cursor.try_collect().await?, total))
    }

    async fn all_requests(&self, page: Page) -> Result<(Vec<DonationRequest>, u64)> {
        let total = self.requests.count_documents(doc! {}).await?;
        let cursor = self
            .requests
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .skip(page.offset())
            .limit(page.size as i64)
            .await?;
        Ok((cursor.try_collect().await?, total))
    }

    async fn recent_requests(
        &self,
        requester: Option<&str>,
        limit: i64,
    ) -> Result<Vec<DonationRequest>> {
        let query = match requester {
            Some(email) => doc! { "requesterEmail": email },
            None => doc! {},
        };
        let cursor = self
            .requests
            .find(query)
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn pending_requests(&self) -> Result<Vec<DonationRequest>> {
        let cursor = self
            .requests
            .find(doc! { "status": RequestStatus::Pending.as_str() })
            .sort(doc! { "createdAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn search_requests(&self, filter: &SearchFilter) -> Result<Vec<DonationRequest>> {
        let cursor = self.requests.find(search_document(filter)).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn assign_donor(
        &self,
        id: ObjectId,
        donor_name: &str,
        donor_email: &str,
    ) -> Result<u64> {
        let res = self
            .requests
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "status": RequestStatus::Inprogress.as_str(),
                    "donorName": donor_name,
                    "donorEmail": donor_email,
                } },
            )
            .await?;
        Ok(res.modified_count)
    }

    async fn set_request_status(&self, id: ObjectId, status: RequestStatus) -> Result<u64> {
        let res = self
            .requests
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str() } },
            )
            .await?;
        Ok(res.modified_count)
    }

    async fn update_request(&self, id: ObjectId, update: &RequestUpdate) -> Result<u64> {
        let set = to_document(update)?;
        let res = self
            .requests
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(res.modified_count)
    }

    async fn delete_request(&self, id: ObjectId) -> Result<u64> {
        let res = self.requests.delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count)
    }

    async fn count_requests(&self) -> Result<u64> {
        Ok(self.requests.count_documents(doc! {}).await?)
    }

    async fn find_payment_by_transaction(&self, transaction_id: &str) -> Result<Option<Payment>> {
        Ok(self
            .payments
            .find_one(doc! { "transactionId": transaction_id })
            .await?)
    }

    async fn insert_payment(&self, payment: Payment) -> Result<String> {
        let res = self.payments.insert_one(&payment).await?;
        Ok(inserted_hex(res.inserted_id))
    }

    async fn list_payments(&self) -> Result<Vec<Payment>> {
        let cursor = self
            .payments
            .find(doc! {})
            .sort(doc! { "paidAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn total_funding(&self) -> Result<f64> {
        let pipeline = [doc! { "$group": { "_id": null, "total": { "$sum": "$amount" } } }];
        let mut cursor = self.payments.aggregate(pipeline).await?;
        let total = match cursor.try_next().await? {
            Some(group) => group.get_f64("total").unwrap_or(0.0),
            None => 0.0,
        };
        Ok(total)
    }
}
