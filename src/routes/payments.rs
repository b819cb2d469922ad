use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::domain::payment::Payment;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    /// Donation amount in the currency's major unit.
    pub amount: f64,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizePayload {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub message: &'static str,
}

pub async fn create_checkout(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(payload): Json<CheckoutPayload>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let amount_cents = (payload.amount * 100.0).round() as i64;
    let session = state
        .checkout
        .create_session(
            amount_cents,
            payload.email.as_deref(),
            payload.name.as_deref(),
        )
        .await?;
    let url = session
        .url
        .ok_or_else(|| anyhow::anyhow!("checkout session has no redirect URL"))?;
    Ok(Json(CheckoutResponse { url }))
}

pub async fn finalize_payment(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(payload): Json<FinalizePayload>,
) -> Result<Json<PaymentResult>, ApiError> {
    let session = state.checkout.retrieve_session(&payload.session_id).await?;
    if !session.is_paid() {
        return Ok(Json(PaymentResult {
            recorded: false,
            transaction_id: None,
            message: "payment not completed",
        }));
    }

    let transaction_id = session.transaction_id().to_string();
    if state
        .store
        .find_payment_by_transaction(&transaction_id)
        .await?
        .is_some()
    {
        return Ok(Json(PaymentResult {
            recorded: false,
            transaction_id: Some(transaction_id),
            message: "payment already recorded",
        }));
    }

    let payment = Payment {
        id: None,
        transaction_id: transaction_id.clone(),
        amount: session
            .amount_total
            .map(|cents| cents as f64 / 100.0)
            .unwrap_or(0.0),
        currency: session.currency.clone().unwrap_or_else(|| "usd".into()),
        email: session.customer_email.clone(),
        name: session.customer_name.clone(),
        paid_at: DateTime::now(),
    };
    state.store.insert_payment(payment).await?;
    Ok(Json(PaymentResult {
        recorded: true,
        transaction_id: Some(transaction_id),
        message: "payment recorded",
    }))
}

pub async fn list_funds(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<Vec<Payment>>, ApiError> {
    Ok(Json(state.store.list_payments().await?))
}
