use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// One payment attempt at the external processor, referenced by an opaque
/// session id and, once paid, a transaction id.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub payment_status: String,
    pub payment_intent: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    pub fn transaction_id(&self) -> &str {
        self.payment_intent.as_deref().unwrap_or(&self.id)
    }
}

/// External payment capability: create a checkout session, retrieve one by
/// id. All payment state lives at the processor.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    async fn create_session(
        &self,
        amount_cents: i64,
        email: Option<&str>,
        name: Option<&str>,
    ) -> anyhow::Result<CheckoutSession>;

    async fn retrieve_session(&self, session_id: &str) -> anyhow::Result<CheckoutSession>;
}

pub struct StripeCheckout {
    secret_key: String,
    site_domain: String,
    http: Client,
}

impl StripeCheckout {
    pub fn new(secret_key: String, site_domain: String) -> anyhow::Result<Self> {
        let http = Client::builder().user_agent("blood-aid-backend").build()?;
        Ok(Self {
            secret_key,
            site_domain,
            http,
        })
    }
}

#[derive(Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
    payment_status: String,
    payment_intent: Option<String>,
    amount_total: Option<i64>,
    currency: Option<String>,
    customer_details: Option<StripeCustomer>,
}

#[derive(Deserialize)]
struct StripeCustomer {
    email: Option<String>,
    name: Option<String>,
}

impl From<StripeSession> for CheckoutSession {
    fn from(raw: StripeSession) -> Self {
        let (customer_email, customer_name) = match raw.customer_details {
            Some(details) => (details.email, details.name),
            None => (None, None),
        };
        Self {
            id: raw.id,
            url: raw.url,
            payment_status: raw.payment_status,
            payment_intent: raw.payment_intent,
            amount_total: raw.amount_total,
            currency: raw.currency,
            customer_email,
            customer_name,
        }
    }
}

#[async_trait]
impl CheckoutGateway for StripeCheckout {
    async fn create_session(
        &self,
        amount_cents: i64,
        email: Option<&str>,
        name: Option<&str>,
    ) -> anyhow::Result<CheckoutSession> {
        let success_url = format!(
            "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
            self.site_domain
        );
        let cancel_url = format!("{}/funding", self.site_domain);
        let mut params = vec![
            ("mode", "payment".to_string()),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][unit_amount]",
                amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                "Blood aid donation".to_string(),
            ),
        ];
        if let Some(email) = email {
            params.push(("customer_email", email.to_string()));
        }
        if let Some(name) = name {
            params.push(("metadata[donorName]", name.to_string()));
        }

        let response = self
            .http
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .with_context(|| "checkout session create call failed")?;
        parse_session(response).await
    }

    async fn retrieve_session(&self, session_id: &str) -> anyhow::Result<CheckoutSession> {
        let response = self
            .http
            .get(format!("{STRIPE_API_BASE}/checkout/sessions/{session_id}"))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .with_context(|| "checkout session retrieve call failed")?;
        parse_session(response).await
    }
}

async fn parse_session(response: reqwest::Response) -> anyhow::Result<CheckoutSession> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("payment provider returned {status}: {body}");
    }
    let raw: StripeSession = response
        .json()
        .await
        .with_context(|| "malformed checkout session payload")?;
    Ok(raw.into())
}
