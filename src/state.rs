use std::sync::Arc;

use crate::infra::checkout::CheckoutGateway;
use crate::security::jwt::JwtVerifier;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt: JwtVerifier,
    pub checkout: Arc<dyn CheckoutGateway>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        jwt: JwtVerifier,
        checkout: Arc<dyn CheckoutGateway>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            jwt,
            checkout,
        })
    }
}
