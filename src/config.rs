use tracing::warn;

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub db_name: String,
    pub jwt_secret: String,
    pub stripe_secret_key: String,
    pub site_domain: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env_string("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);
        let db_name = env_string("DB_NAME").unwrap_or_else(|| "bloodAidDB".into());
        let jwt_secret = env_string("ACCESS_JWT_SECRET").ok_or_else(|| {
            anyhow::anyhow!("ACCESS_JWT_SECRET missing. Set the identity service token secret.")
        })?;
        let stripe_secret_key = env_string("STRIPE_SECRET_KEY").ok_or_else(|| {
            anyhow::anyhow!("STRIPE_SECRET_KEY missing. Set the payment provider secret key.")
        })?;
        let site_domain = env_string("SITE_DOMAIN").unwrap_or_else(|| {
            warn!("SITE_DOMAIN missing; falling back to the local dev origin for checkout redirects");
            "http://localhost:5173".into()
        });

        Ok(AppConfig {
            port,
            db_name,
            jwt_secret,
            stripe_secret_key,
            site_domain,
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
