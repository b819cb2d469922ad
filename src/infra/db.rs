use anyhow::Context;
use mongodb::bson::doc;
use mongodb::{Client, Database};
use tracing::{info, warn};

pub async fn connect(db_name: &str) -> anyhow::Result<Database> {
    let uri = std::env::var("MONGODB_URI")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(derive_atlas_uri)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "MONGODB_URI missing. Set MONGODB_URI or the DB_USER/DB_PASS/DB_HOST trio."
            )
        })?;
    let client = Client::with_uri_str(&uri)
        .await
        .with_context(|| "failed to connect to MongoDB; check MONGODB_URI/DB_* credentials")?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .with_context(|| "MongoDB ping failed; the deployment is unreachable")?;
    info!("connected to MongoDB database {db_name}");
    Ok(client.database(db_name))
}

fn derive_atlas_uri() -> Option<String> {
    let user = env_string("DB_USER")?;
    let pass = env_string("DB_PASS")?;
    let host = env_string("DB_HOST")?;
    warn!("MONGODB_URI missing; deriving Atlas connection from DB_USER/DB_PASS (host={host})");
    Some(format!(
        "mongodb+srv://{}:{}@{}/?retryWrites=true&w=majority",
        user,
        urlencoding::encode(&pass),
        host
    ))
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
