use std::sync::Arc;

use warden_api::app::services::AppServices;
use warden_auth::TokenConfig;
use warden_infra::PgCredentialStore;

#[tokio::main]
async fn main() {
    warden_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });
    let token_config = TokenConfig::new(jwt_secret);

    let services = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::PgPool::connect(&url)
                .await
                .expect("failed to connect to Postgres");
            AppServices::with_store(Arc::new(PgCredentialStore::new(pool)), token_config)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory credential store");
            AppServices::in_memory(token_config)
        }
    };

    let app = warden_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
