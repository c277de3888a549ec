use anyhow::Context;

use ausbau_api::app::{AppServices, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ausbau_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let services = match std::env::var("DATABASE_URL") {
        Ok(url) => AppServices::postgres(&url)
            .await
            .context("failed to connect to Postgres")?,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            AppServices::in_memory()
        }
    };

    let app = build_app(jwt_secret, services);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
