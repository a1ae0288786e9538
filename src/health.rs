use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub uptime_secs: u64,
}

/// Liveness endpoints for the hosting platform.
pub fn router(started_at: Instant) -> Router {
    Router::new()
        .route("/", get(|| async { "OK" }))
        .route("/health", get(health))
        .with_state(started_at)
}

async fn health(State(started_at): State<Instant>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        uptime_secs: started_at.elapsed().as_secs(),
    })
}

pub async fn serve(bind_address: &str, started_at: Instant) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("Health server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(started_at)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness_endpoints() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(Instant::now())).await.unwrap();
        });

        let root = reqwest::get(format!("http://{}/", addr)).await.unwrap();
        assert_eq!(root.status(), 200);
        assert_eq!(root.text().await.unwrap(), "OK");

        let health: serde_json::Value = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
        assert!(health["uptime_secs"].is_u64());
    }
}
