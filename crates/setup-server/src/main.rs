//! Card setup HTTP server
//!
//! Serves the card page with its wasm bundle and the endpoints it calls.

mod config;
mod handlers;
mod state;

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use setup_payments::StripeClient;

use crate::config::ServerConfig;
use crate::handlers::{create_setup_intent, health_check, public_key, stripe_webhook};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env();

    let stripe = match StripeClient::from_env() {
        Ok(client) => {
            tracing::info!("✓ Stripe configured");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("⚠ Stripe not configured - payments disabled ({})", e);
            tracing::warn!(
                "  Set STRIPE_SECRET_KEY, STRIPE_PUBLISHABLE_KEY and STRIPE_WEBHOOK_SECRET in .env"
            );
            None
        }
    };

    let app = router(AppState { stripe }, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("card-setup server running on http://{}", config.bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  GET  /public-key          - Stripe publishable key");
    tracing::info!("  POST /create-setup-intent - New customer + setup intent");
    tracing::info!("  POST /webhook             - Stripe webhook");
    tracing::info!("  GET  /*                   - {}", config.static_dir.display());

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/public-key", get(public_key))
        .route("/create-setup-intent", post(create_setup_intent))
        .route("/webhook", post(stripe_webhook))
        // Card page, Stripe.js loader and wasm bundle
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn configured() -> AppState {
        let stripe = StripeClient::new("sk_test_1", "pk_test_1", "whsec_1");
        AppState {
            stripe: Some(Arc::new(stripe)),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_serves_card_page_with_submit_disabled() {
        let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../static");
        let app = router(AppState::default(), &static_dir);

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains(r#"<button id="submit" disabled>"#));
        assert!(page.contains(r#"id="card-element""#));
    }

    #[tokio::test]
    async fn test_health_reports_stripe_status() {
        let app = router(AppState::default(), Path::new("static"));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["stripe_configured"], false);
    }

    #[tokio::test]
    async fn test_public_key() {
        let app = router(configured(), Path::new("static"));

        let response = app
            .oneshot(Request::get("/public-key").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["publicKey"], "pk_test_1");
    }

    #[tokio::test]
    async fn test_public_key_without_stripe() {
        let app = router(AppState::default(), Path::new("static"));

        let response = app
            .oneshot(Request::get("/public-key").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["code"], "PAYMENTS_DISABLED");
    }

    #[tokio::test]
    async fn test_setup_intent_without_stripe() {
        let app = router(AppState::default(), Path::new("static"));

        let response = app
            .oneshot(
                Request::post("/create-setup-intent")
                    .header("content-type", "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_webhook_requires_signature() {
        let app = router(configured(), Path::new("static"));

        let response = app
            .oneshot(
                Request::post("/webhook")
                    .body(Body::from(r#"{"id":"evt_1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "MISSING_SIGNATURE");
    }

    #[tokio::test]
    async fn test_webhook_rejects_bad_signature() {
        let app = router(configured(), Path::new("static"));

        let response = app
            .oneshot(
                Request::post("/webhook")
                    .header("stripe-signature", "t=1,v1=deadbeef")
                    .body(Body::from(r#"{"id":"evt_1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_SIGNATURE");
    }
}
