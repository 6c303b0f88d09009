//! HTTP Handlers

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;
use std::sync::Arc;

use setup_core::{PublicKeyResponse, SetupIntentRecord};
use setup_payments::{PaymentError, StripeClient, WebhookHandler};

use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn api_error(status: StatusCode, error: &str, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

/// Stripe failures are upstream and may pass on retry; anything else is ours
const fn setup_intent_status(err: &PaymentError) -> StatusCode {
    if err.is_retryable() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn stripe(state: &AppState) -> Result<&Arc<StripeClient>, ApiError> {
    state.stripe.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Payments not configured",
            "PAYMENTS_DISABLED",
        )
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.stripe.is_some(),
    })
}

/// Publishable key for Stripe.js
pub async fn public_key(
    State(state): State<AppState>,
) -> Result<Json<PublicKeyResponse>, ApiError> {
    let stripe = stripe(&state)?;

    Ok(Json(PublicKeyResponse {
        public_key: stripe.publishable_key().clone(),
    }))
}

/// Create a customer and a setup intent for the card form
pub async fn create_setup_intent(
    State(state): State<AppState>,
) -> Result<Json<SetupIntentRecord>, ApiError> {
    let stripe = stripe(&state)?;

    let record = stripe.create_setup_intent().await.map_err(|e| {
        tracing::error!(retryable = e.is_retryable(), "Setup intent error: {}", e);
        api_error(setup_intent_status(&e), e.user_message(), "SETUP_INTENT_ERROR")
    })?;

    Ok(Json(record))
}

/// Stripe webhook handler
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, ApiError> {
    let stripe = stripe(&state)?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                "Missing Stripe signature",
                "MISSING_SIGNATURE",
            )
        })?;

    let handler = WebhookHandler::new(stripe.webhook_secret());

    let event = handler.parse_event(&body, signature).map_err(|e| {
        tracing::warn!("Webhook signature failed: {}", e);
        api_error(StatusCode::BAD_REQUEST, "Invalid signature", "INVALID_SIGNATURE")
    })?;

    handler.handle(&event).map_err(|e| {
        tracing::error!("Webhook processing error: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Webhook processing failed",
            "WEBHOOK_ERROR",
        )
    })?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_intent_status() {
        let upstream = PaymentError::Stripe("rate limited".into());
        let config = PaymentError::Config("STRIPE_SECRET_KEY not set".into());

        assert_eq!(setup_intent_status(&upstream), StatusCode::BAD_GATEWAY);
        assert_eq!(setup_intent_status(&config), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
