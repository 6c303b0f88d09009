//! Stripe Webhook Handling
//!
//! Follows setup intents after the browser has confirmed them.

use stripe::{Event, EventObject, EventType, Webhook};

use crate::error::{PaymentError, Result};

/// Parsed webhook event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Card saved for the customer
    SetupSucceeded {
        setup_intent_id: String,
        customer_id: Option<String>,
        payment_method_id: Option<String>,
    },

    /// Confirmation failed on Stripe's side
    SetupFailed {
        setup_intent_id: String,
        customer_id: Option<String>,
        message: Option<String>,
    },

    /// Payment method attached to a customer
    PaymentMethodAttached {
        payment_method_id: String,
        customer_id: Option<String>,
    },

    /// Unhandled event type
    Other { event_type: String },
}

/// Webhook handler
pub struct WebhookHandler {
    secret: String,
}

impl WebhookHandler {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify webhook signature and parse event
    pub fn parse_event(&self, payload: &str, signature: &str) -> Result<Event> {
        Webhook::construct_event(payload, signature, &self.secret)
            .map_err(|e| PaymentError::WebhookSignature(e.to_string()))
    }

    /// Process a webhook event
    pub fn handle(&self, event: &Event) -> Result<WebhookEvent> {
        tracing::info!(event_type = ?event.type_, "Processing Stripe webhook");

        let parsed = parse_webhook_event(event)?;

        match &parsed {
            WebhookEvent::SetupSucceeded {
                setup_intent_id,
                customer_id,
                payment_method_id,
            } => {
                tracing::info!(
                    setup_intent = %setup_intent_id,
                    customer = ?customer_id,
                    payment_method = ?payment_method_id,
                    "Card saved"
                );
            }

            WebhookEvent::SetupFailed {
                setup_intent_id,
                customer_id,
                message,
            } => {
                tracing::warn!(
                    setup_intent = %setup_intent_id,
                    customer = ?customer_id,
                    message = ?message,
                    "Card setup failed"
                );
            }

            WebhookEvent::PaymentMethodAttached {
                payment_method_id,
                customer_id,
            } => {
                tracing::info!(
                    payment_method = %payment_method_id,
                    customer = ?customer_id,
                    "Payment method attached"
                );
            }

            WebhookEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "Unhandled webhook event");
            }
        }

        Ok(parsed)
    }
}

/// Parse Stripe event into our event type
fn parse_webhook_event(event: &Event) -> Result<WebhookEvent> {
    match event.type_ {
        EventType::SetupIntentSucceeded => {
            if let EventObject::SetupIntent(intent) = &event.data.object {
                Ok(WebhookEvent::SetupSucceeded {
                    setup_intent_id: intent.id.to_string(),
                    customer_id: intent.customer.as_ref().map(|c| c.id().to_string()),
                    payment_method_id: intent.payment_method.as_ref().map(|p| p.id().to_string()),
                })
            } else {
                Err(PaymentError::WebhookParse("Invalid setup intent data".into()))
            }
        }

        EventType::SetupIntentSetupFailed => {
            if let EventObject::SetupIntent(intent) = &event.data.object {
                Ok(WebhookEvent::SetupFailed {
                    setup_intent_id: intent.id.to_string(),
                    customer_id: intent.customer.as_ref().map(|c| c.id().to_string()),
                    message: intent
                        .last_setup_error
                        .as_ref()
                        .and_then(|e| e.message.clone()),
                })
            } else {
                Err(PaymentError::WebhookParse("Invalid setup intent data".into()))
            }
        }

        EventType::PaymentMethodAttached => {
            if let EventObject::PaymentMethod(method) = &event.data.object {
                Ok(WebhookEvent::PaymentMethodAttached {
                    payment_method_id: method.id.to_string(),
                    customer_id: method.customer.as_ref().map(|c| c.id().to_string()),
                })
            } else {
                Err(PaymentError::WebhookParse("Invalid payment method data".into()))
            }
        }

        _ => Ok(WebhookEvent::Other {
            event_type: format!("{:?}", event.type_),
        }),
    }
}
