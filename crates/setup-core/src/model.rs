//! Wire and Flow Types
//!
//! Shared between the browser flow and the backend that serves it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Publishable key identifying the processor account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(String);

impl PublicKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Client secret of a setup intent, handed to the SDK for confirmation
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Secrets stay out of logs.
impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(..)")
    }
}

/// Processor customer identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `GET /public-key`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    #[serde(rename = "publicKey")]
    pub public_key: PublicKey,
}

/// Body of `POST /create-setup-intent`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupIntentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub client_secret: ClientSecret,

    pub customer: CustomerId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Result of the SDK card confirmation call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Payment method was set up
    Confirmed,

    /// SDK reported a card or confirmation error
    Declined { message: String },
}

/// What a click on the submit button led to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Error shown to the user, form usable again
    Declined(String),

    /// Browser sent to the registration page
    Redirected(String),

    /// A submission was already running
    Ignored,
}

/// Page lifecycle
///
/// The page is idle until [`CardSetup::start`](crate::CardSetup::start) runs;
/// a `CardSetup` only exists once the card is mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    AwaitingKey,
    AwaitingSetupIntent,
    Mounted,
    Submitting,
    Redirecting,
}

impl FlowState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingKey => "awaiting_key",
            Self::AwaitingSetupIntent => "awaiting_setup_intent",
            Self::Mounted => "mounted",
            Self::Submitting => "submitting",
            Self::Redirecting => "redirecting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_response_field_name() {
        let body: PublicKeyResponse =
            serde_json::from_str(r#"{"publicKey":"pk_test_123"}"#).unwrap();
        assert_eq!(body.public_key.as_str(), "pk_test_123");

        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"publicKey":"pk_test_123"}"#);
    }

    #[test]
    fn test_setup_intent_ignores_extra_fields() {
        let record: SetupIntentRecord = serde_json::from_str(
            r#"{
                "id": "seti_123",
                "object": "setup_intent",
                "client_secret": "seti_123_secret_abc",
                "customer": "cus_456",
                "status": "requires_payment_method",
                "usage": "off_session"
            }"#,
        )
        .unwrap();

        assert_eq!(record.client_secret.as_str(), "seti_123_secret_abc");
        assert_eq!(record.customer.as_str(), "cus_456");
        assert_eq!(record.status.as_deref(), Some("requires_payment_method"));
    }

    #[test]
    fn test_setup_intent_requires_customer() {
        let result: Result<SetupIntentRecord, _> =
            serde_json::from_str(r#"{"client_secret":"seti_1_secret_x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_secret_debug_is_redacted() {
        let secret = ClientSecret::new("seti_123_secret_abc");
        assert_eq!(format!("{secret:?}"), "ClientSecret(..)");
    }
}
