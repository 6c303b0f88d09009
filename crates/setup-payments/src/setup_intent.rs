//! Stripe Setup Intents
//!
//! Every visit to the card page gets a fresh customer and a setup intent
//! for it. The browser confirms the intent with Stripe.js; nothing is
//! charged.

use setup_core::{ClientSecret, CustomerId, PublicKey, SetupIntentRecord};
use stripe::{Client, CreateCustomer, CreateSetupIntent, Customer, SetupIntent};

use crate::error::{PaymentError, Result};

/// Stripe client wrapper
pub struct StripeClient {
    client: Client,
    publishable_key: PublicKey,
    webhook_secret: String,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(secret_key: &str, publishable_key: &str, webhook_secret: &str) -> Self {
        Self {
            client: Client::new(secret_key),
            publishable_key: PublicKey::new(publishable_key),
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Create from a variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| PaymentError::Config(format!("{name} not set")))
        };

        let secret_key = require("STRIPE_SECRET_KEY")?;
        let publishable_key = require("STRIPE_PUBLISHABLE_KEY")?;
        let webhook_secret = require("STRIPE_WEBHOOK_SECRET")?;

        Ok(Self::new(&secret_key, &publishable_key, &webhook_secret))
    }

    /// Key handed to the browser
    pub const fn publishable_key(&self) -> &PublicKey {
        &self.publishable_key
    }

    /// Get the webhook secret
    pub fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }

    /// Create a customer and a card setup intent attached to it
    pub async fn create_setup_intent(&self) -> Result<SetupIntentRecord> {
        let customer = Customer::create(&self.client, CreateCustomer::new()).await?;

        let mut params = CreateSetupIntent::new();
        params.customer = Some(customer.id.clone());
        params.payment_method_types = Some(vec!["card".to_string()]);

        let intent = SetupIntent::create(&self.client, params).await?;

        tracing::info!(
            setup_intent = %intent.id,
            customer = %customer.id,
            "Created setup intent"
        );

        to_record(&intent)
    }
}

/// Shape a Stripe setup intent into the record the page expects
pub fn to_record(intent: &SetupIntent) -> Result<SetupIntentRecord> {
    let client_secret = intent
        .client_secret
        .clone()
        .ok_or_else(|| PaymentError::Stripe("No client secret returned".into()))?;

    let customer = intent
        .customer
        .as_ref()
        .map(|c| c.id().to_string())
        .ok_or_else(|| PaymentError::Stripe("Setup intent has no customer".into()))?;

    Ok(SetupIntentRecord {
        id: Some(intent.id.to_string()),
        client_secret: ClientSecret::new(client_secret),
        customer: CustomerId::new(customer),
        status: Some(intent.status.as_str().to_string()),
    })
}
