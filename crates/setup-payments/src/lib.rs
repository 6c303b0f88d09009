//! # setup-payments
//!
//! Stripe side of the card setup page.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  POST /create-setup-intent  ┌──────────────┐
//! │  Card page   │────────────────────────────▶│   Backend    │──▶ Customer + SetupIntent
//! │ (Stripe.js)  │◀──── client_secret, customer│              │
//! └──────┬───────┘                             └──────▲───────┘
//!        │ confirmCardSetup                           │ setup_intent.succeeded
//!        ▼                                            │
//! ┌──────────────┐                                    │
//! │    Stripe    │────────────── webhook ─────────────┘
//! └──────────────┘
//! ```
//!
//! Card details go straight from the Elements iframe to Stripe; the
//! backend only ever sees ids and the client secret.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use setup_payments::StripeClient;
//!
//! let client = StripeClient::from_env()?;
//! let record = client.create_setup_intent().await?;
//!
//! // Respond with `record` as JSON
//! ```

mod error;
mod setup_intent;
mod webhook;

pub use error::{PaymentError, Result};
pub use setup_intent::{StripeClient, to_record};
pub use webhook::{WebhookEvent, WebhookHandler};
