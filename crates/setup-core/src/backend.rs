//! Backend Abstraction
//!
//! The two endpoints the page calls before the card widget can be shown.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{PublicKey, SetupIntentRecord};

/// Backend serving the publishable key and setup intents
///
/// Futures are `!Send`: implementations run on the browser event loop.
#[async_trait(?Send)]
pub trait SetupBackend {
    /// `GET /public-key`
    async fn public_key(&self) -> Result<PublicKey>;

    /// `POST /create-setup-intent`, no request body
    async fn create_setup_intent(&self) -> Result<SetupIntentRecord>;
}
