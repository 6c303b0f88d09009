//! Application State

use std::sync::Arc;

use setup_payments::StripeClient;

/// Shared application state
#[derive(Clone, Default)]
pub struct AppState {
    /// Stripe client (optional - None if not configured)
    pub stripe: Option<Arc<StripeClient>>,
}
