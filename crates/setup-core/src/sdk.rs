//! Payment SDK Abstraction
//!
//! The slice of the processor's browser SDK the flow depends on: one card
//! element, card-setup confirmation and setup-intent retrieval.

use async_trait::async_trait;
use std::rc::Rc;

use crate::config::CardStyle;
use crate::error::Result;
use crate::model::{ClientSecret, ConfirmOutcome};

/// Called with `true` on widget focus and `false` on blur
pub type FocusHook = Rc<dyn Fn(bool)>;

/// Payment SDK client created from a public key
#[async_trait(?Send)]
pub trait PaymentSdk {
    /// Mounted card widget
    type Card;

    /// Create a card element with `style`, mount it into `container` and
    /// route its focus/blur events to `on_focus`
    fn mount_card(
        &self,
        container: &str,
        style: &CardStyle,
        on_focus: FocusHook,
    ) -> Result<Self::Card>;

    /// Confirm the setup intent with the card as payment method
    ///
    /// Card problems come back as [`ConfirmOutcome::Declined`]; `Err` is
    /// reserved for the SDK itself failing.
    async fn confirm_card_setup(
        &self,
        secret: &ClientSecret,
        card: &Self::Card,
    ) -> Result<ConfirmOutcome>;

    /// Fetch the setup intent as the SDK sees it after confirmation
    async fn retrieve_setup_intent(&self, secret: &ClientSecret) -> Result<serde_json::Value>;
}
