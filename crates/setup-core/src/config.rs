//! Flow Configuration
//!
//! Every field has a default matching the page the flow ships with, so an
//! override document only needs the fields it changes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{FlowError, Result};
use crate::model::CustomerId;

/// Endpoints, selectors and timings used by the flow
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// `GET` endpoint returning `{ "publicKey": ... }`
    pub public_key_path: String,

    /// `POST` endpoint returning a setup intent
    pub setup_intent_path: String,

    /// Redirect prefix; the customer id is appended
    pub registration_prefix: String,

    /// Delay before the result panel gets its `expand` class
    pub expand_delay_ms: u64,

    pub selectors: ElementSelectors,

    pub card_style: CardStyle,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            public_key_path: "/public-key".into(),
            setup_intent_path: "/create-setup-intent".into(),
            registration_prefix: "/registration/".into(),
            expand_delay_ms: 200,
            selectors: ElementSelectors::default(),
            card_style: CardStyle::default(),
        }
    }
}

impl FlowConfig {
    /// Parse an override document on top of the defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FlowError::Config(e.to_string()))
    }

    pub const fn expand_delay(&self) -> Duration {
        Duration::from_millis(self.expand_delay_ms)
    }

    /// Registration page for a customer whose card was set up
    pub fn registration_url(&self, customer: &CustomerId) -> String {
        format!("{}{}", self.registration_prefix, customer)
    }
}

/// CSS selectors of the page elements the flow binds to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSelectors {
    pub card_element: String,
    pub submit: String,
    pub spinner: String,
    pub button_text: String,
    pub card_errors: String,
    pub payment_form: String,
    pub result: String,
    pub result_json: String,
}

impl Default for ElementSelectors {
    fn default() -> Self {
        Self {
            card_element: "#card-element".into(),
            submit: "#submit".into(),
            spinner: "#spinner".into(),
            button_text: "#button-text".into(),
            card_errors: "#card-errors".into(),
            payment_form: ".sr-payment-form".into(),
            result: ".sr-result".into(),
            result_json: "pre".into(),
        }
    }
}

/// Style object passed to the card element, in the SDK's own shape
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardStyle {
    pub base: BaseStyle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaseStyle {
    pub font_size: String,
    pub color: String,
    pub font_family: String,
    pub font_smoothing: String,

    #[serde(rename = ":-webkit-autofill")]
    pub autofill: ColorRule,

    #[serde(rename = "::placeholder")]
    pub placeholder: ColorRule,
}

impl Default for BaseStyle {
    fn default() -> Self {
        Self {
            font_size: "15px".into(),
            color: "#32325d".into(),
            font_family: "-apple-system, BlinkMacSystemFont, Segoe UI, Roboto, sans-serif".into(),
            font_smoothing: "antialiased".into(),
            autofill: ColorRule::new("#fce883"),
            placeholder: ColorRule::new("rgba(0,0,0,0.4)"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRule {
    pub color: String,
}

impl ColorRule {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
        }
    }
}
