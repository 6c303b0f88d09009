//! # setup-core
//!
//! Card setup flow for the payment page: fetch the publishable key, fetch a
//! setup intent, mount the card widget, confirm the card on submit and send
//! the customer on to registration.
//!
//! Everything that touches the outside world sits behind a trait so the
//! flow runs the same in the browser and under test:
//!
//! | Seam            | Browser implementation           |
//! |-----------------|----------------------------------|
//! | [`SetupBackend`] | `fetch` against the page origin |
//! | [`PaymentSdk`]   | Stripe.js                       |
//! | [`PageView`]     | DOM elements bound by selector  |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::rc::Rc;
//! use setup_core::{CardSetup, FlowConfig};
//!
//! let view = Rc::new(DomView::bind(&config.selectors)?);
//! let setup = CardSetup::start(&backend, StripeJs::load, view, config).await?;
//!
//! // on click:
//! setup.submit().await?;
//! ```

// Flow futures hold `Rc` handles and run on a single-threaded event loop.
#![allow(clippy::future_not_send)]

pub mod backend;
pub mod config;
pub mod error;
pub mod flow;
pub mod mock;
pub mod model;
pub mod sdk;
pub mod view;

pub use backend::SetupBackend;
pub use config::{CardStyle, ElementSelectors, FlowConfig};
pub use error::{FlowError, Result};
pub use flow::{CardSetup, fetch_public_key, fetch_setup_intent, mount_card, present_result};
pub use model::{
    ClientSecret, ConfirmOutcome, CustomerId, FlowState, PublicKey, PublicKeyResponse,
    SetupIntentRecord, SubmitOutcome,
};
pub use sdk::{FocusHook, PaymentSdk};
pub use view::{EXPAND_CLASS, FOCUSED_CLASS, HIDDEN_CLASS, PageView};
