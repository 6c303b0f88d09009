//! Card Setup Page
//!
//! WASM entry point for the card page. Binds the page, runs the setup
//! flow against the backend and Stripe.js, and hands submit clicks to it.
//!
//! The page must load Stripe.js (`https://js.stripe.com/v3/`) before this
//! module starts.

// Flow futures hold `Rc` handles and run on a single-threaded event loop.
#![allow(clippy::future_not_send)]

mod api;
mod dom;
mod logging;
mod stripe;

pub use api::HttpBackend;
pub use dom::DomView;
pub use stripe::{CardElement, StripeJs};

use std::rc::Rc;

use setup_core::{CardSetup, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();

    let ready = dom::when_ready(|| {
        spawn_local(async {
            // Nothing is shown to the user when the page cannot start.
            match run().await {
                Ok(()) => {}
                Err(e) if e.is_fetch_error() => {
                    tracing::error!(error = %e, "Could not reach the card setup backend");
                }
                Err(e) => tracing::error!(error = %e, "Card setup did not start"),
            }
        });
    });
    if let Err(e) = ready {
        tracing::error!(error = %e, "Could not wait for the document");
    }
}

async fn run() -> Result<()> {
    let config = dom::page_config()?;
    let view = Rc::new(DomView::bind(&config.selectors)?);
    let backend = HttpBackend::from_window(&config)?;

    let setup = CardSetup::start(&backend, StripeJs::load, Rc::clone(&view), config).await?;
    let setup = Rc::new(setup);

    view.on_submit(move || {
        let setup = Rc::clone(&setup);
        spawn_local(async move {
            match setup.submit().await {
                Ok(outcome) => tracing::debug!(?outcome, "Submit handled"),
                Err(e) => tracing::error!(error = %e, "Card setup failed"),
            }
        });
    })
}
