//! DOM View
//!
//! Binds the card page's elements once and exposes them through
//! [`PageView`].

use gloo_timers::callback::Timeout;
use std::time::Duration;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{Document, Element, Event, HtmlButtonElement, Window};

use setup_core::{
    EXPAND_CLASS, ElementSelectors, FOCUSED_CLASS, FlowConfig, FlowError, HIDDEN_CLASS, PageView,
    Result,
};

use crate::stripe::describe;

/// Id of the optional JSON block overriding [`FlowConfig`] defaults
pub const CONFIG_ELEMENT_ID: &str = "card-setup-config";

pub struct DomView {
    window: Window,
    card_element: Element,
    submit: HtmlButtonElement,
    spinner: Element,
    button_text: Element,
    card_errors: Element,
    payment_form: Element,
    result: Element,
    result_json: Element,
}

impl DomView {
    /// Look up every element the flow touches
    ///
    /// Fails with [`FlowError::MissingElement`] naming a selector that
    /// matches nothing, before any request is made.
    pub fn bind(selectors: &ElementSelectors) -> Result<Self> {
        let window = window()?;
        let document = document(&window)?;
        let find = |selector: &str| {
            document
                .query_selector(selector)
                .ok()
                .flatten()
                .ok_or_else(|| FlowError::MissingElement(selector.to_string()))
        };

        let submit = find(selectors.submit.as_str())?
            .dyn_into::<HtmlButtonElement>()
            .map_err(|_| FlowError::MissingElement(format!("{} (button)", selectors.submit)))?;

        Ok(Self {
            card_element: find(selectors.card_element.as_str())?,
            submit,
            spinner: find(selectors.spinner.as_str())?,
            button_text: find(selectors.button_text.as_str())?,
            card_errors: find(selectors.card_errors.as_str())?,
            payment_form: find(selectors.payment_form.as_str())?,
            result: find(selectors.result.as_str())?,
            result_json: find(selectors.result_json.as_str())?,
            window,
        })
    }

    /// Call `handler` on every click of the submit button, with the form's
    /// default submission suppressed
    ///
    /// The page ships the button disabled; it is enabled here once the
    /// handler is attached.
    pub fn on_submit(&self, handler: impl Fn() + 'static) -> Result<()> {
        let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            event.prevent_default();
            handler();
        });
        self.submit
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        // The button lives as long as the page.
        listener.forget();
        self.submit.set_disabled(false);
        Ok(())
    }
}

impl PageView for DomView {
    fn set_loading(&self, loading: bool) -> Result<()> {
        self.submit.set_disabled(loading);
        toggle(&self.spinner, HIDDEN_CLASS, !loading)?;
        toggle(&self.button_text, HIDDEN_CLASS, loading)
    }

    fn set_card_focused(&self, focused: bool) -> Result<()> {
        toggle(&self.card_element, FOCUSED_CLASS, focused)
    }

    fn show_card_error(&self, message: &str) -> Result<()> {
        self.card_errors.set_text_content(Some(message));
        Ok(())
    }

    fn show_result(&self, json: &str) -> Result<()> {
        toggle(&self.payment_form, HIDDEN_CLASS, true)?;
        toggle(&self.result, HIDDEN_CLASS, false)?;
        self.result_json.set_text_content(Some(json));
        Ok(())
    }

    fn schedule_expand(&self, delay: Duration) -> Result<()> {
        let result = self.result.clone();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || {
            if let Err(e) = result.class_list().add_1(EXPAND_CLASS) {
                tracing::warn!(error = %describe(&e), "Could not expand result panel");
            }
        })
        .forget();
        Ok(())
    }

    fn redirect(&self, url: &str) -> Result<()> {
        self.window
            .location()
            .set_href(url)
            .map_err(|e| FlowError::Navigation(describe(&e)))
    }
}

/// Defaults, overridden by `<script id="card-setup-config" type="application/json">`
/// when the page carries one
pub fn page_config() -> Result<FlowConfig> {
    let document = document(&window()?)?;
    match document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    {
        Some(json) if !json.trim().is_empty() => FlowConfig::from_json(&json),
        _ => Ok(FlowConfig::default()),
    }
}

/// Run `f` once the document has been parsed
pub fn when_ready(f: impl FnOnce() + 'static) -> Result<()> {
    let document = document(&window()?)?;
    if document.ready_state() != "loading" {
        f();
        return Ok(());
    }

    let listener = Closure::once_into_js(f);
    document
        .add_event_listener_with_callback("DOMContentLoaded", listener.unchecked_ref())
        .map_err(dom_error)
}

fn toggle(element: &Element, class: &str, on: bool) -> Result<()> {
    let classes = element.class_list();
    if on {
        classes.add_1(class)
    } else {
        classes.remove_1(class)
    }
    .map_err(dom_error)
}

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| FlowError::Dom("no window object".into()))
}

fn document(window: &Window) -> Result<Document> {
    window
        .document()
        .ok_or_else(|| FlowError::Dom("no document".into()))
}

fn dom_error(value: JsValue) -> FlowError {
    FlowError::Dom(describe(&value))
}
