//! Page View Binding
//!
//! Named accessors over the page elements. Implementations look every
//! element up once when they are bound, so a missing element is reported
//! before the flow starts instead of at the call site that needs it.

use std::time::Duration;

use crate::error::Result;

pub trait PageView {
    /// Loading on: button disabled, spinner shown, button text hidden.
    /// Loading off reverses all three.
    fn set_loading(&self, loading: bool) -> Result<()>;

    /// Toggle the `focused` class on the card container
    fn set_card_focused(&self, focused: bool) -> Result<()>;

    /// Replace the card error text
    fn show_card_error(&self, message: &str) -> Result<()>;

    /// Hide the payment form, reveal the result panel and show `json` in it
    fn show_result(&self, json: &str) -> Result<()>;

    /// Add the `expand` class to the result panel once `delay` has passed
    fn schedule_expand(&self, delay: Duration) -> Result<()>;

    /// Navigate the browser to `url`
    fn redirect(&self, url: &str) -> Result<()>;
}

/// Class toggled on the card container while the widget has focus
pub const FOCUSED_CLASS: &str = "focused";

/// Class added to the result panel after the expand delay
pub const EXPAND_CLASS: &str = "expand";

/// Class that hides an element
pub const HIDDEN_CLASS: &str = "hidden";
