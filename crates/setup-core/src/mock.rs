//! Mock Backend, SDK and View
//!
//! Scripted stand-ins for running the flow off the browser. The SDK and
//! the view write to one shared [`Journal`] so tests can assert the order
//! in which the page and the SDK were touched.

use async_trait::async_trait;
use serde_json::json;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::backend::SetupBackend;
use crate::config::CardStyle;
use crate::error::{FlowError, Result};
use crate::model::{ClientSecret, ConfirmOutcome, CustomerId, PublicKey, SetupIntentRecord};
use crate::sdk::{FocusHook, PaymentSdk};
use crate::view::{FOCUSED_CLASS, PageView};

/// Something the SDK or the page did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    CardMounted(String),
    ConfirmStarted(String),
    Retrieved(String),
    Loading(bool),
    CardError(String),
    ResultShown,
    ExpandScheduled(u64),
    Redirect(String),
}

/// Shared, ordered log of [`Entry`] values
#[derive(Clone, Debug, Default)]
pub struct Journal(Rc<RefCell<Vec<Entry>>>);

impl Journal {
    pub fn record(&self, entry: Entry) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.0.borrow().clone()
    }
}

/// Backend answering from fixed values
#[derive(Clone, Debug)]
pub struct MockBackend {
    key: PublicKey,
    intent: SetupIntentRecord,
    key_error: Option<FlowError>,
    intent_error: Option<FlowError>,
}

impl MockBackend {
    pub fn new(key: &str, client_secret: &str, customer: &str) -> Self {
        Self {
            key: PublicKey::new(key),
            intent: SetupIntentRecord {
                id: Some("seti_mock".into()),
                client_secret: ClientSecret::new(client_secret),
                customer: CustomerId::new(customer),
                status: Some("requires_payment_method".into()),
            },
            key_error: None,
            intent_error: None,
        }
    }

    #[must_use]
    pub fn failing_public_key(mut self, err: FlowError) -> Self {
        self.key_error = Some(err);
        self
    }

    #[must_use]
    pub fn failing_setup_intent(mut self, err: FlowError) -> Self {
        self.intent_error = Some(err);
        self
    }
}

#[async_trait(?Send)]
impl SetupBackend for MockBackend {
    async fn public_key(&self) -> Result<PublicKey> {
        match &self.key_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.key.clone()),
        }
    }

    async fn create_setup_intent(&self) -> Result<SetupIntentRecord> {
        match &self.intent_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.intent.clone()),
        }
    }
}

#[derive(Default)]
struct SdkState {
    focus: RefCell<Option<FocusHook>>,
    outcomes: RefCell<VecDeque<Result<ConfirmOutcome>>>,
}

/// SDK that confirms every card unless told otherwise
///
/// Clones share state, so a test can keep a handle after the flow takes
/// ownership of the SDK.
#[derive(Clone)]
pub struct MockSdk {
    journal: Journal,
    state: Rc<SdkState>,
}

/// Card handle returned by [`MockSdk::mount_card`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockCard {
    pub container: String,
}

impl MockSdk {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            state: Rc::new(SdkState::default()),
        }
    }

    /// Next confirmation reports a card error with `message`
    pub fn decline_next(&self, message: &str) {
        self.state.outcomes.borrow_mut().push_back(Ok(ConfirmOutcome::Declined {
            message: message.into(),
        }));
    }

    /// Next confirmation fails inside the SDK
    pub fn fail_next(&self, err: FlowError) {
        self.state.outcomes.borrow_mut().push_back(Err(err));
    }

    /// Fire a focus (`true`) or blur (`false`) event on the mounted card
    pub fn emit_focus(&self, focused: bool) {
        let hook = self.state.focus.borrow().clone();
        if let Some(hook) = hook {
            hook(focused);
        }
    }
}

#[async_trait(?Send)]
impl PaymentSdk for MockSdk {
    type Card = MockCard;

    fn mount_card(
        &self,
        container: &str,
        _style: &CardStyle,
        on_focus: FocusHook,
    ) -> Result<MockCard> {
        *self.state.focus.borrow_mut() = Some(on_focus);
        self.journal.record(Entry::CardMounted(container.into()));
        Ok(MockCard {
            container: container.into(),
        })
    }

    async fn confirm_card_setup(
        &self,
        secret: &ClientSecret,
        _card: &MockCard,
    ) -> Result<ConfirmOutcome> {
        self.journal.record(Entry::ConfirmStarted(secret.as_str().into()));
        self.state
            .outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(ConfirmOutcome::Confirmed))
    }

    async fn retrieve_setup_intent(&self, secret: &ClientSecret) -> Result<serde_json::Value> {
        self.journal.record(Entry::Retrieved(secret.as_str().into()));
        Ok(json!({
            "id": "seti_mock",
            "object": "setup_intent",
            "client_secret": secret.as_str(),
            "payment_method": "pm_card_visa",
            "status": "succeeded",
            "usage": "off_session",
        }))
    }
}

#[derive(Debug)]
struct PageState {
    loading: bool,
    card_classes: Vec<String>,
    card_error: String,
    form_visible: bool,
    result_visible: bool,
    result_json: Option<String>,
    redirected_to: Option<String>,
}

/// In-memory page that starts with the form visible and the result hidden
#[derive(Debug)]
pub struct RecordingView {
    journal: Journal,
    page: RefCell<PageState>,
}

impl RecordingView {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            page: RefCell::new(PageState {
                loading: false,
                card_classes: Vec::new(),
                card_error: String::new(),
                form_visible: true,
                result_visible: false,
                result_json: None,
                redirected_to: None,
            }),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.page.borrow().loading
    }

    pub fn card_classes(&self) -> Vec<String> {
        self.page.borrow().card_classes.clone()
    }

    pub fn card_error(&self) -> String {
        self.page.borrow().card_error.clone()
    }

    pub fn form_visible(&self) -> bool {
        self.page.borrow().form_visible
    }

    pub fn result_visible(&self) -> bool {
        self.page.borrow().result_visible
    }

    pub fn result_json(&self) -> Option<String> {
        self.page.borrow().result_json.clone()
    }

    pub fn redirected_to(&self) -> Option<String> {
        self.page.borrow().redirected_to.clone()
    }
}

impl PageView for RecordingView {
    fn set_loading(&self, loading: bool) -> Result<()> {
        self.page.borrow_mut().loading = loading;
        self.journal.record(Entry::Loading(loading));
        Ok(())
    }

    fn set_card_focused(&self, focused: bool) -> Result<()> {
        // Same semantics as classList.add/remove.
        let mut page = self.page.borrow_mut();
        let classes = &mut page.card_classes;
        let present = classes.iter().any(|c| c == FOCUSED_CLASS);
        if focused && !present {
            classes.push(FOCUSED_CLASS.into());
        } else if !focused {
            classes.retain(|c| c != FOCUSED_CLASS);
        }
        Ok(())
    }

    fn show_card_error(&self, message: &str) -> Result<()> {
        self.page.borrow_mut().card_error = message.into();
        self.journal.record(Entry::CardError(message.into()));
        Ok(())
    }

    fn show_result(&self, json: &str) -> Result<()> {
        let mut page = self.page.borrow_mut();
        page.form_visible = false;
        page.result_visible = true;
        page.result_json = Some(json.into());
        self.journal.record(Entry::ResultShown);
        Ok(())
    }

    fn schedule_expand(&self, delay: Duration) -> Result<()> {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.journal.record(Entry::ExpandScheduled(millis));
        Ok(())
    }

    fn redirect(&self, url: &str) -> Result<()> {
        self.page.borrow_mut().redirected_to = Some(url.into());
        self.journal.record(Entry::Redirect(url.into()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_errors() {
        let backend = MockBackend::new("pk_test_1", "seti_1_secret_x", "cus_1")
            .failing_public_key(FlowError::Network("offline".into()));

        let err = backend.public_key().await.unwrap_err();
        assert_eq!(err, FlowError::Network("offline".into()));
        assert!(backend.create_setup_intent().await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_sdk_scripted_outcomes_in_order() {
        let sdk = MockSdk::new(Journal::default());
        let card = MockCard {
            container: "#card-element".into(),
        };
        let secret = ClientSecret::new("seti_1_secret_x");
        sdk.decline_next("first");

        let first = sdk.confirm_card_setup(&secret, &card).await.unwrap();
        let second = sdk.confirm_card_setup(&secret, &card).await.unwrap();

        assert_eq!(first, ConfirmOutcome::Declined { message: "first".into() });
        assert_eq!(second, ConfirmOutcome::Confirmed);
    }
}
