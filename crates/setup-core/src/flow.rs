//! Card Setup Flow
//!
//! The page runs five steps strictly in order:
//!
//! ```text
//! fetch_public_key ─▶ fetch_setup_intent ─▶ mount_card ─▶ submit ─▶ present_result
//!                                               ▲           │
//!                                               └─ declined ┘
//! ```
//!
//! [`CardSetup::start`] runs the first three and returns only once the card
//! widget is mounted, so a submit handler can only be bound to a mounted
//! card. Values produced by one step are passed to the next explicitly.

use std::cell::Cell;
use std::rc::Rc;

use crate::backend::SetupBackend;
use crate::config::FlowConfig;
use crate::error::Result;
use crate::model::{
    ClientSecret, ConfirmOutcome, CustomerId, FlowState, PublicKey, SetupIntentRecord,
    SubmitOutcome,
};
use crate::sdk::{FocusHook, PaymentSdk};
use crate::view::PageView;

/// Fetch the publishable key
pub async fn fetch_public_key<B: SetupBackend + ?Sized>(backend: &B) -> Result<PublicKey> {
    let key = backend.public_key().await?;
    tracing::debug!("Fetched public key");
    Ok(key)
}

/// Ask the backend for a fresh setup intent
pub async fn fetch_setup_intent<B: SetupBackend + ?Sized>(
    backend: &B,
    key: &PublicKey,
) -> Result<SetupIntentRecord> {
    let intent = backend.create_setup_intent().await?;
    tracing::debug!(
        setup_intent = ?intent.id,
        customer = %intent.customer,
        live = !key.as_str().starts_with("pk_test_"),
        "Created setup intent"
    );
    Ok(intent)
}

/// Mount the card widget and tie its focus state to the container class
pub fn mount_card<S, V>(sdk: &S, view: &Rc<V>, config: &FlowConfig) -> Result<S::Card>
where
    S: PaymentSdk,
    V: PageView + 'static,
{
    let focus_view = Rc::clone(view);
    let on_focus: FocusHook = Rc::new(move |focused| {
        if let Err(e) = focus_view.set_card_focused(focused) {
            tracing::warn!(error = %e, "Could not update card focus class");
        }
    });

    let card = sdk.mount_card(&config.selectors.card_element, &config.card_style, on_focus)?;
    tracing::debug!(container = %config.selectors.card_element, "Mounted card element");
    Ok(card)
}

/// Show the confirmed setup intent and send the browser to registration
///
/// The `expand` class is scheduled before the redirect but the redirect is
/// not delayed for it, so navigation usually wins and the class is never
/// seen.
pub async fn present_result<S, V>(
    sdk: &S,
    view: &V,
    secret: &ClientSecret,
    customer: &CustomerId,
    config: &FlowConfig,
) -> Result<String>
where
    S: PaymentSdk + ?Sized,
    V: PageView + ?Sized,
{
    let intent = sdk.retrieve_setup_intent(secret).await?;
    let json = serde_json::to_string_pretty(&intent)?;

    view.show_result(&json)?;
    view.schedule_expand(config.expand_delay())?;

    let url = config.registration_url(customer);
    tracing::info!(customer = %customer, url = %url, "Card set up, redirecting");
    view.redirect(&url)?;

    view.set_loading(false)?;
    Ok(url)
}

/// A mounted card form waiting for the user to submit
pub struct CardSetup<S: PaymentSdk, V: PageView> {
    sdk: S,
    card: S::Card,
    view: Rc<V>,
    intent: SetupIntentRecord,
    config: FlowConfig,
    state: Cell<FlowState>,
}

impl<S, V> CardSetup<S, V>
where
    S: PaymentSdk,
    V: PageView + 'static,
{
    /// Fetch the key and setup intent, create the SDK with `connect`, and
    /// mount the card widget
    pub async fn start<B, F>(backend: &B, connect: F, view: Rc<V>, config: FlowConfig) -> Result<Self>
    where
        B: SetupBackend + ?Sized,
        F: FnOnce(&PublicKey) -> Result<S>,
    {
        log_state(FlowState::AwaitingKey);
        let key = fetch_public_key(backend).await?;

        log_state(FlowState::AwaitingSetupIntent);
        let intent = fetch_setup_intent(backend, &key).await?;

        let sdk = connect(&key)?;
        let card = mount_card(&sdk, &view, &config)?;
        log_state(FlowState::Mounted);

        Ok(Self {
            sdk,
            card,
            view,
            intent,
            config,
            state: Cell::new(FlowState::Mounted),
        })
    }

    pub fn state(&self) -> FlowState {
        self.state.get()
    }

    pub const fn intent(&self) -> &SetupIntentRecord {
        &self.intent
    }

    /// Submit button handler
    ///
    /// Loading is switched on before the SDK is called. A decline switches
    /// it off again, shows the message and leaves the form ready for
    /// another attempt.
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        if self.state.get() != FlowState::Mounted {
            tracing::debug!(state = self.state.get().as_str(), "Ignoring submit");
            return Ok(SubmitOutcome::Ignored);
        }

        self.enter(FlowState::Submitting);
        self.view.set_loading(true)?;

        let outcome = match self
            .sdk
            .confirm_card_setup(&self.intent.client_secret, &self.card)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Card setup confirmation failed");
                self.enter(FlowState::Mounted);
                self.view.set_loading(false)?;
                return Err(e);
            }
        };

        match outcome {
            ConfirmOutcome::Declined { message } => {
                tracing::warn!(message = %message, "Card setup declined");
                self.enter(FlowState::Mounted);
                self.view.set_loading(false)?;
                self.view.show_card_error(&message)?;
                Ok(SubmitOutcome::Declined(message))
            }
            ConfirmOutcome::Confirmed => {
                self.enter(FlowState::Redirecting);
                let url = present_result(
                    &self.sdk,
                    self.view.as_ref(),
                    &self.intent.client_secret,
                    &self.intent.customer,
                    &self.config,
                )
                .await?;
                Ok(SubmitOutcome::Redirected(url))
            }
        }
    }

    fn enter(&self, state: FlowState) {
        self.state.set(state);
        log_state(state);
    }
}

fn log_state(state: FlowState) {
    tracing::trace!(state = state.as_str(), "Card setup state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;
    use crate::mock::{Entry, Journal, MockBackend, MockSdk, RecordingView};

    const SECRET: &str = "seti_123_secret_abc";
    const CUSTOMER: &str = "cus_456";

    struct Harness {
        journal: Journal,
        sdk: MockSdk,
        view: Rc<RecordingView>,
        backend: MockBackend,
    }

    fn harness() -> Harness {
        let journal = Journal::default();
        Harness {
            sdk: MockSdk::new(journal.clone()),
            view: Rc::new(RecordingView::new(journal.clone())),
            backend: MockBackend::new("pk_test_abc", SECRET, CUSTOMER),
            journal,
        }
    }

    async fn started(h: &Harness) -> CardSetup<MockSdk, RecordingView> {
        let sdk = h.sdk.clone();
        CardSetup::start(
            &h.backend,
            move |_| Ok(sdk),
            Rc::clone(&h.view),
            FlowConfig::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_start_mounts_card_with_fetched_key() {
        let h = harness();
        let setup = started(&h).await;

        assert_eq!(setup.state(), FlowState::Mounted);
        assert_eq!(setup.intent().customer.as_str(), CUSTOMER);
        assert_eq!(
            h.journal.entries(),
            vec![Entry::CardMounted("#card-element".into())]
        );
    }

    #[tokio::test]
    async fn test_connect_receives_public_key() {
        let h = harness();
        let sdk = h.sdk.clone();
        let mut seen = None;
        CardSetup::start(
            &h.backend,
            |key: &PublicKey| {
                seen = Some(key.clone());
                Ok(sdk)
            },
            Rc::clone(&h.view),
            FlowConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(seen, Some(PublicKey::new("pk_test_abc")));
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_before_mount() {
        let h = harness();
        let backend = h.backend.clone().failing_setup_intent(FlowError::Http {
            status: 500,
            path: "/create-setup-intent".into(),
        });
        let sdk = h.sdk.clone();

        let result =
            CardSetup::start(&backend, move |_| Ok(sdk), Rc::clone(&h.view), FlowConfig::default())
                .await;

        assert!(matches!(result, Err(FlowError::Http { status: 500, .. })));
        assert!(h.journal.entries().is_empty());
    }

    #[tokio::test]
    async fn test_loading_set_before_confirmation() {
        let h = harness();
        let setup = started(&h).await;
        setup.submit().await.unwrap();

        let entries = h.journal.entries();
        let loading = entries.iter().position(|e| *e == Entry::Loading(true)).unwrap();
        let confirm = entries
            .iter()
            .position(|e| matches!(e, Entry::ConfirmStarted(_)))
            .unwrap();
        assert!(loading < confirm);
    }

    #[tokio::test]
    async fn test_success_redirects_to_registration() {
        let h = harness();
        let setup = started(&h).await;

        let outcome = setup.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Redirected("/registration/cus_456".into()));
        assert_eq!(h.view.redirected_to().as_deref(), Some("/registration/cus_456"));
        assert_eq!(
            h.journal.entries()[1..],
            [
                Entry::Loading(true),
                Entry::ConfirmStarted(SECRET.into()),
                Entry::Retrieved(SECRET.into()),
                Entry::ResultShown,
                Entry::ExpandScheduled(200),
                Entry::Redirect("/registration/cus_456".into()),
                Entry::Loading(false),
            ]
        );
        assert!(!h.view.is_loading());
        assert_eq!(setup.state(), FlowState::Redirecting);
    }

    #[tokio::test]
    async fn test_result_json_is_pretty_printed() {
        let h = harness();
        let setup = started(&h).await;
        setup.submit().await.unwrap();

        let json = h.view.result_json().unwrap();
        assert!(json.starts_with("{\n  \""));
        assert!(json.contains("\"status\": \"succeeded\""));
    }

    #[tokio::test]
    async fn test_decline_shows_message_and_resets_loading() {
        let h = harness();
        h.sdk.decline_next("Your card number is incomplete.");
        let setup = started(&h).await;

        let outcome = setup.submit().await.unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Declined("Your card number is incomplete.".into())
        );
        assert_eq!(h.view.card_error(), "Your card number is incomplete.");
        assert!(!h.view.is_loading());
        assert!(!h.view.result_visible());
        assert!(h.view.form_visible());
        assert_eq!(h.view.redirected_to(), None);
        assert_eq!(setup.state(), FlowState::Mounted);
    }

    #[tokio::test]
    async fn test_retry_after_decline() {
        let h = harness();
        h.sdk.decline_next("Your card was declined.");
        let setup = started(&h).await;

        setup.submit().await.unwrap();
        let outcome = setup.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Redirected("/registration/cus_456".into()));
        assert!(h.view.result_visible());
        assert!(!h.view.form_visible());
    }

    #[tokio::test]
    async fn test_sdk_failure_resets_loading() {
        let h = harness();
        h.sdk.fail_next(FlowError::Sdk("network down".into()));
        let setup = started(&h).await;

        let err = setup.submit().await.unwrap_err();

        assert_eq!(err, FlowError::Sdk("network down".into()));
        assert!(!h.view.is_loading());
        assert_eq!(h.view.card_error(), "");
        assert_eq!(setup.state(), FlowState::Mounted);
    }

    #[tokio::test]
    async fn test_submit_ignored_after_redirect() {
        let h = harness();
        let setup = started(&h).await;
        setup.submit().await.unwrap();

        let outcome = setup.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Ignored);
        let confirms = h
            .journal
            .entries()
            .iter()
            .filter(|e| matches!(e, Entry::ConfirmStarted(_)))
            .count();
        assert_eq!(confirms, 1);
    }

    #[tokio::test]
    async fn test_focus_and_blur_toggle_single_class() {
        let h = harness();
        let _setup = started(&h).await;

        h.sdk.emit_focus(true);
        h.sdk.emit_focus(true);
        assert_eq!(h.view.card_classes(), vec!["focused".to_string()]);

        h.sdk.emit_focus(false);
        assert!(h.view.card_classes().is_empty());

        h.sdk.emit_focus(false);
        assert!(h.view.card_classes().is_empty());
    }

    #[tokio::test]
    async fn test_present_result_uses_given_customer() {
        let h = harness();
        let config = FlowConfig {
            registration_prefix: "/signup/".into(),
            ..FlowConfig::default()
        };

        let url = present_result(
            &h.sdk,
            h.view.as_ref(),
            &ClientSecret::new(SECRET),
            &CustomerId::new("cus_789"),
            &config,
        )
        .await
        .unwrap();

        assert_eq!(url, "/signup/cus_789");
    }
}
