//! Stripe.js Bindings
//!
//! Stripe.js is loaded by a `<script>` tag and exposes a global `Stripe`
//! factory. Calls go through `Reflect` so nothing here needs the script at
//! link time.

use async_trait::async_trait;
use gloo_utils::format::JsValueSerdeExt;
use js_sys::{Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use wasm_bindgen_futures::JsFuture;

use setup_core::{
    CardStyle, ClientSecret, ConfirmOutcome, FlowError, FocusHook, PaymentSdk, PublicKey, Result,
};

/// `Stripe(publicKey)` plus its elements group
pub struct StripeJs {
    stripe: JsValue,
    elements: JsValue,
}

/// Mounted card element and the listeners it calls into
pub struct CardElement {
    element: JsValue,
    _listeners: Vec<Closure<dyn FnMut()>>,
}

impl StripeJs {
    pub fn load(key: &PublicKey) -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| FlowError::Sdk("no window object".into()))?;
        let factory: Function = get(&window, "Stripe")?
            .dyn_into()
            .map_err(|_| FlowError::Sdk("Stripe.js is not loaded".into()))?;

        let stripe = factory
            .call1(&JsValue::NULL, &JsValue::from_str(key.as_str()))
            .map_err(sdk_error)?;
        let elements = method(&stripe, "elements")?
            .call0(&stripe)
            .map_err(sdk_error)?;

        Ok(Self { stripe, elements })
    }

    async fn call_with_secret(
        &self,
        name: &str,
        secret: &ClientSecret,
        data: Option<&JsValue>,
    ) -> Result<JsValue> {
        let function = method(&self.stripe, name)?;
        let secret = JsValue::from_str(secret.as_str());
        let returned = match data {
            Some(data) => function.call2(&self.stripe, &secret, data),
            None => function.call1(&self.stripe, &secret),
        }
        .map_err(sdk_error)?;

        let promise: Promise = returned
            .dyn_into()
            .map_err(|_| FlowError::Sdk(format!("{name} did not return a promise")))?;
        JsFuture::from(promise).await.map_err(sdk_error)
    }
}

#[async_trait(?Send)]
impl PaymentSdk for StripeJs {
    type Card = CardElement;

    fn mount_card(
        &self,
        container: &str,
        style: &CardStyle,
        on_focus: FocusHook,
    ) -> Result<CardElement> {
        let options = JsValue::from_serde(&serde_json::json!({ "style": style }))?;
        let element = method(&self.elements, "create")?
            .call2(&self.elements, &JsValue::from_str("card"), &options)
            .map_err(sdk_error)?;

        method(&element, "mount")?
            .call1(&element, &JsValue::from_str(container))
            .map_err(sdk_error)?;

        let on = method(&element, "on")?;
        let mut listeners = Vec::with_capacity(2);
        for (event, focused) in [("focus", true), ("blur", false)] {
            let hook = on_focus.clone();
            let listener = Closure::<dyn FnMut()>::new(move || hook(focused));
            on.call2(&element, &JsValue::from_str(event), listener.as_ref())
                .map_err(sdk_error)?;
            listeners.push(listener);
        }

        Ok(CardElement {
            element,
            _listeners: listeners,
        })
    }

    async fn confirm_card_setup(
        &self,
        secret: &ClientSecret,
        card: &CardElement,
    ) -> Result<ConfirmOutcome> {
        // { payment_method: { card } }
        let payment_method = Object::new();
        Reflect::set(&payment_method, &JsValue::from_str("card"), &card.element)
            .map_err(sdk_error)?;
        let data = Object::new();
        Reflect::set(&data, &JsValue::from_str("payment_method"), &payment_method)
            .map_err(sdk_error)?;
        let data = JsValue::from(data);

        let result = self
            .call_with_secret("confirmCardSetup", secret, Some(&data))
            .await?;

        match error_message(&result)? {
            Some(message) => Ok(ConfirmOutcome::Declined { message }),
            None => Ok(ConfirmOutcome::Confirmed),
        }
    }

    async fn retrieve_setup_intent(&self, secret: &ClientSecret) -> Result<serde_json::Value> {
        let result = self
            .call_with_secret("retrieveSetupIntent", secret, None)
            .await?;

        if let Some(message) = error_message(&result)? {
            return Err(FlowError::Sdk(message));
        }

        Ok(get(&result, "setupIntent")?.into_serde()?)
    }
}

/// `result.error.message` when the SDK reported an error
fn error_message(result: &JsValue) -> Result<Option<String>> {
    let error = get(result, "error")?;
    if error.is_undefined() || error.is_null() {
        return Ok(None);
    }
    Ok(Some(describe(&error)))
}

fn get(target: &JsValue, key: &str) -> Result<JsValue> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(sdk_error)
}

fn method(target: &JsValue, name: &str) -> Result<Function> {
    get(target, name)?
        .dyn_into()
        .map_err(|_| FlowError::Sdk(format!("Stripe.js has no `{name}`")))
}

fn sdk_error(value: JsValue) -> FlowError {
    FlowError::Sdk(describe(&value))
}

/// Best readable text for a thrown value or an SDK error object
pub(crate) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
