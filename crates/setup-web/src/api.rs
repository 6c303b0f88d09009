//! API Client

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use setup_core::{
    FlowConfig, FlowError, PublicKey, PublicKeyResponse, Result, SetupBackend, SetupIntentRecord,
};

/// Backend on the page's own origin
pub struct HttpBackend {
    client: reqwest::Client,
    origin: String,
    public_key_path: String,
    setup_intent_path: String,
}

impl HttpBackend {
    pub fn new(origin: impl Into<String>, config: &FlowConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin: origin.into(),
            public_key_path: config.public_key_path.clone(),
            setup_intent_path: config.setup_intent_path.clone(),
        }
    }

    /// Backend at `window.location.origin`
    pub fn from_window(config: &FlowConfig) -> Result<Self> {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .ok_or_else(|| FlowError::Config("page origin unavailable".into()))?;
        Ok(Self::new(origin, config))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response, path: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(FlowError::Http {
            status: status.as_u16(),
            path: path.to_string(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| FlowError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl SetupBackend for HttpBackend {
    async fn public_key(&self) -> Result<PublicKey> {
        let response = self
            .client
            .get(self.url(&self.public_key_path))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| FlowError::Network(e.to_string()))?;

        let body: PublicKeyResponse = decode(response, &self.public_key_path).await?;
        Ok(body.public_key)
    }

    async fn create_setup_intent(&self) -> Result<SetupIntentRecord> {
        let response = self
            .client
            .post(self.url(&self.setup_intent_path))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| FlowError::Network(e.to_string()))?;

        decode(response, &self.setup_intent_path).await
    }
}
