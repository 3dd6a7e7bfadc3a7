//! Generic REST adapter for providers exposed as HTTP JSON endpoints.

use crate::adapter::ProviderAdapter;
use crate::descriptor::ProviderDescriptor;
use crate::error::{AdapterError, AdapterResult};
use async_trait::async_trait;
use traceprint_core::{HttpConfig, Identifier};

/// Where the API key goes on the outbound request.
#[derive(Debug, Clone)]
pub enum KeyPlacement {
    /// Sent as a request header with the given name
    Header(String),
    /// Sent as a query parameter with the given name
    Query(String),
}

/// Adapter for providers reachable as a single GET endpoint.
///
/// The endpoint template may contain `{identifier}`, replaced with the
/// URL-encoded canonical identifier value at request time. Most hosted
/// lookup services (IPQS, AbstractAPI, HIBP) fit this shape.
pub struct RestAdapter {
    descriptor: ProviderDescriptor,
    client: reqwest::Client,
    endpoint_template: String,
    api_key: Option<String>,
    key_placement: KeyPlacement,
}

impl RestAdapter {
    /// Create a REST adapter.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(
        descriptor: ProviderDescriptor,
        http: &HttpConfig,
        endpoint_template: impl Into<String>,
        key_placement: KeyPlacement,
    ) -> AdapterResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&http.user_agent)
            .timeout(std::time::Duration::from_secs(http.request_timeout_secs))
            .build()
            .map_err(|e| AdapterError::permanent(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            descriptor,
            client,
            endpoint_template: endpoint_template.into(),
            api_key: None,
            key_placement,
        })
    }

    /// Set the API key (builder style).
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn build_url(&self, identifier: &Identifier) -> String {
        let encoded: String = identifier
            .value()
            .bytes()
            .flat_map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    vec![b as char]
                }
                _ => format!("%{b:02X}").chars().collect(),
            })
            .collect();
        self.endpoint_template.replace("{identifier}", &encoded)
    }
}

#[async_trait]
impl ProviderAdapter for RestAdapter {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn is_configured(&self) -> bool {
        !self.descriptor.requires_key || self.api_key.is_some()
    }

    async fn fetch(&self, identifier: &Identifier) -> AdapterResult<serde_json::Value> {
        let key = match (&self.api_key, self.descriptor.requires_key) {
            (Some(key), _) => Some(key.as_str()),
            (None, false) => None,
            (None, true) => {
                return Err(AdapterError::not_configured("missing API key"));
            }
        };

        let mut request = self.client.get(self.build_url(identifier));
        if let Some(key) = key {
            request = match &self.key_placement {
                KeyPlacement::Header(name) => request.header(name.as_str(), key),
                KeyPlacement::Query(param) => request.query(&[(param.as_str(), key)]),
            };
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                AdapterError::transient(format!("request failed: {e}"))
            } else {
                AdapterError::permanent(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(AdapterError::transient(format!(
                "provider returned HTTP {status}"
            )));
        }
        if !status.is_success() {
            return Err(AdapterError::permanent(format!(
                "provider returned HTTP {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AdapterError::permanent(format!("invalid JSON response: {e}")))
    }
}
