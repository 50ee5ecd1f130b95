use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::Value;

use super::{Call, Transport};
use crate::error::TransportError;

/// Header carrying the CSRF token on `PUT` requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// [`Transport`] speaking HTTP to a property server.
///
/// RPC calls are posted to `<base>/api/<method>/` with a `params` form field
/// holding the JSON-encoded parameters. `PUT` URLs starting with a scheme are
/// used as-is, others are resolved against the base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl HttpTransport {
    /// Transport with a default client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Transport using a preconfigured client (timeouts, TLS, proxies).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            csrf_token: None,
        }
    }

    /// Send `token` on every `PUT` instead of the token carried by the call.
    ///
    /// The token stays with the transport and never enters the page model.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Token sent with a `PUT` whose call carries `call_token`.
    pub fn csrf_token_for<'a>(&'a self, call_token: &'a str) -> &'a str {
        self.csrf_token.as_deref().unwrap_or(call_token)
    }

    /// Transport whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// URL of a named remote method.
    pub fn rpc_url(&self, method: &str) -> String {
        format!("{}/api/{method}/", self.base_url)
    }

    /// Resolve an endpoint against the base URL.
    pub fn endpoint_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

impl Transport for HttpTransport {
    async fn call(&self, call: Call) -> Result<Value, TransportError> {
        debug!("sending {}", call.describe());
        let request = match call {
            Call::Put {
                url,
                csrf_token,
                body,
            } => {
                let mut req = self.client.put(self.endpoint_url(&url)).json(&body);
                let token = self.csrf_token_for(&csrf_token);
                if !token.is_empty() {
                    req = req.header(CSRF_HEADER, token);
                }
                req
            }
            Call::Rpc { method, params } => self
                .client
                .post(self.rpc_url(&method))
                .form(&[("params", params.to_string())]),
        };
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        decode(response).await
    }
}

async fn decode(response: Response) -> Result<Value, TransportError> {
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            code: status.as_u16(),
            reason: status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string()),
        });
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| TransportError::Request(e.to_string()))?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
}
