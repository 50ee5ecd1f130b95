//! The boundary between the editor and the server.
//!
//! Every server interaction is one [`Call`], answered exactly once with
//! either a JSON value or a [`TransportError`]. There are no retries.

use std::future::Future;

use serde_json::{Value, json};

use crate::error::TransportError;

/// HTTP transport backed by `reqwest`.
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpTransport;

/// Remote method storing a flat property map.
pub const SET_PROPERTIES: &str = "set-project-properties";
/// Remote method deleting every property under a prefix.
pub const DELETE_PROPERTIES_BY_PREFIX: &str = "delete-project-properties-by-prefix";

/// One request to the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `PUT` the body as JSON to `url`.
    Put {
        /// Endpoint URL.
        url: String,
        /// Sent as `X-CSRFToken` when non-empty.
        csrf_token: String,
        /// Request body.
        body: Value,
    },
    /// Named remote procedure call.
    Rpc {
        /// Method name, e.g. [`SET_PROPERTIES`].
        method: String,
        /// Parameters, sent JSON-encoded.
        params: Value,
    },
}

impl Call {
    /// `set-project-properties` for `project`.
    pub fn set_properties(project: &str, properties: Value) -> Self {
        Call::Rpc {
            method: SET_PROPERTIES.to_string(),
            params: json!({ "project": project, "properties": properties }),
        }
    }

    /// `delete-project-properties-by-prefix` for `project`.
    pub fn delete_by_prefix(project: &str, prefix: &str) -> Self {
        Call::Rpc {
            method: DELETE_PROPERTIES_BY_PREFIX.to_string(),
            params: json!({ "project": project, "prefix": prefix }),
        }
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            Call::Put { url, .. } => format!("PUT {url}"),
            Call::Rpc { method, .. } => format!("RPC {method}"),
        }
    }
}

/// Sends calls to the server.
pub trait Transport {
    /// Perform `call`, resolving once with the decoded response.
    fn call(&self, call: Call) -> impl Future<Output = Result<Value, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn call(&self, call: Call) -> impl Future<Output = Result<Value, TransportError>> {
        (**self).call(call)
    }
}
