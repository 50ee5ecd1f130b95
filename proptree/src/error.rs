//! Error types for collection, item management, transport and page files.

use thiserror::Error;

/// Validation failures raised while collecting a property tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectError {
    /// A required control has an empty value.
    #[error("{label} is required!")]
    Required {
        /// Declared path of the offending control.
        path: String,
        /// Human readable label shown to the user.
        label: String,
    },
    /// A number control holds a value that does not start with an integer.
    #[error("Invalid number for {path}")]
    InvalidNumber {
        /// Declared path of the offending control.
        path: String,
        /// Raw value found in the control.
        value: String,
    },
}

impl CollectError {
    /// Declared path of the control that failed validation.
    pub fn path(&self) -> &str {
        match self {
            CollectError::Required { path, .. } | CollectError::InvalidNumber { path, .. } => path,
        }
    }
}

/// Failures of map item operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ItemError {
    /// An item with the same name already exists in the container.
    #[error("{0} already exists.")]
    NameConflict(String),
    /// The name contains the path separator.
    #[error("Invalid name, no dot is allowed.")]
    InvalidName(String),
    /// No container is registered under the given prefix.
    #[error("no item container with prefix `{0}`")]
    UnknownContainer(String),
    /// No item is registered under the given path prefix.
    #[error("no map item with prefix `{0}`")]
    UnknownItem(String),
    /// No control group with the given id.
    #[error("no control group `{0}`")]
    UnknownGroup(String),
}

/// Failures reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("{0}")]
    Request(String),
    /// The server answered with a non-success status.
    #[error("{reason}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Reason phrase, or the code when the server supplied none.
        reason: String,
    },
    /// The response body was not valid JSON.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Failures while loading or writing a page model file.
#[derive(Debug, Error)]
pub enum PageError {
    /// Filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON page file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Malformed TOML page file.
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
    /// The page could not be rendered as TOML.
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    /// The file extension selects no known format.
    #[error("unsupported page file extension: {0:?}")]
    UnsupportedExtension(String),
}
