//! # proptree
//!
//! Property-tree model and server synchronization for project configuration
//! editors.
//!
//! A configuration page is a set of typed property controls spread across
//! nested panels. `proptree` keeps that page as an explicit model, collects
//! it into a property tree, manages named sub-trees ("map items") and keeps
//! the server in sync through save and delete operations.
//!
//! ## Features
//!
//! - Two addressing conventions: nested dotted paths or flat prefixed keys
//! - Typed collection with integer and checkbox coercion
//! - Required-field validation with first-failure reporting
//! - Map items added from templates with automatic path rebasing
//! - Local or immediate remote deletion of items
//! - Per-group save lock, inline success/error state
//! - REST (`PUT`) and RPC (`POST /api/<method>/`) transports over HTTP
//!
//! ## Quick Start
//!
//! ```rust
//! use proptree::{
//!     collect::collect,
//!     data::{ControlGroup, PropertyControl},
//!     path::AddressingMode,
//! };
//!
//! let group = ControlGroup::new("smtp", AddressingMode::Nested)
//!     .with_node(PropertyControl::text("smtp.host", "mail.example.com"))
//!     .with_node(PropertyControl::number("smtp.port", "25"));
//!
//! let tree = collect(&group, true).unwrap();
//! assert_eq!(tree.get("smtp.port"), Some(&serde_json::json!(25)));
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Page model, controls and property trees
//! - [`path`] - Path resolution and addressing modes
//! - [`collect`] - Tree collection
//! - [`items`] - Map item management
//! - [`hydrate`] - Loading stored properties into a page
//! - [`sync`] - Save/delete synchronization
//! - [`transport`] - Server boundary and HTTP transport
//! - [`dialog`] - User dialog boundary

#[macro_use]
extern crate log;

/// Page model, property controls and collected trees.
pub mod data;

/// Error types.
pub mod error;

/// Path resolution for nested and flat addressing.
pub mod path;

/// Collection of control groups into property trees.
pub mod collect;

/// Adding, deleting and toggling map items.
pub mod items;

/// Loading stored properties into a page.
pub mod hydrate;

/// Save and delete synchronization.
///
/// [`sync::Editor`] ties the page model to a transport and to user dialogs.
pub mod sync;

/// The server boundary.
pub mod transport;

/// The user dialog boundary.
pub mod dialog;

pub use data::{Page, PropertyTree};
pub use dialog::{Dialogs, ScriptedDialogs};
pub use error::{CollectError, ItemError, PageError, TransportError};
pub use path::AddressingMode;
pub use sync::{Editor, SaveOutcome};
pub use transport::{Call, Transport};
