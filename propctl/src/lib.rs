//! # propctl
//!
//! Command line editor for project property trees.
//!
//! `propctl` keeps a configuration page as a JSON or TOML model file and
//! drives the [`proptree`] editor against a property server: inspecting and
//! collecting groups, editing values, adding and deleting map items and
//! saving groups over REST or RPC.
//!
//! ## Modules
//!
//! - [`commands`] - Command implementations
//! - [`ctx`] - Application context and state management
//! - [`term`] - Terminal prompts and confirmations
//! - [`utils`] - Common utilities and helper functions
//!
//! ## Example
//!
//! ```rust,no_run
//! // propctl is primarily used as a CLI tool
//! // See the binary target for usage examples
//! ```

/// Command implementations.
pub mod commands;

/// Application context and state management.
pub mod ctx;

/// Terminal dialogs.
///
/// Reads names and confirmations from the terminal, or takes them
/// from the command line for unattended runs.
pub mod term;

/// Common utilities and helper functions.
pub mod utils;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
