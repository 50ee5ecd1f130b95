//! Page model and collected property trees.
//!
//! The page model stands in for the rendered editor: it holds every
//! property control, item container and control group in document order,
//! together with the UI state the controllers update (save/delete control
//! labels, inline status messages, the unsaved-changes flag).
//!
//! - [`control`] - Individual property controls and value coercion
//! - [`page`] - Page, groups, containers and map items
//! - [`tree`] - Collected property trees

/// Property controls and value coercion.
pub mod control;

/// Page, control groups, item containers and map items.
pub mod page;

/// Collected property trees.
pub mod tree;

pub use control::{PropertyControl, RawValue, ValueType};
pub use page::{
    ActionButton, ControlGroup, DeletePolicy, ItemContainer, MapItem, Node, Page, SaveTarget,
    StatusKind, StatusMessage,
};
pub use tree::PropertyTree;
