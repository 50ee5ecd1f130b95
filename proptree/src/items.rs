//! Adding and removing map items.
//!
//! A new item is built from its container's template. Every control path and
//! nested prefix in the copy is rooted under the item's `path_prefix`, so
//! collection keeps producing globally correct keys without asking the
//! server.

use crate::{
    data::{ItemContainer, MapItem, Node, Page, page::ActionButton},
    dialog::Dialogs,
    error::ItemError,
    path::{self, AddressingMode, PathResolver},
};

/// Prompt shown when asking for a new item name.
pub const NAME_PROMPT: &str = "Please input a name";

/// Result of an add request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The item was appended; carries its path prefix.
    Added(String),
    /// The user cancelled the prompt.
    Cancelled,
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The item was removed from the page.
    Removed,
    /// The user declined the confirmation.
    Cancelled,
    /// Another delete of this item is still in flight.
    Busy,
    /// The server rejected the delete; the item is left in place.
    Failed(String),
}

/// Ask for a name and append a new item to the container with `container_prefix`.
///
/// Duplicate names (among the container's direct items) and names containing
/// the path separator are reported through [`Dialogs::alert`] and rejected
/// before the template is touched.
pub fn add_item(
    page: &mut Page,
    container_prefix: &str,
    dialogs: &mut impl Dialogs,
) -> Result<AddOutcome, ItemError> {
    let found = page
        .container_mut(container_prefix)
        .ok_or_else(|| ItemError::UnknownContainer(container_prefix.to_string()))?;
    let (container, mode) = (found.container, found.mode);

    let name = match dialogs.prompt(NAME_PROMPT) {
        Some(name) if !name.is_empty() && name != "null" => name,
        _ => return Ok(AddOutcome::Cancelled),
    };

    if let Err(e) = check_name(container, &name) {
        dialogs.alert(&e.to_string());
        return Err(e);
    }

    let item = instantiate(container, &name, mode);
    let prefix = item.path_prefix.clone();
    debug!("adding item {name} at {prefix}");
    container.items.push(item);
    page.dirty = true;
    Ok(AddOutcome::Added(prefix))
}

/// Validate a new item name against the container's direct items.
pub fn check_name(container: &ItemContainer, name: &str) -> Result<(), ItemError> {
    if container.item_names().any(|n| n == name) {
        return Err(ItemError::NameConflict(name.to_string()));
    }
    if !path::is_segment(name) {
        return Err(ItemError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Build a new expanded item from the container's template.
pub fn instantiate(container: &ItemContainer, name: &str, mode: AddressingMode) -> MapItem {
    let path_prefix = path::join(&container.prefix, name);
    let mut nodes = container.template.clone();
    rebase(&mut nodes, PathResolver::new(mode), &path_prefix);
    MapItem {
        name: name.to_string(),
        path_prefix,
        expanded: true,
        nodes,
        delete_button: ActionButton::delete(),
        status: None,
    }
}

/// Root every path and prefix under `nodes` at `prefix`.
fn rebase(nodes: &mut [Node], resolver: PathResolver, prefix: &str) {
    for node in nodes {
        match node {
            Node::Control(control) => control.path = resolver.rebase(&control.path, prefix),
            Node::Container(container) => {
                container.prefix = path::join(prefix, &container.prefix);
                for item in &mut container.items {
                    item.path_prefix = path::join(prefix, &item.path_prefix);
                    rebase(&mut item.nodes, resolver, prefix);
                }
            }
            Node::Group(group) => {
                group.id = path::join(prefix, &group.id);
                group.prefix = path::join(prefix, &group.prefix);
                rebase(&mut group.nodes, PathResolver::new(group.mode), prefix);
            }
        }
    }
}

/// Ask the user to confirm deleting the item at `path_prefix`.
pub fn confirm_delete(
    page: &Page,
    path_prefix: &str,
    dialogs: &mut impl Dialogs,
) -> Result<bool, ItemError> {
    let item = page
        .item(path_prefix)
        .ok_or_else(|| ItemError::UnknownItem(path_prefix.to_string()))?;
    Ok(dialogs.confirm(&format!("Really delete '{}'?", item.name)))
}

/// Delete an item locally after confirmation.
///
/// The deletion reaches the server with the next save of the group.
pub fn delete_item(
    page: &mut Page,
    path_prefix: &str,
    dialogs: &mut impl Dialogs,
) -> Result<DeleteOutcome, ItemError> {
    if !confirm_delete(page, path_prefix, dialogs)? {
        return Ok(DeleteOutcome::Cancelled);
    }
    page.remove_item(path_prefix)
        .ok_or_else(|| ItemError::UnknownItem(path_prefix.to_string()))?;
    page.dirty = true;
    debug!("removed item {path_prefix} locally");
    Ok(DeleteOutcome::Removed)
}

/// Expand or collapse an item's panel, returning the new state.
pub fn toggle_item(page: &mut Page, path_prefix: &str) -> Result<bool, ItemError> {
    let (container, idx) = page
        .item_mut(path_prefix)
        .ok_or_else(|| ItemError::UnknownItem(path_prefix.to_string()))?;
    let item = &mut container.items[idx];
    item.expanded = !item.expanded;
    Ok(item.expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collect::collect,
        data::{ControlGroup, PropertyControl},
        dialog::ScriptedDialogs,
    };
    use serde_json::json;

    fn page(mode: AddressingMode) -> Page {
        let template = vec![
            PropertyControl::text("host", "").into(),
            PropertyControl::number("limits.port", "25").into(),
            ItemContainer::new("aliases", vec![PropertyControl::text("to", "").into()]).into(),
        ];
        Page {
            project: "demo".into(),
            groups: vec![
                ControlGroup::new("g", mode).with_node(ItemContainer::new("top", template)),
            ],
            ..Default::default()
        }
    }

    fn control_paths(nodes: &[Node], out: &mut Vec<String>) {
        for node in nodes {
            match node {
                Node::Control(c) => out.push(c.path.clone()),
                Node::Container(c) => c.items.iter().for_each(|i| control_paths(&i.nodes, out)),
                Node::Group(g) => control_paths(&g.nodes, out),
            }
        }
    }

    #[test]
    fn test_add_prefixes_every_control() {
        let mut page = page(AddressingMode::Nested);
        let mut dialogs = ScriptedDialogs::new().answer("foo");
        let outcome = add_item(&mut page, "top", &mut dialogs).unwrap();
        assert_eq!(outcome, AddOutcome::Added("top.foo".into()));
        assert!(page.dirty);

        let item = page.item("top.foo").unwrap();
        assert!(item.expanded);
        let mut paths = Vec::new();
        control_paths(&item.nodes, &mut paths);
        assert_eq!(paths, vec!["top.foo.host", "top.foo.limits.port"]);
        assert!(page.container_mut("top.foo.aliases").is_some());

        let tree = collect(page.group("g").unwrap(), false).unwrap();
        assert_eq!(tree.get("top.foo.limits.port"), Some(&json!(25)));
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut page = page(AddressingMode::Nested);
        let mut dialogs = ScriptedDialogs::new().answer("foo").answer("foo");
        add_item(&mut page, "top", &mut dialogs).unwrap();
        let before = page.clone();
        let err = add_item(&mut page, "top", &mut dialogs).unwrap_err();
        assert_eq!(err, ItemError::NameConflict("foo".into()));
        assert_eq!(page, before);
        assert_eq!(dialogs.alerts, vec!["foo already exists."]);
    }

    #[test]
    fn test_add_dotted_name_rejected() {
        let mut page = page(AddressingMode::Nested);
        page.dirty = false;
        let mut dialogs = ScriptedDialogs::new().answer("a.b");
        let err = add_item(&mut page, "top", &mut dialogs).unwrap_err();
        assert_eq!(err, ItemError::InvalidName("a.b".into()));
        assert!(page.container_mut("top").unwrap().container.items.is_empty());
        assert!(!page.dirty);
        assert_eq!(dialogs.alerts, vec!["Invalid name, no dot is allowed."]);
    }

    #[test]
    fn test_add_cancelled() {
        let mut page = page(AddressingMode::Nested);
        let mut dialogs = ScriptedDialogs::new().cancel_prompt().answer("").answer("null");
        for _ in 0..3 {
            assert_eq!(
                add_item(&mut page, "top", &mut dialogs).unwrap(),
                AddOutcome::Cancelled
            );
        }
        assert!(!page.dirty);
        assert!(dialogs.alerts.is_empty());
    }

    #[test]
    fn test_uniqueness_only_among_direct_children() {
        let mut page = page(AddressingMode::Nested);
        let mut dialogs = ScriptedDialogs::new().answer("foo").answer("foo");
        add_item(&mut page, "top", &mut dialogs).unwrap();
        let outcome = add_item(&mut page, "top.foo.aliases", &mut dialogs).unwrap();
        assert_eq!(outcome, AddOutcome::Added("top.foo.aliases.foo".into()));
    }

    #[test]
    fn test_flat_mode_keeps_names() {
        let mut page = page(AddressingMode::Flat);
        let mut dialogs = ScriptedDialogs::new().answer("r1");
        add_item(&mut page, "top", &mut dialogs).unwrap();
        let tree = collect(page.group("g").unwrap(), false).unwrap();
        assert_eq!(tree.as_map().get("top.r1.limits.port"), Some(&json!(25)));
        assert_eq!(tree.as_map().get("top.r1.host"), Some(&json!("")));
    }

    #[test]
    fn test_unknown_container() {
        let mut page = page(AddressingMode::Nested);
        let mut dialogs = ScriptedDialogs::new().answer("x");
        assert_eq!(
            add_item(&mut page, "missing", &mut dialogs).unwrap_err(),
            ItemError::UnknownContainer("missing".into())
        );
        assert!(dialogs.questions.is_empty());
    }

    #[test]
    fn test_delete_confirmation_gate() {
        let mut page = page(AddressingMode::Nested);
        let mut dialogs = ScriptedDialogs::new().answer("foo").confirm_with(false);
        add_item(&mut page, "top", &mut dialogs).unwrap();
        page.dirty = false;
        let outcome = delete_item(&mut page, "top.foo", &mut dialogs).unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert!(page.item("top.foo").is_some());
        assert!(!page.dirty);
        assert_eq!(dialogs.questions.last().unwrap(), "Really delete 'foo'?");
    }

    #[test]
    fn test_delete_local() {
        let mut page = page(AddressingMode::Nested);
        let mut dialogs = ScriptedDialogs::new().answer("foo").confirm_with(true);
        add_item(&mut page, "top", &mut dialogs).unwrap();
        page.dirty = false;
        assert_eq!(
            delete_item(&mut page, "top.foo", &mut dialogs).unwrap(),
            DeleteOutcome::Removed
        );
        assert!(page.item("top.foo").is_none());
        assert!(page.dirty);
    }

    #[test]
    fn test_toggle() {
        let mut page = page(AddressingMode::Nested);
        let mut dialogs = ScriptedDialogs::new().answer("foo");
        add_item(&mut page, "top", &mut dialogs).unwrap();
        assert!(!toggle_item(&mut page, "top.foo").unwrap());
        assert!(toggle_item(&mut page, "top.foo").unwrap());
        assert!(toggle_item(&mut page, "nope").is_err());
    }
}
