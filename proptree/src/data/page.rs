use std::{fs, path::Path, time::SystemTime};

use serde::{Deserialize, Serialize};

use crate::{
    data::control::PropertyControl,
    error::PageError,
    path::{AddressingMode, PathResolver},
};

/// Idle label of a save control.
pub const SAVE_LABEL: &str = "Save";
/// Label of a save control while its request is in flight.
pub const SAVING_LABEL: &str = "Saving...";
/// Idle label of an item's delete control.
pub const DELETE_LABEL: &str = "Delete";
/// Label of a delete control while its request is in flight.
pub const DELETING_LABEL: &str = "Deleting...";

/// The whole editable page: every group, plus page-wide UI state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Project whose properties the page edits.
    #[serde(default)]
    pub project: String,
    /// Whether there are unsaved changes.
    #[serde(default)]
    pub dirty: bool,
    /// Path of the control focused by the last validation failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    /// Top-level control groups.
    #[serde(default)]
    pub groups: Vec<ControlGroup>,
}

/// A node of the page tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// A property control.
    Control(PropertyControl),
    /// A container of map items.
    Container(ItemContainer),
    /// A nested group with its own save control.
    Group(ControlGroup),
}

/// Where a group's collected tree is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveTarget {
    /// Named remote call carrying the project name and the properties.
    #[default]
    Rpc,
    /// `PUT` of the whole tree to an endpoint.
    Rest {
        /// Endpoint URL.
        url: String,
        /// CSRF token sent as `X-CSRFToken` when non-empty.
        #[serde(default, skip_serializing_if = "String::is_empty")]
        csrf_token: String,
    },
}

/// The region scanned by one save action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlGroup {
    /// Unique group id.
    pub id: String,
    /// Addressing convention of every control in this group.
    #[serde(default)]
    pub mode: AddressingMode,
    /// Flat-mode prefix prepended to control names outside any item.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prefix: String,
    /// Transport shape used when saving.
    #[serde(default)]
    pub target: SaveTarget,
    /// Child nodes in document order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// The group's save control.
    #[serde(default = "ActionButton::save")]
    pub save_button: ActionButton,
    /// Inline message shown next to the save control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusMessage>,
}

/// How item deletion reaches the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Remove locally; persisted by the next save of the group.
    #[default]
    Local,
    /// Delete the item's properties on the server first.
    Remote,
}

/// Holds map items and the template new items are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemContainer {
    /// Dotted prefix of the container; empty at top level.
    #[serde(default)]
    pub prefix: String,
    /// Title of one item, e.g. `Rule`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Deletion policy for items of this container.
    #[serde(default)]
    pub delete_policy: DeletePolicy,
    /// Template nodes with item-relative paths.
    #[serde(default)]
    pub template: Vec<Node>,
    /// Items in display order.
    #[serde(default)]
    pub items: Vec<MapItem>,
}

/// A named, removable sub-tree instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapItem {
    /// Item name, unique within its container.
    pub name: String,
    /// Dotted prefix all of the item's controls are rooted at.
    pub path_prefix: String,
    /// Whether the item's panel is expanded.
    #[serde(default)]
    pub expanded: bool,
    /// Child nodes in document order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// The item's delete control.
    #[serde(default = "ActionButton::delete")]
    pub delete_button: ActionButton,
    /// Inline message shown next to the delete control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusMessage>,
}

/// Label and enabled state of a save or delete control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    /// Current label.
    pub label: String,
    /// Set while the control's request is in flight.
    #[serde(default)]
    pub disabled: bool,
}

impl ActionButton {
    /// An idle save control.
    pub fn save() -> Self {
        Self {
            label: SAVE_LABEL.to_string(),
            disabled: false,
        }
    }

    /// An idle delete control.
    pub fn delete() -> Self {
        Self {
            label: DELETE_LABEL.to_string(),
            disabled: false,
        }
    }

    /// Enter the in-flight state. Returns `false` if already in flight.
    pub fn begin(&mut self, busy_label: &str) -> bool {
        if self.disabled {
            return false;
        }
        self.disabled = true;
        self.label = busy_label.to_string();
        true
    }

    /// Return to the idle state.
    pub fn finish(&mut self, idle_label: &str) {
        self.disabled = false;
        self.label = idle_label.to_string();
    }
}

/// Kind of an inline status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// The last operation succeeded.
    Success,
    /// The last operation failed.
    Error,
}

/// An inline status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    /// Message kind.
    pub kind: StatusKind,
    /// Message text.
    pub text: String,
}

impl StatusMessage {
    /// A success message.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    /// An error message, formatted as `Error: <text>`.
    pub fn error(text: impl std::fmt::Display) -> Self {
        Self {
            kind: StatusKind::Error,
            text: format!("Error: {text}"),
        }
    }
}

impl ControlGroup {
    /// An empty group.
    pub fn new(id: impl Into<String>, mode: AddressingMode) -> Self {
        Self {
            id: id.into(),
            mode,
            prefix: String::new(),
            target: SaveTarget::default(),
            nodes: Vec::new(),
            save_button: ActionButton::save(),
            status: None,
        }
    }

    /// Set the flat-mode prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the save target.
    pub fn with_target(mut self, target: SaveTarget) -> Self {
        self.target = target;
        self
    }

    /// Append a child node.
    pub fn with_node(mut self, node: impl Into<Node>) -> Self {
        self.nodes.push(node.into());
        self
    }
}

impl ItemContainer {
    /// An empty container with the given prefix and template.
    pub fn new(prefix: impl Into<String>, template: Vec<Node>) -> Self {
        Self {
            prefix: prefix.into(),
            title: String::new(),
            delete_policy: DeletePolicy::default(),
            template,
            items: Vec::new(),
        }
    }

    /// Set the delete policy.
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Names of the direct child items.
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.name.as_str())
    }
}

impl From<PropertyControl> for Node {
    fn from(c: PropertyControl) -> Self {
        Node::Control(c)
    }
}

impl From<ItemContainer> for Node {
    fn from(c: ItemContainer) -> Self {
        Node::Container(c)
    }
}

impl From<ControlGroup> for Node {
    fn from(g: ControlGroup) -> Self {
        Node::Group(g)
    }
}

/// A located container with the addressing mode of its enclosing group.
pub struct ContainerRef<'a> {
    /// The container.
    pub container: &'a mut ItemContainer,
    /// Mode of the group the container belongs to.
    pub mode: AddressingMode,
}

impl Page {
    /// Load a page model file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PageError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse(&content, extension(path))
    }

    /// Parse page content in the format named by `ext`.
    pub fn parse(content: &str, ext: &str) -> Result<Self, PageError> {
        match ext {
            "json" => Ok(serde_json::from_str(content)?),
            "toml" => Ok(toml::from_str(content)?),
            _ => Err(PageError::UnsupportedExtension(ext.to_string())),
        }
    }

    /// Render the page in the format named by `ext`.
    pub fn render(&self, ext: &str) -> Result<String, PageError> {
        match ext {
            "json" => Ok(serde_json::to_string_pretty(self)?),
            "toml" => Ok(toml::to_string_pretty(self)?),
            _ => Err(PageError::UnsupportedExtension(ext.to_string())),
        }
    }

    /// Write the page, keeping a timestamped backup of an existing file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), PageError> {
        let path = path.as_ref();
        let ext = extension(path);
        let content = self.render(ext)?;

        if path.exists() {
            let secs = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            let backup = path.with_extension(format!("bk-{secs}.{ext}"));
            fs::copy(path, &backup)?;
            debug!("page backup written to {}", backup.display());
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Find a group by id at any depth.
    pub fn group(&self, id: &str) -> Option<&ControlGroup> {
        self.groups.iter().find_map(|g| find_group(g, id))
    }

    /// Find a group by id at any depth, mutably.
    pub fn group_mut(&mut self, id: &str) -> Option<&mut ControlGroup> {
        self.groups.iter_mut().find_map(|g| find_group_mut(g, id))
    }

    /// Find a container by prefix, with the mode of its enclosing group.
    pub fn container_mut(&mut self, prefix: &str) -> Option<ContainerRef<'_>> {
        self.groups
            .iter_mut()
            .find_map(|g| find_container_mut(&mut g.nodes, g.mode, prefix))
    }

    /// Find a map item by its path prefix.
    pub fn item(&self, path_prefix: &str) -> Option<&MapItem> {
        self.groups
            .iter()
            .find_map(|g| find_item(&g.nodes, path_prefix))
    }

    /// Find a map item by its path prefix, together with its container.
    pub fn item_mut(&mut self, path_prefix: &str) -> Option<(&mut ItemContainer, usize)> {
        self.groups
            .iter_mut()
            .find_map(|g| find_item_mut(&mut g.nodes, path_prefix))
    }

    /// Remove a map item, returning it.
    pub fn remove_item(&mut self, path_prefix: &str) -> Option<MapItem> {
        let (container, idx) = self.item_mut(path_prefix)?;
        Some(container.items.remove(idx))
    }

    /// Visit every control with its resolved key, nested groups included.
    pub fn visit_controls(&self, f: &mut dyn FnMut(&str, &PropertyControl)) {
        fn nodes(
            list: &[Node],
            resolver: PathResolver,
            prefix: &str,
            f: &mut dyn FnMut(&str, &PropertyControl),
        ) {
            for node in list {
                match node {
                    Node::Control(c) => f(&resolver.resolve(&c.path, prefix), c),
                    Node::Container(c) => {
                        for item in &c.items {
                            nodes(&item.nodes, resolver, &item.path_prefix, f);
                        }
                    }
                    Node::Group(g) => nodes(&g.nodes, PathResolver::new(g.mode), &g.prefix, f),
                }
            }
        }
        for g in &self.groups {
            nodes(&g.nodes, PathResolver::new(g.mode), &g.prefix, f);
        }
    }

    /// Visit every control mutably with its resolved key.
    pub fn visit_controls_mut(&mut self, f: &mut dyn FnMut(&str, &mut PropertyControl)) {
        fn nodes(
            list: &mut [Node],
            resolver: PathResolver,
            prefix: &str,
            f: &mut dyn FnMut(&str, &mut PropertyControl),
        ) {
            for node in list {
                match node {
                    Node::Control(c) => {
                        let key = resolver.resolve(&c.path, prefix);
                        f(&key, c);
                    }
                    Node::Container(c) => {
                        for item in &mut c.items {
                            nodes(&mut item.nodes, resolver, &item.path_prefix, f);
                        }
                    }
                    Node::Group(g) => nodes(&mut g.nodes, PathResolver::new(g.mode), &g.prefix, f),
                }
            }
        }
        for g in &mut self.groups {
            nodes(&mut g.nodes, PathResolver::new(g.mode), &g.prefix, f);
        }
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|s| s.to_str()).unwrap_or("")
}

fn find_group<'a>(group: &'a ControlGroup, id: &str) -> Option<&'a ControlGroup> {
    if group.id == id {
        return Some(group);
    }
    find_group_in(&group.nodes, id)
}

fn find_group_in<'a>(nodes: &'a [Node], id: &str) -> Option<&'a ControlGroup> {
    nodes.iter().find_map(|node| match node {
        Node::Group(g) => find_group(g, id),
        Node::Container(c) => c
            .items
            .iter()
            .find_map(|item| find_group_in(&item.nodes, id)),
        Node::Control(_) => None,
    })
}

fn find_group_mut<'a>(group: &'a mut ControlGroup, id: &str) -> Option<&'a mut ControlGroup> {
    if group.id == id {
        return Some(group);
    }
    find_group_in_mut(&mut group.nodes, id)
}

fn find_group_in_mut<'a>(nodes: &'a mut [Node], id: &str) -> Option<&'a mut ControlGroup> {
    for node in nodes {
        match node {
            Node::Group(g) => {
                if let Some(found) = find_group_mut(g, id) {
                    return Some(found);
                }
            }
            Node::Container(c) => {
                for item in &mut c.items {
                    if let Some(found) = find_group_in_mut(&mut item.nodes, id) {
                        return Some(found);
                    }
                }
            }
            Node::Control(_) => {}
        }
    }
    None
}

fn find_container_mut<'a>(
    nodes: &'a mut [Node],
    mode: AddressingMode,
    prefix: &str,
) -> Option<ContainerRef<'a>> {
    for node in nodes {
        match node {
            Node::Group(g) => {
                if let Some(found) = find_container_mut(&mut g.nodes, g.mode, prefix) {
                    return Some(found);
                }
            }
            Node::Container(c) => {
                if c.prefix == prefix {
                    return Some(ContainerRef { container: c, mode });
                }
                for item in &mut c.items {
                    if let Some(found) = find_container_mut(&mut item.nodes, mode, prefix) {
                        return Some(found);
                    }
                }
            }
            Node::Control(_) => {}
        }
    }
    None
}

fn find_item<'a>(nodes: &'a [Node], path_prefix: &str) -> Option<&'a MapItem> {
    nodes.iter().find_map(|node| match node {
        Node::Group(g) => find_item(&g.nodes, path_prefix),
        Node::Container(c) => c.items.iter().find_map(|item| {
            if item.path_prefix == path_prefix {
                Some(item)
            } else {
                find_item(&item.nodes, path_prefix)
            }
        }),
        Node::Control(_) => None,
    })
}

fn find_item_mut<'a>(
    nodes: &'a mut [Node],
    path_prefix: &str,
) -> Option<(&'a mut ItemContainer, usize)> {
    for node in nodes {
        match node {
            Node::Group(g) => {
                if let Some(found) = find_item_mut(&mut g.nodes, path_prefix) {
                    return Some(found);
                }
            }
            Node::Container(c) => {
                if let Some(idx) = c.items.iter().position(|i| i.path_prefix == path_prefix) {
                    return Some((c, idx));
                }
                for item in &mut c.items {
                    if let Some(found) = find_item_mut(&mut item.nodes, path_prefix) {
                        return Some(found);
                    }
                }
            }
            Node::Control(_) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Page {
        let template = vec![Node::Control(PropertyControl::text("host", ""))];
        let mut container = ItemContainer::new("smtp.servers", template);
        container.items.push(MapItem {
            name: "main".into(),
            path_prefix: "smtp.servers.main".into(),
            expanded: false,
            nodes: vec![
                PropertyControl::text("smtp.servers.main.host", "mx").into(),
                ControlGroup::new("inner", AddressingMode::Flat).into(),
            ],
            delete_button: ActionButton::delete(),
            status: None,
        });
        Page {
            project: "demo".into(),
            groups: vec![ControlGroup::new("smtp", AddressingMode::Nested).with_node(container)],
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup() {
        let mut page = sample();
        assert!(page.group("inner").is_some());
        assert!(page.group_mut("inner").is_some());
        assert!(page.item("smtp.servers.main").is_some());
        let found = page.container_mut("smtp.servers").unwrap();
        assert_eq!(found.mode, AddressingMode::Nested);
        assert!(page.container_mut("nope").is_none());
        assert_eq!(page.remove_item("smtp.servers.main").unwrap().name, "main");
        assert!(page.item("smtp.servers.main").is_none());
    }

    #[test]
    fn test_button_lock() {
        let mut b = ActionButton::save();
        assert!(b.begin(SAVING_LABEL));
        assert!(!b.begin(SAVING_LABEL));
        assert_eq!(b.label, SAVING_LABEL);
        b.finish(SAVE_LABEL);
        assert!(!b.disabled);
        assert_eq!(b.label, SAVE_LABEL);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        let page = sample();
        page.write(&path).unwrap();
        page.write(&path).unwrap();
        assert_eq!(Page::load(&path).unwrap(), page);
        let backups = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(backups, 2);
    }

    #[test]
    fn test_toml_parse() {
        let content = r#"
project = "demo"

[[groups]]
id = "general"
mode = "flat"
prefix = "general."

[[groups.nodes]]
[groups.nodes.control]
path = "name"
label = "Name"
required = true
"#;
        let page = Page::parse(content, "toml").unwrap();
        let group = page.group("general").unwrap();
        assert_eq!(group.mode, AddressingMode::Flat);
        assert_eq!(group.save_button, ActionButton::save());
        assert!(matches!(&group.nodes[0], Node::Control(c) if c.required));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            Page::parse("", "yaml"),
            Err(PageError::UnsupportedExtension(_))
        ));
    }
}
