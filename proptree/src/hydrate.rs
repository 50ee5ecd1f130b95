//! Filling a page from the server's stored properties.
//!
//! The server keeps properties as a flat map of dotted keys. Map items are
//! not stored on their own; an item exists when some key lives under its
//! prefix. Hydration recreates those items from their containers' templates
//! and then copies every stored value into the control resolving to its key.

use serde_json::{Map, Value};

use crate::{
    data::{Node, Page, PropertyTree},
    items,
    path::{self, AddressingMode, SEPARATOR},
};

/// Recreate map items and load values from `properties`.
///
/// `properties` may be nested or flat. Returns the number of controls that
/// received a value. The unsaved-changes flag is left untouched.
pub fn hydrate(page: &mut Page, properties: &PropertyTree) -> usize {
    let flat = properties.flatten();
    let flat = flat.as_map();

    for group in &mut page.groups {
        discover(&mut group.nodes, group.mode, flat);
    }

    let mut updated = 0;
    page.visit_controls_mut(&mut |key, control| {
        if let Some(value) = flat.get(key) {
            if control.update_from_value(value) {
                updated += 1;
            } else {
                warn!("property {key} has a value the control cannot hold: {value}");
            }
        }
    });
    debug!("hydrated {updated} controls from {} properties", flat.len());
    updated
}

/// Names of the items stored under `prefix`, in key order.
pub fn item_names(prefix: &str, properties: &Map<String, Value>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for key in properties.keys() {
        let rest = if prefix.is_empty() {
            key.as_str()
        } else {
            match key
                .strip_prefix(prefix)
                .and_then(|r| r.strip_prefix(SEPARATOR))
            {
                Some(rest) => rest,
                None => continue,
            }
        };
        // A bare key directly under the prefix is a value, not an item.
        let Some((name, _)) = rest.split_once(SEPARATOR) else {
            continue;
        };
        if path::is_segment(name) && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

fn discover(nodes: &mut [Node], mode: AddressingMode, properties: &Map<String, Value>) {
    for node in nodes {
        match node {
            Node::Container(container) => {
                for name in item_names(&container.prefix, properties) {
                    if container.item_names().any(|n| n == name) {
                        continue;
                    }
                    let mut item = items::instantiate(container, &name, mode);
                    item.expanded = false;
                    container.items.push(item);
                }
                for item in &mut container.items {
                    discover(&mut item.nodes, mode, properties);
                }
            }
            Node::Group(group) => discover(&mut group.nodes, group.mode, properties),
            Node::Control(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ControlGroup, ItemContainer, PropertyControl, RawValue};
    use serde_json::json;

    fn tree(v: Value) -> PropertyTree {
        match v {
            Value::Object(map) => PropertyTree::from(map),
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_item_names() {
        let props = tree(json!({
            "testing.tests.a.script": "x",
            "testing.tests.a.timeout": 1,
            "testing.tests.b.script": "y",
            "testing.testsuffix.c.script": "z",
            "testing.tests.bare": "v",
        }));
        assert_eq!(item_names("testing.tests", props.as_map()), vec!["a", "b"]);
    }

    #[test]
    fn test_hydrate_recreates_items() {
        let template = vec![
            PropertyControl::text("script", "").into(),
            PropertyControl::number("timeout", "3600").into(),
            PropertyControl::checkbox("enabled", false).into(),
        ];
        let mut page = Page {
            project: "demo".into(),
            groups: vec![ControlGroup::new("tests", AddressingMode::Flat)
                .with_prefix("testing.")
                .with_node(PropertyControl::text("name", ""))
                .with_node(ItemContainer::new("testing.tests", template))],
            ..Default::default()
        };
        let props = tree(json!({
            "testing": {
                "name": "QEMU",
                "tests": { "t1": { "script": "make check", "enabled": true } }
            }
        }));

        assert_eq!(hydrate(&mut page, &props), 3);
        assert!(!page.dirty);
        let item = page.item("testing.tests.t1").unwrap();
        assert!(!item.expanded);
        match &item.nodes[0] {
            Node::Control(c) => assert_eq!(c.raw, RawValue::Text("make check".into())),
            other => panic!("unexpected node {other:?}"),
        }
        match &item.nodes[2] {
            Node::Control(c) => assert_eq!(c.raw, RawValue::Checked(true)),
            other => panic!("unexpected node {other:?}"),
        }

        assert_eq!(hydrate(&mut page, &props), 3);
        assert_eq!(
            page.container_mut("testing.tests").unwrap().container.items.len(),
            1
        );
    }
}
