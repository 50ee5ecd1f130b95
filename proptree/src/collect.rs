//! Collection of a control group into a property tree.

use crate::{
    data::{ControlGroup, Node, PropertyTree},
    error::CollectError,
    path::PathResolver,
};

/// Collect every control of `group` into a property tree.
///
/// Controls are visited in document order, including those inside the map
/// items of the group's containers. Nested control groups are skipped: they
/// are saved on their own.
///
/// With `check_required`, the first required control with an empty value
/// aborts the whole collection. Evaluation stops at the first failure and no
/// partial tree is returned.
pub fn collect(group: &ControlGroup, check_required: bool) -> Result<PropertyTree, CollectError> {
    let mut collector = Collector {
        resolver: PathResolver::new(group.mode),
        check_required,
        tree: PropertyTree::new(),
    };
    collector.visit(&group.nodes, &group.prefix)?;
    debug!(
        "collected {} top-level entries from group {}",
        collector.tree.len(),
        group.id
    );
    Ok(collector.tree)
}

struct Collector {
    resolver: PathResolver,
    check_required: bool,
    tree: PropertyTree,
}

impl Collector {
    fn visit(&mut self, nodes: &[Node], prefix: &str) -> Result<(), CollectError> {
        for node in nodes {
            match node {
                Node::Control(control) => {
                    if self.check_required && control.required && control.is_empty() {
                        return Err(CollectError::Required {
                            path: control.path.clone(),
                            label: control.display_label().to_string(),
                        });
                    }
                    let value = control.coerce()?;
                    let key = self.resolver.resolve(&control.path, prefix);
                    let segments = self.resolver.segments(&key);
                    self.tree.insert(&segments, value);
                }
                Node::Container(container) => {
                    for item in &container.items {
                        self.visit(&item.nodes, &item.path_prefix)?;
                    }
                }
                Node::Group(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{ItemContainer, MapItem, PropertyControl, page::ActionButton},
        path::AddressingMode,
    };
    use serde_json::json;

    fn item(name: &str, prefix: &str, nodes: Vec<Node>) -> MapItem {
        MapItem {
            name: name.into(),
            path_prefix: prefix.into(),
            expanded: false,
            nodes,
            delete_button: ActionButton::delete(),
            status: None,
        }
    }

    #[test]
    fn test_nested_paths_at_any_depth() {
        let group = ControlGroup::new("g", AddressingMode::Nested)
            .with_node(PropertyControl::text("a", "1"))
            .with_node(PropertyControl::number("b.c", "2"))
            .with_node(PropertyControl::checkbox("d.e.f.g", true));
        let tree = collect(&group, true).unwrap();
        assert_eq!(tree.get("a"), Some(&json!("1")));
        assert_eq!(tree.get("b.c"), Some(&json!(2)));
        assert_eq!(tree.as_json()["d"]["e"]["f"]["g"], json!(true));
    }

    #[test]
    fn test_flat_prefix_from_item() {
        let mut container = ItemContainer::new("rules", vec![]);
        container.items.push(item(
            "r1",
            "rules.r1",
            vec![PropertyControl::number("priority", "5").into()],
        ));
        let group = ControlGroup::new("g", AddressingMode::Flat)
            .with_prefix("general.")
            .with_node(PropertyControl::text("title", "x"))
            .with_node(container);
        let tree = collect(&group, true).unwrap();
        assert_eq!(tree.as_map().get("rules.r1.priority"), Some(&json!(5)));
        assert_eq!(tree.as_map().get("general.title"), Some(&json!("x")));
    }

    #[test]
    fn test_flat_without_prefix() {
        let group = ControlGroup::new("g", AddressingMode::Flat)
            .with_node(PropertyControl::text("title", "x"));
        let tree = collect(&group, false).unwrap();
        assert_eq!(tree.as_json(), json!({"title": "x"}));
    }

    #[test]
    fn test_required_short_circuit() {
        let group = ControlGroup::new("g", AddressingMode::Nested)
            .with_node(PropertyControl::text("a", "").with_label("A").required())
            .with_node(PropertyControl::number("b", "not a number").required());
        let err = collect(&group, true).unwrap_err();
        assert_eq!(
            err,
            CollectError::Required {
                path: "a".into(),
                label: "A".into()
            }
        );
        assert_eq!(err.to_string(), "A is required!");
    }

    #[test]
    fn test_required_ignored_without_check() {
        let group = ControlGroup::new("g", AddressingMode::Nested)
            .with_node(PropertyControl::text("a", "").required());
        assert_eq!(collect(&group, false).unwrap().get("a"), Some(&json!("")));
    }

    #[test]
    fn test_invalid_number_names_control() {
        let group = ControlGroup::new("g", AddressingMode::Nested)
            .with_node(PropertyControl::number("smtp.port", "abc"));
        let err = collect(&group, true).unwrap_err();
        assert_eq!(err.path(), "smtp.port");
    }

    #[test]
    fn test_nested_group_not_collected() {
        let inner = ControlGroup::new("inner", AddressingMode::Nested)
            .with_node(PropertyControl::text("inner.x", "1").required());
        let group = ControlGroup::new("outer", AddressingMode::Nested)
            .with_node(PropertyControl::text("outer.y", "2"))
            .with_node(inner);
        let tree = collect(&group, true).unwrap();
        assert_eq!(tree.as_json(), json!({"outer": {"y": "2"}}));
    }

    #[test]
    fn test_last_write_wins() {
        let group = ControlGroup::new("g", AddressingMode::Nested)
            .with_node(PropertyControl::text("a", "first"))
            .with_node(PropertyControl::text("a", "second"));
        assert_eq!(collect(&group, true).unwrap().get("a"), Some(&json!("second")));
    }
}
