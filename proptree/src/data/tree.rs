use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::path::SEPARATOR;

/// Collected property values, either nested by segment or flat by dotted key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyTree(Map<String, Value>);

impl PropertyTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under the given segments, creating objects on the way.
    ///
    /// A scalar found where an object is needed is replaced.
    pub fn insert(&mut self, segments: &[&str], value: Value) {
        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };
        let mut node = &mut self.0;
        for seg in parents {
            let entry = node
                .entry(seg.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            node = match entry {
                Value::Object(map) => map,
                _ => unreachable!(),
            };
        }
        node.insert(leaf.to_string(), value);
    }

    /// Look up a value by dotted path.
    ///
    /// A flat key matching the whole path wins over a nested walk.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if let Some(v) = self.0.get(path) {
            return Some(v);
        }
        let mut segs = path.split(SEPARATOR);
        let mut cur = self.0.get(segs.next()?)?;
        for seg in segs {
            cur = cur.as_object()?.get(seg)?;
        }
        Some(cur)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Top-level entries.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The tree as a JSON object.
    pub fn as_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Consume the tree into a JSON object.
    pub fn into_json(self) -> Value {
        Value::Object(self.0)
    }

    /// Flatten nested objects into dotted keys.
    ///
    /// Empty objects produce no key.
    pub fn flatten(&self) -> PropertyTree {
        fn walk(prefix: &str, map: &Map<String, Value>, out: &mut Map<String, Value>) {
            for (k, v) in map {
                let key = crate::path::join(prefix, k);
                match v {
                    Value::Object(inner) => walk(&key, inner, out),
                    _ => {
                        out.insert(key, v.clone());
                    }
                }
            }
        }
        let mut out = Map::new();
        walk("", &self.0, &mut out);
        PropertyTree(out)
    }

    /// Rebuild a nested tree from dotted keys.
    pub fn unflatten(&self) -> PropertyTree {
        let mut out = PropertyTree::new();
        for (k, v) in &self.0 {
            let segs: Vec<&str> = k.split(SEPARATOR).collect();
            out.insert(&segs, v.clone());
        }
        out
    }
}

impl From<Map<String, Value>> for PropertyTree {
    fn from(map: Map<String, Value>) -> Self {
        PropertyTree(map)
    }
}

impl From<PropertyTree> for Value {
    fn from(tree: PropertyTree) -> Self {
        tree.into_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_get() {
        let mut t = PropertyTree::new();
        t.insert(&["a", "b", "c"], json!(1));
        t.insert(&["a", "d"], json!("x"));
        assert_eq!(t.get("a.b.c"), Some(&json!(1)));
        assert_eq!(t.get("a.d"), Some(&json!("x")));
        assert_eq!(t.get("a.z"), None);
    }

    #[test]
    fn test_scalar_replaced_by_object() {
        let mut t = PropertyTree::new();
        t.insert(&["a"], json!(1));
        t.insert(&["a", "b"], json!(2));
        assert_eq!(t.as_json(), json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_flatten_unflatten() {
        let mut t = PropertyTree::new();
        t.insert(&["rules", "r1", "priority"], json!(3));
        t.insert(&["rules", "r1", "on"], json!(true));
        t.insert(&["name"], json!("p"));
        let flat = t.flatten();
        assert_eq!(flat.get("rules.r1.priority"), Some(&json!(3)));
        assert_eq!(flat.len(), 3);
        assert_eq!(flat.unflatten(), t);
    }
}
