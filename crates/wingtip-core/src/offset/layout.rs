//! Class layout lookups with single-inheritance field resolution.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde_json::Value;

/// Fields declared directly on one class plus its parent, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassInfo {
    pub fields: HashMap<String, u64>,
    pub parent: Option<String>,
}

/// Result of walking a class and its parents for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldLookup {
    Found { owner: String, offset: u64 },
    MissingClass { class: String },
    MissingField { field: String, class: String },
    Cycle { field: String, class: String },
}

impl FieldLookup {
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Found { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

impl fmt::Display for FieldLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { owner, offset } => write!(f, "{}+{:#x}", owner, offset),
            Self::MissingClass { class } => write!(f, "Class '{}' not found", class),
            Self::MissingField { field, class } => {
                write!(f, "'{}' not found in '{}' or its parents", field, class)
            }
            Self::Cycle { field, class } => write!(
                f,
                "'{}' lookup hit a cyclic parent chain starting at '{}'",
                field, class
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClassLayout {
    classes: HashMap<String, ClassInfo>,
}

impl ClassLayout {
    /// Build from a `classes` object: `{name: {fields: {..}, parent: name?}}`.
    ///
    /// Non-integer field values and non-string parents are ignored, so one odd
    /// entry in a large dump does not invalidate the rest.
    pub fn from_classes(classes: &Value) -> Self {
        let Some(entries) = classes.as_object() else {
            return Self::default();
        };

        let classes = entries
            .iter()
            .map(|(name, info)| {
                let fields = info
                    .get("fields")
                    .and_then(Value::as_object)
                    .map(|fields| {
                        fields
                            .iter()
                            .filter_map(|(field, offset)| {
                                offset.as_u64().map(|offset| (field.clone(), offset))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                let parent = info
                    .get("parent")
                    .and_then(Value::as_str)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string);
                (name.clone(), ClassInfo { fields, parent })
            })
            .collect();

        Self { classes }
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Find `field` on `class` or the nearest ancestor declaring it.
    pub fn lookup(&self, class: &str, field: &str) -> FieldLookup {
        let mut visited = HashSet::new();
        let mut current = class;

        loop {
            if !visited.insert(current) {
                return FieldLookup::Cycle {
                    field: field.to_string(),
                    class: class.to_string(),
                };
            }

            let Some(info) = self.classes.get(current) else {
                return FieldLookup::MissingClass {
                    class: current.to_string(),
                };
            };

            if let Some(offset) = info.fields.get(field) {
                return FieldLookup::Found {
                    owner: current.to_string(),
                    offset: *offset,
                };
            }

            match info.parent.as_deref() {
                Some(parent) => current = parent,
                None => {
                    return FieldLookup::MissingField {
                        field: field.to_string(),
                        class: class.to_string(),
                    };
                }
            }
        }
    }

    pub fn get_field(&self, class: &str, field: &str) -> Option<u64> {
        self.lookup(class, field).offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layout(value: Value) -> ClassLayout {
        ClassLayout::from_classes(&value)
    }

    #[test]
    fn test_field_inherited_from_parent() {
        let layout = layout(json!({
            "Base": {"fields": {"x": 10}},
            "Derived": {"parent": "Base", "fields": {}}
        }));

        assert_eq!(layout.get_field("Derived", "x"), Some(10));
        assert_eq!(
            layout.lookup("Derived", "x"),
            FieldLookup::Found {
                owner: "Base".to_string(),
                offset: 10
            }
        );
    }

    #[test]
    fn test_nearest_declaration_wins() {
        let layout = layout(json!({
            "Base": {"fields": {"x": 10}},
            "Mid": {"parent": "Base", "fields": {"x": 20}},
            "Leaf": {"parent": "Mid", "fields": {"y": 30}}
        }));

        assert_eq!(layout.get_field("Leaf", "x"), Some(20));
        assert_eq!(layout.get_field("Leaf", "y"), Some(30));
    }

    #[test]
    fn test_missing_class() {
        let layout = layout(json!({"Base": {"fields": {}}}));
        assert_eq!(
            layout.lookup("Nope", "x"),
            FieldLookup::MissingClass {
                class: "Nope".to_string()
            }
        );
    }

    #[test]
    fn test_missing_parent_class_is_named() {
        let layout = layout(json!({"Derived": {"parent": "Gone", "fields": {}}}));
        assert_eq!(
            layout.lookup("Derived", "x"),
            FieldLookup::MissingClass {
                class: "Gone".to_string()
            }
        );
    }

    #[test]
    fn test_missing_field_at_root() {
        let layout = layout(json!({
            "Base": {"fields": {"x": 10}, "parent": null},
            "Derived": {"parent": "Base", "fields": {}}
        }));
        let lookup = layout.lookup("Derived", "y");
        assert_eq!(
            lookup,
            FieldLookup::MissingField {
                field: "y".to_string(),
                class: "Derived".to_string()
            }
        );
        assert_eq!(lookup.to_string(), "'y' not found in 'Derived' or its parents");
    }

    #[test]
    fn test_cyclic_parent_chain_terminates() {
        let layout = layout(json!({
            "A": {"parent": "B", "fields": {}},
            "B": {"parent": "A", "fields": {}}
        }));
        assert!(matches!(layout.lookup("A", "x"), FieldLookup::Cycle { .. }));
        assert_eq!(layout.get_field("B", "x"), None);
    }

    #[test]
    fn test_self_parent_is_cycle() {
        let layout = layout(json!({"A": {"parent": "A", "fields": {}}}));
        assert!(matches!(layout.lookup("A", "x"), FieldLookup::Cycle { .. }));
    }

    #[test]
    fn test_ignores_non_integer_fields() {
        let layout = layout(json!({
            "A": {"fields": {"good": 4, "bad": "0x10", "neg": -1}}
        }));
        let class = layout.class("A").unwrap();
        assert_eq!(class.fields.len(), 1);
        assert_eq!(layout.get_field("A", "good"), Some(4));
    }

    #[test]
    fn test_non_object_classes_is_empty() {
        assert!(layout(json!([1, 2, 3])).is_empty());
    }
}
