//! Custom-data scoping and default-value merging
//!
//! Only fields stored under the custom-data prefix carry record values. Those
//! fields lose the prefix and pick up the record's stored value as their
//! default; every other field is dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{FieldDefinition, RecordValues};

/// Prefix marking a field as stored in the record's custom data
pub const CUSTOM_DATA_PREFIX: &str = "customData.";

/// Which stored values become defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultPolicy {
    /// Apply only truthy values: `0`, `false`, `""` and `null` are skipped
    #[default]
    Truthy,
    /// Apply any stored value except `null`
    Presence,
}

impl std::str::FromStr for DefaultPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "truthy" => Ok(DefaultPolicy::Truthy),
            "presence" => Ok(DefaultPolicy::Presence),
            other => Err(format!("unknown default policy '{}' (expected truthy or presence)", other)),
        }
    }
}

impl DefaultPolicy {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            DefaultPolicy::Truthy => is_truthy(value),
            DefaultPolicy::Presence => !value.is_null(),
        }
    }
}

/// Keep fields whose path starts with `prefix`, stripping it.
///
/// Fields already scoped by an earlier pass are kept untouched, so applying
/// this twice is the same as applying it once.
pub fn scope_to_prefix(fields: Vec<FieldDefinition>, prefix: &str) -> Vec<FieldDefinition> {
    fields
        .into_iter()
        .filter_map(|mut field| {
            if field.scoped {
                return Some(field);
            }
            let unprefixed = field.path.as_deref()?.strip_prefix(prefix)?.to_string();
            field.path = Some(unprefixed);
            field.scoped = true;
            Some(field)
        })
        .collect()
}

/// Overlay stored values onto scoped fields according to `policy`.
///
/// A field whose value is missing or rejected keeps whatever default the
/// schema itself declared.
pub fn apply_defaults(fields: &mut [FieldDefinition], values: &RecordValues, policy: DefaultPolicy) {
    for field in fields.iter_mut().filter(|f| f.scoped) {
        let Some(path) = field.path.as_deref() else {
            continue;
        };
        if let Some(stored) = values.get(path) {
            if policy.accepts(stored) {
                field.default_value = Some(stored.clone());
            }
        }
    }
}

/// Scope `fields` to `prefix` and apply defaults from `values`
pub fn merge(
    fields: Vec<FieldDefinition>,
    values: &RecordValues,
    prefix: &str,
    policy: DefaultPolicy,
) -> Vec<FieldDefinition> {
    let mut scoped = scope_to_prefix(fields, prefix);
    apply_defaults(&mut scoped, values, policy);
    scoped
}

/// JavaScript-style truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("customData.color"),
            FieldDefinition::new("name"),
            FieldDefinition::new("customData.count"),
            FieldDefinition { path: None, ..Default::default() },
        ]
    }

    fn values() -> RecordValues {
        [("color", json!("red")), ("count", json!(0))].into_iter().collect()
    }

    #[test]
    fn test_scope_strips_prefix_and_drops_others() {
        let scoped = scope_to_prefix(fields(), CUSTOM_DATA_PREFIX);
        let paths: Vec<_> = scoped.iter().map(|f| f.path.clone().unwrap()).collect();
        assert_eq!(paths, vec!["color", "count"]);
        assert!(scoped.iter().all(FieldDefinition::is_scoped));
    }

    #[test]
    fn test_scope_is_idempotent() {
        let once = scope_to_prefix(fields(), CUSTOM_DATA_PREFIX);
        let twice = scope_to_prefix(once.clone(), CUSTOM_DATA_PREFIX);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_scope_requires_leading_prefix() {
        let scoped = scope_to_prefix(
            vec![FieldDefinition::new("meta.customData.color")],
            CUSTOM_DATA_PREFIX,
        );
        assert!(scoped.is_empty());
    }

    #[test]
    fn test_truthy_policy_skips_zero() {
        let merged = merge(fields(), &values(), CUSTOM_DATA_PREFIX, DefaultPolicy::Truthy);
        assert_eq!(merged[0].default_value, Some(json!("red")));
        assert_eq!(merged[1].default_value, None);
    }

    #[test]
    fn test_presence_policy_keeps_zero() {
        let merged = merge(fields(), &values(), CUSTOM_DATA_PREFIX, DefaultPolicy::Presence);
        assert_eq!(merged[0].default_value, Some(json!("red")));
        assert_eq!(merged[1].default_value, Some(json!(0)));
    }

    #[test]
    fn test_presence_policy_skips_null() {
        let values: RecordValues = [("color", Value::Null)].into_iter().collect();
        let merged = merge(fields(), &values, CUSTOM_DATA_PREFIX, DefaultPolicy::Presence);
        assert_eq!(merged[0].default_value, None);
    }

    #[test]
    fn test_schema_default_survives_missing_value() {
        let mut field = FieldDefinition::new("customData.size");
        field.default_value = Some(json!("M"));
        let merged = merge(vec![field], &RecordValues::empty(), CUSTOM_DATA_PREFIX, DefaultPolicy::Truthy);
        assert_eq!(merged[0].default_value, Some(json!("M")));
    }

    #[test]
    fn test_truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{} should be falsy", falsy);
        }
        for truthy in [json!(true), json!(1), json!(-2.5), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{} should be truthy", truthy);
        }
    }
}
