//! Option-list normalization

use serde_json::Value;

use crate::domain::OptionEntry;

/// Reduce every entry to its plain value, keeping order and length.
///
/// A `{value, label}` entry without a value becomes `null` so the slot is
/// still there for anything indexing into the list.
pub fn normalize(options: &[OptionEntry]) -> Vec<Value> {
    options.iter().map(scalar_of).collect()
}

fn scalar_of(entry: &OptionEntry) -> Value {
    match entry {
        OptionEntry::Scalar(value) => value.clone(),
        OptionEntry::Labeled { value, .. } => value.clone().unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mixed_entries() {
        let options = vec![OptionEntry::scalar("a"), OptionEntry::labeled("b", "B")];
        assert_eq!(normalize(&options), vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_falsy_labeled_values_are_kept() {
        let options: Vec<OptionEntry> =
            serde_json::from_value(json!([{"value": 0, "label": "zero"}, {"value": false}, 3])).unwrap();
        assert_eq!(normalize(&options), vec![json!(0), json!(false), json!(3)]);
    }

    #[test]
    fn test_missing_value_keeps_slot() {
        let options: Vec<OptionEntry> =
            serde_json::from_value(json!(["x", {"label": "no value"}, "y"])).unwrap();
        assert_eq!(normalize(&options), vec![json!("x"), Value::Null, json!("y")]);
    }

    #[test]
    fn test_empty() {
        assert!(normalize(&[]).is_empty());
    }
}
