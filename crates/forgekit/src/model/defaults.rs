//! Default-template merging for canonical records.
//!
//! Normalizers build partial JSON records using canonical field names. Before
//! a record is deserialized into its entity type it is merged over that
//! entity's default template, so every canonical field is present even when
//! the provider never populated it.

use serde_json::{Map, Value};

/// Merge `value` over `template`.
///
/// - Objects are merged key by key following the template's keys. Keys the
///   template does not know are dropped.
/// - A `null` (or missing) value takes the template's default, unless the
///   template default is itself `null`.
/// - A `null` template accepts any value unchanged.
/// - Arrays and scalars take the value as is.
///
/// The merge is pure and idempotent: `fill(t, fill(t, v)) == fill(t, v)`.
pub fn fill(template: &Value, value: Value) -> Value {
    match (template, value) {
        (Value::Null, value) => value,
        (template, Value::Null) => template.clone(),
        (Value::Object(defaults), Value::Object(mut given)) => {
            let merged: Map<String, Value> = defaults
                .iter()
                .map(|(key, default)| {
                    let field = given.remove(key).unwrap_or(Value::Null);
                    (key.clone(), fill(default, field))
                })
                .collect();
            Value::Object(merged)
        }
        (_, value) => value,
    }
}

/// Merge an optional nested record over `template`.
///
/// `null` stays `null` (the record is absent). Anything else is merged with
/// [`fill`].
pub fn fill_optional(template: &Value, value: Value) -> Value {
    match value {
        Value::Null => Value::Null,
        value => fill(template, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> Value {
        json!({
            "id": 0,
            "title": "",
            "assignee": null,
            "merged": false,
            "labels": [],
            "head": { "ref": "", "user": "", "repo": null }
        })
    }

    #[test]
    fn test_fill_adds_missing_fields() {
        let filled = fill(&template(), json!({ "id": 7 }));
        assert_eq!(
            filled,
            json!({
                "id": 7,
                "title": "",
                "assignee": null,
                "merged": false,
                "labels": [],
                "head": { "ref": "", "user": "", "repo": null }
            })
        );
    }

    #[test]
    fn test_fill_null_takes_default() {
        let filled = fill(&template(), json!({ "title": null, "merged": null }));
        assert_eq!(filled["title"], json!(""));
        assert_eq!(filled["merged"], json!(false));
    }

    #[test]
    fn test_fill_null_template_accepts_value() {
        let filled = fill(
            &template(),
            json!({ "assignee": { "login": "octocat", "html_url": null } }),
        );
        assert_eq!(filled["assignee"]["login"], json!("octocat"));
    }

    #[test]
    fn test_fill_drops_unknown_keys() {
        let filled = fill(&template(), json!({ "iid": 3, "node_id": "MDU6" }));
        assert!(filled.get("iid").is_none());
        assert!(filled.get("node_id").is_none());
    }

    #[test]
    fn test_fill_merges_nested_objects() {
        let filled = fill(&template(), json!({ "head": { "ref": "feature" } }));
        assert_eq!(
            filled["head"],
            json!({ "ref": "feature", "user": "", "repo": null })
        );
    }

    #[test]
    fn test_fill_arrays_are_taken_whole() {
        let filled = fill(
            &template(),
            json!({ "labels": [{ "name": "bug", "color": "d73a4a" }] }),
        );
        assert_eq!(filled["labels"], json!([{ "name": "bug", "color": "d73a4a" }]));
    }

    #[test]
    fn test_fill_is_idempotent() {
        let partial = json!({
            "id": 11,
            "title": "Crash on start",
            "extra": true,
            "head": { "user": "octocat" }
        });
        let once = fill(&template(), partial);
        let twice = fill(&template(), once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fill_optional_keeps_absent_and_fills_present() {
        let origin = json!({ "owner": "", "repo": "" });
        assert_eq!(fill_optional(&origin, Value::Null), Value::Null);
        assert_eq!(
            fill_optional(&origin, json!({ "owner": null, "repo": "widgets" })),
            json!({ "owner": "", "repo": "widgets" })
        );
    }

    #[test]
    fn test_fill_non_object_record_is_kept() {
        assert_eq!(fill(&json!(""), json!("text")), json!("text"));
        assert_eq!(fill(&json!(0), Value::Null), json!(0));
    }
}
