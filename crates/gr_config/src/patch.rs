use serde_json::{Map, Value};

/// Merge a patch config over a base config, in place (RFC 7396 semantics).
///
/// Objects merge recursively; anything else in the patch — scalars and
/// arrays alike — replaces the base value wholesale; an explicit `null` in
/// the patch removes the key. This is how a user-authored delta config is
/// applied over inherited/default configs to produce the full config.
pub fn merge_patch(base: &mut Value, patch: &Value) {
    match patch {
        Value::Object(patch) => {
            if !base.is_object() {
                *base = Value::Object(Map::new());
            }
            let Some(base) = base.as_object_mut() else {
                return;
            };
            for (key, value) in patch {
                if value.is_null() {
                    base.remove(key);
                } else {
                    merge_patch(base.entry(key.clone()).or_insert(Value::Null), value);
                }
            }
        }
        _ => *base = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn objects_merge_recursively() {
        let mut base = json!({
            "title": "Base title",
            "yAxis": { "scaleType": "linear", "label": "People" },
        });
        merge_patch(&mut base, &json!({ "yAxis": { "scaleType": "log" } }));

        assert_eq!(
            base,
            json!({
                "title": "Base title",
                "yAxis": { "scaleType": "log", "label": "People" },
            })
        );
    }

    #[test]
    fn arrays_replace_wholesale() {
        let mut base = json!({ "selectedEntityNames": ["USA", "Canada"] });
        merge_patch(&mut base, &json!({ "selectedEntityNames": ["France"] }));
        assert_eq!(base, json!({ "selectedEntityNames": ["France"] }));
    }

    #[test]
    fn null_removes_the_key() {
        let mut base = json!({ "title": "Gone soon", "note": "Stays" });
        merge_patch(&mut base, &json!({ "title": null }));
        assert_eq!(base, json!({ "note": "Stays" }));
    }
}
