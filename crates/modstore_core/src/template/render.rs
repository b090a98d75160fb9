//! Recursive template renderer.

use super::placeholder::Placeholder;
use serde_json::{Map, Value};

/// Knobs for one render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Omit object keys whose value renders to undefined instead of emitting
    /// `null`. Used for `createObject` so optional fields stay absent.
    pub remove_undefined_values: bool,
}

impl RenderOptions {
    pub fn removing_undefined() -> Self {
        Self {
            remove_undefined_values: true,
        }
    }
}

/// Renders `template` against `context`.
///
/// Returns `None` when the template itself is a placeholder that resolves to
/// nothing. Below the top level, undefined array elements become `null` so
/// length and order are preserved, and undefined object values become `null`
/// or are dropped depending on `options`.
pub fn render(template: &Value, context: &Value, options: RenderOptions) -> Option<Value> {
    match template {
        Value::Object(entries) => {
            let mut rendered = Map::new();
            for (key, child) in entries {
                match render(child, context, options) {
                    Some(value) => {
                        rendered.insert(key.clone(), value);
                    }
                    None if options.remove_undefined_values => {}
                    None => {
                        rendered.insert(key.clone(), Value::Null);
                    }
                }
            }
            Some(Value::Object(rendered))
        }
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .map(|item| render(item, context, options).unwrap_or(Value::Null))
                .collect(),
        )),
        Value::String(raw) => match Placeholder::parse(raw) {
            Some(placeholder) => placeholder.resolve(context).cloned(),
            None => Some(template.clone()),
        },
        scalar => Some(scalar.clone()),
    }
}

/// Like [`render`], collapsing a top-level undefined into `null`.
pub fn render_args(template: &Value, context: &Value, options: RenderOptions) -> Value {
    render(template, context, options).unwrap_or(Value::Null)
}

/// Lists every placeholder leaf in `template`, in traversal order.
pub fn placeholders(template: &Value) -> Vec<Placeholder<'_>> {
    let mut found = Vec::new();
    collect_placeholders(template, &mut found);
    found
}

fn collect_placeholders<'a>(template: &'a Value, found: &mut Vec<Placeholder<'a>>) {
    match template {
        Value::Object(entries) => {
            for child in entries.values() {
                collect_placeholders(child, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_placeholders(item, found);
            }
        }
        Value::String(raw) => found.extend(Placeholder::parse(raw)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::{placeholders, render, render_args, RenderOptions};
    use serde_json::{json, Value};

    #[test]
    fn renders_object_templates() {
        let template = json!({ "displayName": "$displayName:string" });
        let rendered = render_args(
            &template,
            &json!({ "displayName": "John Doe" }),
            RenderOptions::default(),
        );
        assert_eq!(rendered, json!({ "displayName": "John Doe" }));
    }

    #[test]
    fn renders_array_templates() {
        let template = json!([
            { "displayName": "$displayName:string" },
            { "limit": "$limit:number", "order": ["$order:string"] }
        ]);
        let context = json!({ "limit": 10, "order": "displayName", "displayName": "John Doe" });
        let rendered = render_args(&template, &context, RenderOptions::default());
        assert_eq!(
            rendered,
            json!([
                { "displayName": "John Doe" },
                { "limit": 10, "order": ["displayName"] }
            ])
        );
    }

    #[test]
    fn renders_positional_records() {
        let template = json!([{ "id": "$id:auto-pk" }, { "displayName": "$displayName:string" }]);
        let context = json!({ "id": 1, "displayName": "John Doe" });
        assert_eq!(
            render_args(&template, &context, RenderOptions::default()),
            json!([{ "id": 1 }, { "displayName": "John Doe" }])
        );
    }

    #[test]
    fn templates_without_placeholders_render_to_themselves() {
        let template = json!({
            "sort": ["sharedOn", "asc"],
            "limit": 5,
            "flag": true,
            "nothing": null,
            "$gt": "literal",
            "nested": [{ "deep": ["price $5", 1.5] }]
        });
        for context in [json!({}), json!({ "sort": 1, "limit": "x" }), Value::Null] {
            assert_eq!(
                render(&template, &context, RenderOptions::default()),
                Some(template.clone())
            );
            assert_eq!(
                render(&template, &context, RenderOptions::removing_undefined()),
                Some(template.clone())
            );
        }
    }

    #[test]
    fn missing_values_are_null_by_default_and_dropped_on_request() {
        let template = json!({ "displayName": "$displayName:string", "email": "$email:string" });
        let context = json!({ "displayName": "John Doe" });

        assert_eq!(
            render_args(&template, &context, RenderOptions::default()),
            json!({ "displayName": "John Doe", "email": null })
        );
        assert_eq!(
            render_args(&template, &context, RenderOptions::removing_undefined()),
            json!({ "displayName": "John Doe" })
        );
    }

    #[test]
    fn undefined_array_elements_keep_their_slot() {
        let template = json!(["$first", "$missing", "$last"]);
        let context = json!({ "first": 1, "last": 3 });
        assert_eq!(
            render_args(&template, &context, RenderOptions::removing_undefined()),
            json!([1, null, 3])
        );
    }

    #[test]
    fn top_level_placeholder_can_be_undefined() {
        assert_eq!(
            render(&json!("$missing"), &json!({}), RenderOptions::default()),
            None
        );
        assert_eq!(
            render_args(&json!("$operations"), &json!({ "operations": [1, 2] }), RenderOptions::default()),
            json!([1, 2])
        );
    }

    #[test]
    fn placeholder_values_are_substituted_whole() {
        let template = json!({ "where": { "userId": "$user" } });
        let context = json!({ "user": { "id": 3, "roles": ["admin"] } });
        assert_eq!(
            render_args(&template, &context, RenderOptions::default()),
            json!({ "where": { "userId": { "id": 3, "roles": ["admin"] } } })
        );
    }

    #[test]
    fn free_form_paths_resolve_or_become_undefined() {
        let template = json!({ "u": "$user-id", "s": "$first name", "n": "$0" });
        let context = json!({ "user-id": 5, "first name": "A", "0": 9 });
        assert_eq!(
            render_args(&template, &context, RenderOptions::default()),
            json!({ "u": 5, "s": "A", "n": 9 })
        );
        assert_eq!(
            render_args(&template, &json!({}), RenderOptions::removing_undefined()),
            json!({})
        );
        assert_eq!(
            render_args(&template, &json!({}), RenderOptions::default()),
            json!({ "u": null, "s": null, "n": null })
        );
    }

    #[test]
    fn lists_placeholders() {
        let template = json!([{ "userId": "$userId", "sharedOn": { "$gt": "$fromWhen:timestamp" } }, "plain"]);
        let found: Vec<(&str, Option<&str>)> = placeholders(&template)
            .into_iter()
            .map(|p| (p.path, p.value_type))
            .collect();
        assert_eq!(
            found,
            vec![("fromWhen", Some("timestamp")), ("userId", None)]
        );
    }
}
