//! Placeholder leaf parsing and context lookup.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static VALUE_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid value type regex"));

/// Parsed `$path[:type]` leaf borrowed from a template string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Dotted lookup path, without the leading `$`.
    pub path: &'a str,
    /// Declared value type. Informational only; never used to coerce.
    pub value_type: Option<&'a str>,
}

impl<'a> Placeholder<'a> {
    /// Parses a template leaf.
    ///
    /// Every `$`-prefixed string is a placeholder; anything else is a literal.
    /// A trailing `:type` is split off at the last `:` when it is a type name,
    /// otherwise the whole remainder is the path.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let body = raw.strip_prefix('$')?;
        match body.rsplit_once(':') {
            Some((path, value_type)) if VALUE_TYPE_RE.is_match(value_type) => Some(Self {
                path,
                value_type: Some(value_type),
            }),
            _ => Some(Self {
                path: body,
                value_type: None,
            }),
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &'a str> {
        self.path.split('.')
    }

    /// Looks the path up in `context`.
    ///
    /// Objects are descended by key and arrays by numeric index. Any missing
    /// step yields `None`.
    pub fn resolve<'v>(&self, context: &'v Value) -> Option<&'v Value> {
        self.segments().try_fold(context, |current, segment| match current {
            Value::Object(entries) => entries.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        })
    }
}

/// Builds a placeholder leaf string.
pub fn format_placeholder(path: &str, value_type: Option<&str>) -> String {
    match value_type {
        Some(value_type) => format!("${path}:{value_type}"),
        None => format!("${path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_placeholder, Placeholder};
    use serde_json::json;

    #[test]
    fn parses_typed_and_untyped_placeholders() {
        assert_eq!(
            Placeholder::parse("$displayName:string"),
            Some(Placeholder {
                path: "displayName",
                value_type: Some("string")
            })
        );
        assert_eq!(
            Placeholder::parse("$id:auto-pk").and_then(|p| p.value_type),
            Some("auto-pk")
        );
        assert_eq!(
            Placeholder::parse("$context.user.id"),
            Some(Placeholder {
                path: "context.user.id",
                value_type: None
            })
        );
    }

    #[test]
    fn only_dollar_prefixed_strings_are_placeholders() {
        for literal in ["displayName", "price $x", "", " $x"] {
            assert!(
                Placeholder::parse(literal).is_none(),
                "`{literal}` should be a literal"
            );
        }
    }

    #[test]
    fn any_dollar_prefixed_path_is_accepted() {
        let cases = [
            ("$user-id", "user-id", None),
            ("$first name", "first name", None),
            ("$0", "0", None),
            ("$5 off", "5 off", None),
            ("$user-id:int", "user-id", Some("int")),
            ("$a:b:auto-pk", "a:b", Some("auto-pk")),
            ("$name:", "name:", None),
            ("$time:12 00", "time:12 00", None),
        ];
        for (raw, path, value_type) in cases {
            assert_eq!(
                Placeholder::parse(raw),
                Some(Placeholder { path, value_type }),
                "`{raw}` should parse"
            );
        }
    }

    #[test]
    fn resolves_nested_paths_and_array_indices() {
        let context = json!({
            "context": { "user": { "id": 7 } },
            "order": ["displayName", "createdWhen"]
        });
        let user = Placeholder::parse("$context.user.id").unwrap();
        assert_eq!(user.resolve(&context), Some(&json!(7)));

        let second = Placeholder::parse("$order.1").unwrap();
        assert_eq!(second.resolve(&context), Some(&json!("createdWhen")));

        let missing = Placeholder::parse("$context.user.name").unwrap();
        assert_eq!(missing.resolve(&context), None);

        let through_scalar = Placeholder::parse("$context.user.id.value").unwrap();
        assert_eq!(through_scalar.resolve(&context), None);
    }

    #[test]
    fn formats_placeholders() {
        assert_eq!(format_placeholder("spam", Some("text")), "$spam:text");
        assert_eq!(format_placeholder("creator", None), "$creator");
    }
}
