//! The merged template data context and dotted-path value resolution.
//!
//! Data is a JSON object map; lookups traverse nested objects by key and
//! arrays by numeric segment. A missing path resolves to `None`, never an
//! error: conditionals treat it as "does not exist" and interpolation
//! renders it empty.

use serde_json::Value;

pub type DataMap = serde_json::Map<String, Value>;

/// Resolves a dotted path (`user.address.0.city`) against the data map.
pub fn data_get<'a>(data: &'a DataMap, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = data.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolves a semicolon-delimited `[name:]path` parameter list.
///
/// A single unnamed entry yields its value directly (`Null` on a miss);
/// anything else yields an object, so one attribute can pass several named
/// parameters to `include`/`pagination`.
pub fn get_value(attribute: &str, data: &DataMap) -> Value {
    let parameters: Vec<&str> = attribute.split(';').collect();
    if parameters.len() == 1 && !parameters[0].contains(':') {
        return data_get(data, parameters[0]).cloned().unwrap_or(Value::Null);
    }
    let mut result = DataMap::new();
    for (i, parameter) in parameters.iter().enumerate() {
        match parameter.split_once(':') {
            Some((name, path)) => {
                let value = data_get(data, path).cloned().unwrap_or(Value::Null);
                result.insert(name.to_string(), value);
            }
            None => {
                let value = data_get(data, parameter).cloned().unwrap_or(Value::Null);
                result.insert(i.to_string(), value);
            }
        }
    }
    Value::Object(result)
}

/// Presence test used by `exists`/`empty`: the path resolves to a
/// non-null value.
pub fn has_value(attribute: &str, data: &DataMap) -> bool {
    data_get(data, attribute).is_some_and(|v| !v.is_null())
}

/// Stringifies a scalar the way template output expects: no quotes around
/// strings, `null` renders empty.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Replaces `{dotted.path}` placeholders using a caller-supplied resolver.
/// A brace run that is not a well-formed placeholder is left verbatim.
pub fn interpolate_with(template: &str, mut resolve: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder(&after[..close]) => {
                out.push_str(&resolve(&after[..close]));
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replaces `{dotted.path}` placeholders with resolved data values.
pub fn interpolate(template: &str, data: &DataMap) -> String {
    interpolate_with(template, |path| {
        value_to_string(&get_value(path, data))
    })
}

fn is_placeholder(inner: &str) -> bool {
    !inner.is_empty()
        && inner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// The truthiness rules the `auth` directive applies to its literal
/// argument: "1", "true", "on" and "yes" are true, anything else false.
pub fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// Loose scalar equality for `match`/`nomatch`: both sides compare by
/// their string rendering, so `"5"` matches `5` and a miss matches `""`.
pub fn loosely_equal(left: &Value, right: &Value) -> bool {
    value_to_string(left) == value_to_string(right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> DataMap {
        let Value::Object(map) = json!({
            "user": { "name": "Ada", "roles": ["admin", "editor"] },
            "count": 5,
            "flag": true,
            "nothing": null
        }) else {
            unreachable!()
        };
        map
    }

    #[test]
    fn test_data_get_traverses_maps_and_arrays() {
        let data = fixture();
        assert_eq!(data_get(&data, "user.name"), Some(&json!("Ada")));
        assert_eq!(data_get(&data, "user.roles.1"), Some(&json!("editor")));
        assert_eq!(data_get(&data, "user.missing"), None);
        assert_eq!(data_get(&data, "count.anything"), None);
    }

    #[test]
    fn test_get_value_single_and_named_lists() {
        let data = fixture();
        assert_eq!(get_value("user.name", &data), json!("Ada"));
        assert_eq!(get_value("missing.path", &data), Value::Null);
        assert_eq!(
            get_value("who:user.name;n:count", &data),
            json!({"who": "Ada", "n": 5})
        );
        assert_eq!(
            get_value("user.name;count", &data),
            json!({"0": "Ada", "1": 5})
        );
    }

    #[test]
    fn test_has_value_treats_null_as_missing() {
        let data = fixture();
        assert!(has_value("count", &data));
        assert!(!has_value("nothing", &data));
        assert!(!has_value("absent", &data));
    }

    #[test]
    fn test_interpolate_placeholders() {
        let data = fixture();
        assert_eq!(
            interpolate("Hello {user.name}, you have {count}.", &data),
            "Hello Ada, you have 5."
        );
        assert_eq!(interpolate("{missing} end", &data), " end");
        // Braces that are not placeholders stay verbatim.
        assert_eq!(interpolate("a {not valid} b", &data), "a {not valid} b");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("YES"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("0"));
    }

    #[test]
    fn test_loose_equality() {
        assert!(loosely_equal(&json!("5"), &json!(5)));
        assert!(loosely_equal(&Value::Null, &json!("")));
        assert!(!loosely_equal(&json!("a"), &json!("b")));
    }
}
