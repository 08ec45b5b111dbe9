//! Pretty-printing of locals for the source preview.
//!
//! Values are written in JSON literal syntax, indented two spaces per level,
//! but object keys that are plain identifiers lose their quotes, so the
//! output reads like a hand-written invocation:
//!
//! ```text
//! title: "Settings",
//!   items: [
//!     1,
//!     2
//!   ],
//!   meta: {
//!     owner: "ada",
//!     "data-id": 7
//!   }
//! ```

use serde_json::Value;

use crate::error::Result;
use crate::locals::Locals;

const INDENT: &str = "  ";

/// Formats locals as the argument list of an invocation.
///
/// The first pair is written inline; every following pair starts a new line
/// indented one level. Returns `None` for empty locals.
pub fn pretty_locals(locals: &Locals) -> Result<Option<String>> {
    if locals.is_empty() {
        return Ok(None);
    }

    let mut out = String::new();
    for (index, (key, value)) in locals.iter().enumerate() {
        if index > 0 {
            out.push_str(",\n");
            out.push_str(INDENT);
        }
        write_key(&mut out, key)?;
        write_value(&mut out, value, 1)?;
    }
    Ok(Some(out))
}

/// Formats a value as a braced block with unquoted identifier keys.
pub fn pretty_value(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_value(&mut out, value, 0)?;
    Ok(out)
}

/// True if `key` can be written without quotes.
pub fn is_bare_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn write_key(out: &mut String, key: &str) -> Result<()> {
    if is_bare_key(key) {
        out.push_str(key);
    } else {
        out.push_str(&serde_json::to_string(key)?);
    }
    out.push_str(": ");
    Ok(())
}

fn write_value(out: &mut String, value: &Value, level: usize) -> Result<()> {
    match value {
        Value::Object(map) if !map.is_empty() => {
            out.push_str("{\n");
            for (index, (key, item)) in map.iter().enumerate() {
                if index > 0 {
                    out.push_str(",\n");
                }
                indent(out, level + 1);
                write_key(out, key)?;
                write_value(out, item, level + 1)?;
            }
            out.push('\n');
            indent(out, level);
            out.push('}');
        }
        Value::Array(items) if !items.is_empty() => {
            out.push_str("[\n");
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(",\n");
                }
                indent(out, level + 1);
                write_value(out, item, level + 1)?;
            }
            out.push('\n');
            indent(out, level);
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn locals(value: Value) -> Locals {
        Locals::try_from(value).unwrap()
    }

    #[test]
    fn test_empty_locals() {
        assert_eq!(pretty_locals(&Locals::new()).unwrap(), None);
    }

    #[test]
    fn test_single_pair_inline() {
        let out = pretty_locals(&locals(json!({"name": "Ada"}))).unwrap().unwrap();
        assert_eq!(out, r#"name: "Ada""#);
    }

    #[test]
    fn test_multiple_pairs() {
        let out = pretty_locals(&locals(json!({"name": "Ada", "age": 36, "admin": true})))
            .unwrap()
            .unwrap();
        assert_eq!(out, "name: \"Ada\",\n  age: 36,\n  admin: true");
    }

    #[test]
    fn test_nested_values() {
        let out = pretty_locals(&locals(json!({
            "title": "Settings",
            "items": [1, 2],
            "meta": {"owner": "ada", "data-id": 7}
        })))
        .unwrap()
        .unwrap();

        let expected = r#"title: "Settings",
  items: [
    1,
    2
  ],
  meta: {
    owner: "ada",
    "data-id": 7
  }"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_containers_and_null() {
        let out = pretty_locals(&locals(json!({"a": [], "b": {}, "c": null})))
            .unwrap()
            .unwrap();
        assert_eq!(out, "a: [],\n  b: {},\n  c: null");
    }

    #[test]
    fn test_string_escapes() {
        let out = pretty_locals(&locals(json!({"quote": "say \"hi\"\n"})))
            .unwrap()
            .unwrap();
        assert_eq!(out, r#"quote: "say \"hi\"\n""#);
    }

    #[test]
    fn test_pretty_value_braced() {
        let out = pretty_value(&json!({"title": {"type": "string", "required": true}})).unwrap();
        assert_eq!(
            out,
            "{\n  title: {\n    type: \"string\",\n    required: true\n  }\n}"
        );
    }

    #[test]
    fn test_bare_keys() {
        assert!(is_bare_key("name"));
        assert!(is_bare_key("item_2"));
        assert!(!is_bare_key("data-id"));
        assert!(!is_bare_key("two words"));
        assert!(!is_bare_key(""));
    }

    proptest! {
        /// Every identifier key appears unquoted, followed by a colon.
        #[test]
        fn identifier_keys_are_unquoted(
            entries in prop::collection::btree_map("[a-z][a-z0-9_]{0,8}", any::<i32>(), 1..6)
        ) {
            let mut l = Locals::new();
            for (key, value) in &entries {
                l.insert(key.clone(), value).unwrap();
            }
            let out = pretty_locals(&l).unwrap().unwrap();
            for (key, value) in &entries {
                let quoted = format!("\"{}\":", key);
                let bare = format!("{}: {}", key, value);
                prop_assert!(out.contains(&bare));
                prop_assert!(!out.contains(&quoted));
            }
            prop_assert_eq!(out.lines().count(), entries.len());
        }
    }
}
