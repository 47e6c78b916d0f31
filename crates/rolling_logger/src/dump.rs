//! Debug dumps of arbitrary serializable values.
//!
//! These helpers sit outside the logging core: they only produce text, which the
//! [`dump!`](crate::dump) and [`dump_struct!`](crate::dump_struct) macros hand to a
//! [`Logger`](crate::Logger).

use std::fmt::Write;

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Value};

use crate::LoggerError;

/// Line printed around every JSON block.
pub const SEPARATOR_LINE: &str = "...................................................";

/// Indentation unit of the struct tree.
const TREE_INDENT: &str = "... ";

/// Serializes `value` as JSON indented with tabs.
///
/// # Errors
///
/// Returns [`LoggerError::JsonSerialization`] if the value cannot be represented as JSON, e.g.
/// a map with non-string keys.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, LoggerError> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Like [`to_pretty_json`], but renders serialization failures inline instead of failing.
pub fn to_debug_json<T: Serialize + ?Sized>(value: &T) -> String {
    to_pretty_json(value).unwrap_or_else(|error| format!("<unserializable: {error}>"))
}

/// One dump block: a separator line followed by the JSON text.
#[doc(hidden)]
pub fn json_block<T: Serialize + ?Sized>(value: &T) -> String {
    format!("\n{SEPARATOR_LINE}\n{}", to_debug_json(value))
}

/// The separator closing a sequence of [`json_block`]s.
#[doc(hidden)]
pub fn closing_separator() -> String {
    format!("\n{SEPARATOR_LINE}\n")
}

/// Renders `value` as an indented field tree, one `name (kind) = <value>` line per scalar and a
/// braced section per nested object or array.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Peer {
///     addr: String,
///     port: u16,
/// }
///
/// let tree = rolling_logger::dump::struct_tree(
///     "peer",
///     &Peer {
///         addr: "10.0.0.1".to_string(),
///         port: 4000,
///     },
/// );
/// assert_eq!(
///     tree,
///     "peer (object) {\n... addr (string) = \"10.0.0.1\"\n... port (number) = <4000>\n}\n"
/// );
/// ```
pub fn struct_tree<T: Serialize + ?Sized>(name: &str, value: &T) -> String {
    let mut out = String::new();
    match serde_json::to_value(value) {
        Ok(value) => write_node(&mut out, 0, name, &value),
        Err(error) => {
            let _ = writeln!(out, "{name} = <unserializable: {error}>");
        }
    }
    out
}

fn write_node(out: &mut String, depth: usize, name: &str, value: &Value) {
    let indent = TREE_INDENT.repeat(depth);
    let _ = match value {
        Value::Null => writeln!(out, "{indent}{name} (null) = <nil>"),
        Value::Bool(flag) => writeln!(out, "{indent}{name} (bool) = <{flag}>"),
        Value::Number(number) => writeln!(out, "{indent}{name} (number) = <{number}>"),
        Value::String(text) => writeln!(out, "{indent}{name} (string) = \"{text}\""),
        Value::Array(items) => {
            let _ = writeln!(out, "{indent}{name} (array) [");
            for (index, item) in items.iter().enumerate() {
                write_node(out, depth + 1, &format!("[{index}]"), item);
            }
            writeln!(out, "{indent}]")
        }
        Value::Object(fields) => {
            let _ = writeln!(out, "{indent}{name} (object) {{");
            for (field, item) in fields {
                write_node(out, depth + 1, field, item);
            }
            writeln!(out, "{indent}}}")
        }
    };
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Inner {
        sub_int: i32,
        sub_str: &'static str,
    }

    #[derive(Serialize)]
    struct Outer {
        name: Option<String>,
        ratio: f64,
        tags: Vec<&'static str>,
        inner: Inner,
    }

    fn sample() -> Outer {
        Outer {
            name: None,
            ratio: 0.5,
            tags: vec!["a"],
            inner: Inner {
                sub_int: 1,
                sub_str: "sub",
            },
        }
    }

    #[test]
    fn pretty_json_is_tab_indented() {
        let json = to_pretty_json(&Inner {
            sub_int: 7,
            sub_str: "x",
        })
        .expect("serialization failed");
        assert_eq!(json, "{\n\t\"sub_int\": 7,\n\t\"sub_str\": \"x\"\n}");
    }

    #[test]
    fn unserializable_values_are_rendered_inline() {
        let mut map = BTreeMap::new();
        map.insert(vec![1_u8], "non-string key");
        assert!(to_debug_json(&map).starts_with("<unserializable: "));
    }

    #[test]
    fn json_blocks_are_separated() {
        let text = format!("{}{}", json_block(&1), closing_separator());
        assert_eq!(text, format!("\n{SEPARATOR_LINE}\n1\n{SEPARATOR_LINE}\n"));
    }

    #[test]
    fn struct_tree_nests_objects_and_arrays() {
        let expected = "\
sample (object) {
... inner (object) {
... ... sub_int (number) = <1>
... ... sub_str (string) = \"sub\"
... }
... name (null) = <nil>
... ratio (number) = <0.5>
... tags (array) [
... ... [0] (string) = \"a\"
... ]
}
";
        assert_eq!(struct_tree("sample", &sample()), expected);
    }
}
