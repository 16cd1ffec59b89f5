//! Structured value to JSON text conversion

use serde_json::Value;

/// Turns structured content into JSON text.
pub trait Converter: Send + Sync + 'static {
    /// Whether output is pretty printed.
    fn is_pretty(&self) -> bool;

    /// Serializes `value`.
    fn to_json(&self, value: &Value) -> String;

    /// Re-formats a JSON object held in `text`.
    ///
    /// Returns `text` unchanged if it is not a well-formed JSON object.
    fn parse_string(&self, text: &str) -> String;
}

/// [`Converter`] backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter {
    pretty: bool,
}

impl JsonConverter {
    /// Converter producing indented JSON.
    #[must_use]
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Converter producing single-line JSON.
    #[must_use]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Converter for JsonConverter {
    fn is_pretty(&self) -> bool {
        self.pretty
    }

    fn to_json(&self, value: &Value) -> String {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.unwrap_or_else(|_| value.to_string())
    }

    fn parse_string(&self, text: &str) -> String {
        match serde_json::from_str::<Value>(text) {
            Ok(value @ Value::Object(_)) => self.to_json(&value),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_json() {
        let value = json!({ "name": "Xiao Ming", "age": 19 });
        let compact = JsonConverter::compact().to_json(&value);
        assert_eq!(compact, r#"{"age":19,"name":"Xiao Ming"}"#);

        let pretty = JsonConverter::pretty().to_json(&value);
        assert!(pretty.contains('\n'));
        assert_eq!(serde_json::from_str::<Value>(&pretty).unwrap(), value);
    }

    #[test]
    fn test_parse_string_pretty_prints_objects() {
        let parsed = JsonConverter::pretty().parse_string(r#"{"a":{"b":1}}"#);
        assert_eq!(parsed, "{\n  \"a\": {\n    \"b\": 1\n  }\n}");
    }

    #[test]
    fn test_parse_string_falls_back_to_input() {
        let converter = JsonConverter::pretty();
        assert_eq!(converter.parse_string("{not json"), "{not json");
        assert_eq!(converter.parse_string("[1, 2]"), "[1, 2]");
        assert_eq!(converter.parse_string("plain text"), "plain text");
    }
}
