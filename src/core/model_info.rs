//! Model metadata parsed from `ollama show`

use regex_lite::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::OnceLock;

/// Two or more whitespace characters separating a column-layout key and value
fn column_gap() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\s{2,}").expect("Invalid column gap regex"))
}

/// Field name to value, in the order the fields were printed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelInfo {
    fields: Vec<(String, String)>,
}

impl ModelInfo {
    /// Parse a key/value text block.
    ///
    /// Accepts `Key: value` lines and the column layout `ollama show` prints
    /// (`context length    4096`), splitting at whichever separator comes
    /// first. Lines without a separator, such as section headings, are
    /// skipped. A repeated key keeps its first position and its last value.
    pub fn parse(text: &str) -> Self {
        let mut info = ModelInfo::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let colon = line.find(':').map(|at| (at, at + 1));
            let gap = column_gap().find(line).map(|m| (m.start(), m.end()));
            let (key_end, value_start) = match (colon, gap) {
                (Some(c), Some(g)) => {
                    if c.0 < g.0 {
                        c
                    } else {
                        g
                    }
                }
                (Some(c), None) => c,
                (None, Some(g)) => g,
                (None, None) => continue,
            };

            let key = normalize_key(&line[..key_end]);
            if key.is_empty() {
                continue;
            }
            info.insert(key, line[value_start..].trim().to_string());
        }

        info
    }

    fn insert(&mut self, key: String, value: String) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Look up a field by its normalized name
    #[allow(dead_code)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ModelInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Lower-case a field name and collapse whitespace runs into `_`
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Result of looking a model up with `ollama show`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", content = "details", rename_all = "snake_case")]
pub enum ModelLookup {
    Found(ModelInfo),
    NotFound,
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Context Length"), "context_length");
        assert_eq!(normalize_key("  Embedding \t  Length "), "embedding_length");
        assert_eq!(normalize_key("License"), "license");
        assert_eq!(normalize_key("   "), "");
    }

    #[test]
    fn test_parse_colon_block() {
        let info = ModelInfo::parse("Architecture: llama\nParameter Size: 7B\nQuantization:Q4_0\n");

        assert_eq!(info.iter().count(), 3);
        assert_eq!(info.get("architecture"), Some("llama"));
        assert_eq!(info.get("parameter_size"), Some("7B"));
        assert_eq!(info.get("quantization"), Some("Q4_0"));
    }

    #[test]
    fn test_parse_column_layout() {
        let text = "  Model\n    architecture        llama\n    parameters          8.0B\n    context length      131072\n\n  License\n    LLAMA 3.1 COMMUNITY LICENSE AGREEMENT\n";
        let info = ModelInfo::parse(text);

        assert_eq!(info.get("architecture"), Some("llama"));
        assert_eq!(info.get("parameters"), Some("8.0B"));
        assert_eq!(info.get("context_length"), Some("131072"));
        // Headings have no separator
        assert_eq!(info.get("model"), None);
    }

    #[test]
    fn test_value_may_contain_colon() {
        let info = ModelInfo::parse("Source: https://ollama.com/library\nstop    \"<|eot|>: end\"\n");

        assert_eq!(info.get("source"), Some("https://ollama.com/library"));
        assert_eq!(info.get("stop"), Some("\"<|eot|>: end\""));
    }

    #[test]
    fn test_repeated_key_keeps_order_and_last_value() {
        let info = ModelInfo::parse("a: 1\nb: 2\na: 3\n");
        let fields: Vec<_> = info.iter().collect();
        assert_eq!(fields, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(ModelInfo::parse("").is_empty());
        assert!(ModelInfo::parse("\n  \n").is_empty());
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let info = ModelInfo::parse("Zeta: 1\nAlpha: 2\n");
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"zeta":"1","alpha":"2"}"#);
    }
}
