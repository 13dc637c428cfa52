/*!
    Field-name → value records produced by every parser.

    A record is built once, in field order, and then only read. Rendering
    follows one set of rules for every record kind:
    - byte strings as base64 (short ones, up to 32 bytes, also as hex)
    - integers with thousands grouping
    - enumerated integers as `NAME (n)`
    - booleans as `Enabled` / `Disabled`
    - absent values as `N/A`
*/

use core::fmt;

use crate::utils::group_thousands;

/**
    Byte strings up to this length are rendered with a hex form alongside base64.
*/
const HEX_PREVIEW_MAX: usize = 32;

/**
    A single typed field value.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Fixed or variable-length byte string.
    Bytes(Vec<u8>),
    /// Unsigned integer.
    UInt(u64),
    /// Enumerated small integer, with its name when the value is known.
    Enum {
        value: u64,
        name: Option<&'static str>,
    },
    Bool(bool),
    /// Pre-rendered diagnostic text.
    Text(String),
    Absent,
}

impl FieldValue {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::UInt(v) | Self::Enum { value: v, .. } => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    /**
        Human-readable rendering of this value.
    */
    pub fn render(&self) -> String {
        match self {
            Self::Bytes(b) if b.is_empty() => "(empty)".to_owned(),
            Self::Bytes(b) if b.len() <= HEX_PREVIEW_MAX => {
                format!("{} (hex {})", data_encoding::BASE64.encode(b), hex::encode(b))
            }
            Self::Bytes(b) => format!(
                "{} ({} bytes)",
                data_encoding::BASE64.encode(b),
                group_thousands(b.len() as u64)
            ),
            Self::UInt(v) => group_thousands(*v),
            Self::Enum {
                value,
                name: Some(name),
            } => format!("{name} ({value})"),
            Self::Enum { value, name: None } => format!("Unknown ({value})"),
            Self::Bool(true) => "Enabled".to_owned(),
            Self::Bool(false) => "Disabled".to_owned(),
            Self::Text(t) => t.clone(),
            Self::Absent => "N/A".to_owned(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/**
    Ordered list of named fields.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Append a field. Used while a parser builds the record; names are
        expected to be unique within one record.
    */
    pub fn push(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.push((name.into(), value));
    }

    /**
        Builder-style variant of [`Record::push`].
    */
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_rules() {
        assert_eq!(FieldValue::UInt(1234).render(), "1,234");
        assert_eq!(FieldValue::Bool(true).render(), "Enabled");
        assert_eq!(FieldValue::Bool(false).render(), "Disabled");
        assert_eq!(FieldValue::Absent.render(), "N/A");
        assert_eq!(
            FieldValue::Enum {
                value: 2,
                name: Some("ANDROID")
            }
            .render(),
            "ANDROID (2)"
        );
        assert_eq!(
            FieldValue::Enum {
                value: 9,
                name: None
            }
            .render(),
            "Unknown (9)"
        );
        assert_eq!(FieldValue::Text("0x395D7A27".into()).render(), "0x395D7A27");
    }

    #[test]
    fn render_bytes() {
        assert_eq!(
            FieldValue::Bytes(b"PRD".to_vec()).render(),
            "UFJE (hex 505244)"
        );
        assert_eq!(FieldValue::Bytes(vec![]).render(), "(empty)");
        let long = FieldValue::Bytes(vec![0u8; 1500]).render();
        assert!(long.ends_with("(1,500 bytes)"));
    }

    #[test]
    fn record_preserves_order_and_lookup() {
        let record = Record::new()
            .with("signature", FieldValue::Bytes(b"WVD".to_vec()))
            .with("version", FieldValue::UInt(2))
            .with("flags", FieldValue::Absent);
        assert_eq!(
            record.names().collect::<Vec<_>>(),
            ["signature", "version", "flags"]
        );
        assert_eq!(record.get("version").and_then(FieldValue::as_uint), Some(2));
        assert!(record.contains("flags"));
        assert!(!record.contains("vmp"));
        assert_eq!(record.len(), 3);
    }
}
