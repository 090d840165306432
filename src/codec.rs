//! JSON codec for every wire type in the SDK.
//!
//! Encoding writes only populated optional fields. A codec built with
//! [`Codec::with_emit_defaults`] additionally writes declared-default scalar
//! fields (for example `turnComplete: false`), as described by each type's
//! [`WireDefaults`] impl.
//!
//! Decoding ignores unknown keys at every level and reports schema violations
//! as [`Error::Decode`] with the path of the offending field.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Declared-default scalar fields a type skips when they hold their default.
pub trait WireDefaults {
    /// Writes the skipped defaults back into `value`, the serialized form of
    /// `self`. Nested wire types are visited through [`fill_field`].
    fn fill_defaults(&self, _value: &mut Value) {}
}

impl<T: WireDefaults> WireDefaults for Option<T> {
    fn fill_defaults(&self, value: &mut Value) {
        if let Some(inner) = self {
            inner.fill_defaults(value);
        }
    }
}

impl<T: WireDefaults> WireDefaults for Vec<T> {
    fn fill_defaults(&self, value: &mut Value) {
        if let Value::Array(items) = value {
            for (item, slot) in self.iter().zip(items.iter_mut()) {
                item.fill_defaults(slot);
            }
        }
    }
}

/// Implements [`WireDefaults`] for types with no declared-default scalars.
macro_rules! no_wire_defaults {
    ($($ty:ty),* $(,)?) => {
        $(impl $crate::codec::WireDefaults for $ty {})*
    };
}
pub(crate) use no_wire_defaults;

/// Inserts `key: default` into an object when the key is absent.
pub(crate) fn insert_default(value: &mut Value, key: &str, default: Value) {
    if let Value::Object(map) = value {
        map.entry(key.to_string()).or_insert(default);
    }
}

/// Fills declared defaults of a nested field serialized under `key`.
pub(crate) fn fill_field<T: WireDefaults + ?Sized>(value: &mut Value, key: &str, field: &T) {
    if let Some(inner) = value.get_mut(key) {
        field.fill_defaults(inner);
    }
}

/// Reads a JSON value that is present on the wire, `null` included, as
/// `Some`. Used with `#[serde(default)]` so only a missing key gives `None`.
pub(crate) fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

pub(crate) fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// Stateless JSON encoder/decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Codec {
    emit_defaults: bool,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include declared-default scalar fields even when they hold their default.
    pub fn with_emit_defaults(mut self, emit_defaults: bool) -> Self {
        self.emit_defaults = emit_defaults;
        self
    }

    pub fn emit_defaults(&self) -> bool {
        self.emit_defaults
    }

    pub fn encode<T: Serialize + WireDefaults>(&self, message: &T) -> Result<String> {
        if !self.emit_defaults {
            return Ok(serde_json::to_string(message)?);
        }

        let mut value = serde_json::to_value(message)?;
        message.fill_defaults(&mut value);
        Ok(serde_json::to_string(&value)?)
    }

    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        let mut deserializer = serde_json::Deserializer::from_str(text);
        let decoded = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            let path = e.path().to_string();
            decode_error(path, e.into_inner(), text)
        })?;
        deserializer
            .end()
            .map_err(|e| decode_error(String::new(), e, text))?;
        Ok(decoded)
    }
}

fn decode_error(path: String, source: serde_json::Error, raw: &str) -> Error {
    // serde_path_to_error renders the document root as "."
    let path = if path == "." { String::new() } else { path };
    Error::Decode {
        path,
        message: source.to_string(),
        raw: raw.to_string(),
    }
}

/// Encodes with the default codec (no emitted defaults).
pub fn encode<T: Serialize + WireDefaults>(message: &T) -> Result<String> {
    Codec::default().encode(message)
}

/// Decodes with the default codec.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    Codec::default().decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, GenerationConfig, Part, Status};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_encode_omits_absent_optional_fields() {
        let config = GenerationConfig {
            temperature: Some(0.5),
            ..Default::default()
        };

        let text = encode(&config).unwrap();
        assert_eq!(text, r#"{"temperature":0.5}"#);
    }

    #[test]
    fn test_emit_defaults_writes_declared_default_scalars() {
        let status = Status::default();

        assert_eq!(encode(&status).unwrap(), "{}");

        let codec = Codec::new().with_emit_defaults(true);
        let value: Value = serde_json::from_str(&codec.encode(&status).unwrap()).unwrap();
        assert_eq!(value, json!({"code": 0, "message": ""}));
    }

    #[test]
    fn test_emit_defaults_keeps_populated_values() {
        let status = Status {
            code: 3,
            message: "bad request".to_string(),
            details: Vec::new(),
        };

        let codec = Codec::new().with_emit_defaults(true);
        let value: Value = serde_json::from_str(&codec.encode(&status).unwrap()).unwrap();
        assert_eq!(value, json!({"code": 3, "message": "bad request"}));
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let content: Content = decode(
            r#"{"role":"model","futureField":{"a":1},"parts":[{"text":"hi","thoughtSignature":"x"}]}"#,
        )
        .unwrap();

        assert_eq!(content, Content::model_text("hi"));
    }

    #[test]
    fn test_decode_reports_field_path() {
        let err = decode::<Content>(r#"{"role": 7, "parts": []}"#).unwrap_err();

        match err {
            Error::Decode { path, raw, .. } => {
                assert_eq!(path, "role");
                assert_eq!(raw, r#"{"role": 7, "parts": []}"#);
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let err = decode::<Content>("{\"parts\": [").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_decode_rejects_trailing_characters() {
        let err = decode::<Status>(r#"{"code": 1} extra"#).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_roundtrip_content_with_mixed_parts() {
        let content = Content {
            role: Some("user".to_string()),
            parts: vec![
                Part::text("describe this"),
                Part::InlineData {
                    inline_data: crate::types::Blob::from_bytes("image/png", &[1, 2, 3]).unwrap(),
                },
            ],
        };

        let decoded: Content = decode(&encode(&content).unwrap()).unwrap();
        assert_eq!(decoded, content);
    }
}
