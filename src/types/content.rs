//! Conversation content: turns, parts, and binary blobs.

use super::mime::detect_mime;
use crate::codec::{no_wire_defaults, present_value};
use crate::{Error, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One turn of a conversation.
///
/// A turn with zero parts is valid; it simply carries nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A role-less turn holding a single text part (system instructions).
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of every text part, or `None` when there is none.
    pub fn joined_text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();

        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

/// One piece of a turn. Exactly one data key per part.
///
/// Decoding dispatches on the key: a part carrying a known key must match
/// that shape exactly, and a part with no known key lands in [`Part::Other`]
/// so newer part kinds do not break decoding. Sibling keys such as
/// `thoughtSignature` are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, try_from = "RawPart")]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    Other(Map<String, Value>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPart {
    text: Option<String>,
    inline_data: Option<Blob>,
    file_data: Option<FileData>,
    function_call: Option<FunctionCall>,
    function_response: Option<FunctionResponse>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawPart> for Part {
    type Error = String;

    fn try_from(raw: RawPart) -> std::result::Result<Self, Self::Error> {
        let mut parts = Vec::new();
        if let Some(text) = raw.text {
            parts.push(Part::Text { text });
        }
        if let Some(inline_data) = raw.inline_data {
            parts.push(Part::InlineData { inline_data });
        }
        if let Some(file_data) = raw.file_data {
            parts.push(Part::FileData { file_data });
        }
        if let Some(function_call) = raw.function_call {
            parts.push(Part::FunctionCall { function_call });
        }
        if let Some(function_response) = raw.function_response {
            parts.push(Part::FunctionResponse { function_response });
        }

        match parts.len() {
            0 => Ok(Part::Other(raw.rest)),
            1 => Ok(parts.remove(0)),
            n => Err(format!("part carries {} data kinds, expected one", n)),
        }
    }
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn blob(blob: Blob) -> Self {
        Part::InlineData { inline_data: blob }
    }
}

/// Binary payload carried inline as base64.
///
/// Constructors guarantee a non-empty MIME type and valid base64 data.
/// Decoding checks the same invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBlob")]
pub struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlob {
    mime_type: String,
    data: String,
}

impl TryFrom<RawBlob> for Blob {
    type Error = String;

    fn try_from(raw: RawBlob) -> std::result::Result<Self, Self::Error> {
        Blob::from_base64(raw.mime_type, raw.data).map_err(|e| e.to_string())
    }
}

impl Blob {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let mime_type = validate_mime_type(mime_type.into())?;
        Ok(Self {
            mime_type,
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        })
    }

    pub fn from_base64(mime_type: impl Into<String>, data: impl Into<String>) -> Result<Self> {
        let mime_type = validate_mime_type(mime_type.into())?;
        let data = data.into();
        base64::engine::general_purpose::STANDARD
            .decode(&data)
            .map_err(|e| Error::Protocol(format!("Blob data is not valid base64: {}", e)))?;
        Ok(Self { mime_type, data })
    }

    /// Builds a blob whose MIME type is sniffed from the leading bytes.
    pub fn detect(bytes: &[u8]) -> Self {
        Self {
            mime_type: detect_mime(bytes).to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 payload as it appears on the wire.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn bytes(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| Error::Protocol(format!("Blob data is not valid base64: {}", e)))
    }
}

fn validate_mime_type(mime_type: String) -> Result<String> {
    if mime_type.trim().is_empty() {
        return Err(Error::Protocol("Blob MIME type must not be empty".to_string()));
    }
    Ok(mime_type)
}

/// Reference to a previously uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub file_uri: String,
}

/// Model request to invoke a declared function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub args: Option<Value>,
}

/// Caller-supplied result of a [`FunctionCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub response: Value,
}

no_wire_defaults!(Content, Part, Blob, FileData, FunctionCall, FunctionResponse);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use serde_json::json;

    #[test]
    fn test_blob_serializes_camel_case() {
        let blob = Blob::from_bytes("audio/pcm;rate=16000", b"abc").unwrap();

        let value: Value = serde_json::from_str(&encode(&blob).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"mimeType": "audio/pcm;rate=16000", "data": "YWJj"})
        );
        assert_eq!(blob.bytes().unwrap(), b"abc");
    }

    #[test]
    fn test_blob_rejects_empty_mime_type() {
        assert!(Blob::from_bytes("", b"abc").is_err());
        assert!(Blob::from_bytes("   ", b"abc").is_err());
    }

    #[test]
    fn test_blob_rejects_invalid_base64() {
        assert!(Blob::from_base64("image/png", "not base64!").is_err());
        assert!(Blob::from_base64("image/png", "YWJj").is_ok());
    }

    #[test]
    fn test_blob_detect_sniffs_mime_type() {
        let blob = Blob::detect(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]);
        assert_eq!(blob.mime_type(), "image/png");
    }

    #[test]
    fn test_empty_content_is_valid() {
        let content: Content = decode(r#"{"role":"model"}"#).unwrap();
        assert!(content.parts.is_empty());
        assert_eq!(content.joined_text(), None);
    }

    #[test]
    fn test_part_variants_decode_by_key() {
        let content: Content = decode(
            r#"{"parts":[
                {"text":"a"},
                {"inlineData":{"mimeType":"image/jpeg","data":"AAEC"}},
                {"fileData":{"fileUri":"files/abc"}},
                {"functionCall":{"name":"lookup","args":{"q":"x"}}},
                {"functionResponse":{"name":"lookup","response":{"ok":true}}}
            ]}"#,
        )
        .unwrap();

        assert!(matches!(content.parts[0], Part::Text { .. }));
        assert!(matches!(content.parts[1], Part::InlineData { .. }));
        assert!(matches!(content.parts[2], Part::FileData { .. }));
        assert!(matches!(content.parts[3], Part::FunctionCall { .. }));
        assert!(matches!(content.parts[4], Part::FunctionResponse { .. }));
    }

    #[test]
    fn test_unknown_part_kind_is_preserved() {
        let content: Content =
            decode(r#"{"parts":[{"executableCode":{"language":"PYTHON","code":"1"}}]}"#).unwrap();

        match &content.parts[0] {
            Part::Other(map) => assert!(map.contains_key("executableCode")),
            other => panic!("expected Part::Other, got {other:?}"),
        }

        let reencoded: Value = serde_json::from_str(&encode(&content).unwrap()).unwrap();
        assert_eq!(
            reencoded,
            json!({"parts":[{"executableCode":{"language":"PYTHON","code":"1"}}]})
        );
    }

    #[test]
    fn test_known_part_key_with_missing_field_is_decode_error() {
        let err = decode::<Content>(r#"{"parts":[{"inlineData":{"mimeType":"image/png"}}]}"#)
            .unwrap_err();

        match err {
            Error::Decode { path, message, .. } => {
                assert_eq!(path, "parts[0].inlineData");
                assert!(message.contains("data"));
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_function_call_without_name_is_decode_error() {
        let err = decode::<Content>(r#"{"parts":[{"text":"a"},{"functionCall":{"args":{}}}]}"#)
            .unwrap_err();

        match err {
            Error::Decode { path, .. } => assert_eq!(path, "parts[1].functionCall"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_part_with_two_data_kinds_is_rejected() {
        let err = decode::<Content>(
            r#"{"parts":[{"text":"a","fileData":{"fileUri":"files/x"}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_part_sibling_keys_are_ignored() {
        let content: Content =
            decode(r#"{"parts":[{"text":"hi","thought":true,"thoughtSignature":"c2ln"}]}"#)
                .unwrap();
        assert_eq!(content.parts, vec![Part::text("hi")]);
    }

    #[test]
    fn test_decoded_blob_is_validated() {
        let err = decode::<Blob>(r#"{"mimeType":"","data":"YWJj"}"#).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));

        let err = decode::<Content>(
            r#"{"parts":[{"inlineData":{"mimeType":"image/png","data":"!!not base64!!"}}]}"#,
        )
        .unwrap_err();
        match err {
            Error::Decode { path, message, .. } => {
                assert_eq!(path, "parts[0].inlineData");
                assert!(message.contains("base64"));
            }
            other => panic!("expected decode error, got {other:?}"),
        }

        let blob: Blob = decode(r#"{"mimeType":"image/png","data":"YWJj"}"#).unwrap();
        assert_eq!(blob.bytes().unwrap(), b"abc");
    }

    #[test]
    fn test_null_function_args_roundtrip() {
        let call = FunctionCall {
            id: None,
            name: "ping".to_string(),
            args: Some(Value::Null),
        };

        let text = encode(&call).unwrap();
        assert_eq!(text, r#"{"name":"ping","args":null}"#);
        assert_eq!(decode::<FunctionCall>(&text).unwrap(), call);

        let absent: FunctionCall = decode(r#"{"name":"ping"}"#).unwrap();
        assert_eq!(absent.args, None);
    }

    #[test]
    fn test_joined_text_concatenates_text_parts() {
        let content = Content {
            role: Some("model".to_string()),
            parts: vec![
                Part::text("Hello, "),
                Part::blob(Blob::detect(b"\x00")),
                Part::text("world"),
            ],
        };
        assert_eq!(content.joined_text().as_deref(), Some("Hello, world"));
    }
}
