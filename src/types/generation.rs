//! Generation parameters and the unary `generateContent` request/response.

use super::content::{Content, Part};
use crate::codec::{no_wire_defaults, present_value};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Optional generation parameters. Every absent field means "service default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<Modality>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    Text,
    Image,
    Audio,
    #[serde(other)]
    ModalityUnspecified,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_config: Option<VoiceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prebuilt_voice_config: Option<PrebuiltVoiceConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

impl SpeechConfig {
    pub fn prebuilt_voice(voice_name: impl Into<String>) -> Self {
        Self {
            voice_config: Some(VoiceConfig {
                prebuilt_voice_config: Some(PrebuiltVoiceConfig {
                    voice_name: voice_name.into(),
                }),
            }),
            language_code: None,
        }
    }
}

/// Tools the model may use. Empty objects (`{}`) switch on built-in tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_declarations: Option<Vec<FunctionDeclaration>>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub google_search: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub code_execution: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// OpenAPI-style parameter schema.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub parameters: Option<Value>,
}

/// Body of `generateContent`, also used for each entry of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Only set inside batch requests; the unary endpoint takes it from the URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

impl GenerateContentRequest {
    /// Single user turn with the given text.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user_text(text)],
            ..Default::default()
        }
    }
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub prompt_feedback: Option<Value>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, if it produced any.
    pub fn text(&self) -> Option<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(Content::joined_text)
    }

    /// First inline blob of the first candidate (image or audio output).
    pub fn first_blob(&self) -> Option<&super::Blob> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| {
                content.parts.iter().find_map(|part| match part {
                    Part::InlineData { inline_data } => Some(inline_data),
                    _ => None,
                })
            })
    }
}

/// Candidate completion item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_token_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates_token_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_token_count: Option<u32>,
}

no_wire_defaults!(
    GenerationConfig,
    SpeechConfig,
    Tool,
    FunctionDeclaration,
    GenerateContentRequest,
    GenerateContentResponse,
    Candidate,
    UsageMetadata,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_generation_config_wire_names() {
        let config = GenerationConfig {
            max_output_tokens: Some(256),
            response_modalities: Some(vec![Modality::Audio]),
            speech_config: Some(SpeechConfig::prebuilt_voice("Puck")),
            ..Default::default()
        };

        let value: Value = serde_json::from_str(&encode(&config).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "maxOutputTokens": 256,
                "responseModalities": ["AUDIO"],
                "speechConfig": {"voiceConfig": {"prebuiltVoiceConfig": {"voiceName": "Puck"}}}
            })
        );
    }

    #[test]
    fn test_unknown_modality_decodes_as_unspecified() {
        let config: GenerationConfig =
            decode(r#"{"responseModalities":["TEXT","VIDEO"]}"#).unwrap();
        assert_eq!(
            config.response_modalities,
            Some(vec![Modality::Text, Modality::ModalityUnspecified])
        );
    }

    #[test]
    fn test_null_tool_switch_roundtrips() {
        let tool: Tool = decode(r#"{"googleSearch":null,"codeExecution":{}}"#).unwrap();

        assert_eq!(tool.google_search, Some(Value::Null));
        assert_eq!(tool.code_execution, Some(json!({})));
        assert_eq!(decode::<Tool>(&encode(&tool).unwrap()).unwrap(), tool);
        assert_eq!(decode::<Tool>("{}").unwrap().google_search, None);
    }

    #[test]
    fn test_request_uses_system_instruction_key() {
        let request = GenerateContentRequest {
            system_instruction: Some(Content::text("be brief")),
            ..GenerateContentRequest::user_text("hi")
        };

        let value: Value = serde_json::from_str(&encode(&request).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "systemInstruction": {"parts": [{"text": "be brief"}]}
            })
        );
    }

    #[test]
    fn test_response_text_from_first_candidate() {
        let response: GenerateContentResponse = decode(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Clouds of honey"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 4, "totalTokenCount": 9},
                "modelVersion": "gemini-2.0-flash"
            }"#,
        )
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("Clouds of honey"));
        assert_eq!(
            response.usage_metadata.unwrap().total_token_count,
            Some(9)
        );
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GenerateContentResponse = decode(r#"{"candidates": []}"#).unwrap();
        assert_eq!(response.text(), None);
        assert!(response.first_blob().is_none());
    }
}
