//! Live protocol messages exchanged over the bidirectional channel.
//!
//! Both directions are sum types serialized under a single camelCase variant
//! key (`{"clientContent": {...}}`). Decoding goes through an all-optional
//! intermediate so unknown sibling keys are ignored, while two known variant
//! keys in one frame are rejected.

use crate::codec::{fill_field, insert_default, is_false, no_wire_defaults, WireDefaults};
use crate::types::{Blob, Content, FunctionCall, FunctionResponse, GenerationConfig, Tool};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Message sent by the client. Exactly one variant per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawClientMessage")]
pub enum ClientMessage {
    Setup(Setup),
    ClientContent(ClientContent),
    RealtimeInput(RealtimeInput),
    ToolResponse(ToolResponse),
}

impl ClientMessage {
    /// Wire key of the populated variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Setup(_) => "setup",
            ClientMessage::ClientContent(_) => "clientContent",
            ClientMessage::RealtimeInput(_) => "realtimeInput",
            ClientMessage::ToolResponse(_) => "toolResponse",
        }
    }
}

impl WireDefaults for ClientMessage {
    fn fill_defaults(&self, value: &mut Value) {
        if let ClientMessage::ClientContent(content) = self {
            fill_field(value, "clientContent", content);
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClientMessage {
    setup: Option<Setup>,
    client_content: Option<ClientContent>,
    realtime_input: Option<RealtimeInput>,
    tool_response: Option<ToolResponse>,
}

impl TryFrom<RawClientMessage> for ClientMessage {
    type Error = String;

    fn try_from(raw: RawClientMessage) -> Result<Self, Self::Error> {
        let mut variants = Vec::new();
        if let Some(setup) = raw.setup {
            variants.push(ClientMessage::Setup(setup));
        }
        if let Some(content) = raw.client_content {
            variants.push(ClientMessage::ClientContent(content));
        }
        if let Some(input) = raw.realtime_input {
            variants.push(ClientMessage::RealtimeInput(input));
        }
        if let Some(response) = raw.tool_response {
            variants.push(ClientMessage::ToolResponse(response));
        }

        match variants.len() {
            1 => Ok(variants.remove(0)),
            0 => Err(
                "expected one of `setup`, `clientContent`, `realtimeInput`, `toolResponse`"
                    .to_string(),
            ),
            _ => Err(format!(
                "client message populates more than one variant: {}",
                variants
                    .iter()
                    .map(ClientMessage::kind)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// First client message of a session: target model and initial configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setup {
    /// Fully-qualified model name, `models/<id>`.
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_audio_transcription: Option<AudioTranscriptionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_audio_transcription: Option<AudioTranscriptionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_resumption: Option<SessionResumptionConfig>,
}

impl Setup {
    /// Accepts a bare model ID or a `models/`-prefixed name.
    pub fn new(model: impl AsRef<str>) -> Self {
        let model = model.as_ref();
        let model = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };

        Self {
            model,
            generation_config: None,
            system_instruction: None,
            tools: None,
            input_audio_transcription: None,
            output_audio_transcription: None,
            session_resumption: None,
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    pub fn with_system_instruction(mut self, instruction: Content) -> Self {
        self.system_instruction = Some(instruction);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Ask the service to transcribe both the caller's and the model's audio.
    pub fn with_audio_transcription(mut self) -> Self {
        self.input_audio_transcription = Some(AudioTranscriptionConfig {});
        self.output_audio_transcription = Some(AudioTranscriptionConfig {});
        self
    }

    /// Resume a previous session (`handle`) or opt in to resumption updates (`None`).
    pub fn with_session_resumption(mut self, handle: Option<String>) -> Self {
        self.session_resumption = Some(SessionResumptionConfig { handle });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioTranscriptionConfig {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResumptionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

/// Conversation turns appended to the session.
///
/// `turnComplete` is a declared default (`false`): it is omitted unless set
/// or the codec emits defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContent {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub turns: Vec<Content>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub turn_complete: bool,
}

impl ClientContent {
    pub fn new(turns: Vec<Content>, turn_complete: bool) -> Self {
        Self {
            turns,
            turn_complete,
        }
    }

    /// A complete user turn holding one text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(vec![Content::user_text(text)], true)
    }
}

impl WireDefaults for ClientContent {
    fn fill_defaults(&self, value: &mut Value) {
        insert_default(value, "turnComplete", json!(false));
    }
}

/// Streaming media and activity signals, sent without waiting for turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeInput {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_chunks: Vec<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Blob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_start: Option<ActivityStart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_end: Option<ActivityEnd>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_stream_end: Option<bool>,
}

impl RealtimeInput {
    pub fn media_chunks(chunks: Vec<Blob>) -> Self {
        Self {
            media_chunks: chunks,
            ..Default::default()
        }
    }

    pub fn audio(blob: Blob) -> Self {
        Self {
            audio: Some(blob),
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityStart {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEnd {}

/// Results for function calls the server requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    #[serde(default)]
    pub function_responses: Vec<FunctionResponse>,
}

/// Message sent by the server. Exactly one variant per frame.
///
/// `Unrecognized` keeps the raw object of events whose key this SDK does not
/// know yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawServerMessage")]
pub enum ServerMessage {
    SetupComplete(SetupComplete),
    ServerContent(ServerContent),
    ToolCall(ToolCall),
    ToolCallCancellation(ToolCallCancellation),
    GoAway(GoAway),
    SessionResumptionUpdate(SessionResumptionUpdate),
    #[serde(untagged)]
    Unrecognized(Map<String, Value>),
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::SetupComplete(_) => "setupComplete",
            ServerMessage::ServerContent(_) => "serverContent",
            ServerMessage::ToolCall(_) => "toolCall",
            ServerMessage::ToolCallCancellation(_) => "toolCallCancellation",
            ServerMessage::GoAway(_) => "goAway",
            ServerMessage::SessionResumptionUpdate(_) => "sessionResumptionUpdate",
            ServerMessage::Unrecognized(_) => "unrecognized",
        }
    }

    pub fn server_content(&self) -> Option<&ServerContent> {
        match self {
            ServerMessage::ServerContent(content) => Some(content),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawServerMessage {
    setup_complete: Option<SetupComplete>,
    server_content: Option<ServerContent>,
    tool_call: Option<ToolCall>,
    tool_call_cancellation: Option<ToolCallCancellation>,
    go_away: Option<GoAway>,
    session_resumption_update: Option<SessionResumptionUpdate>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl TryFrom<RawServerMessage> for ServerMessage {
    type Error = String;

    fn try_from(raw: RawServerMessage) -> Result<Self, Self::Error> {
        let mut variants = Vec::new();
        if let Some(ack) = raw.setup_complete {
            variants.push(ServerMessage::SetupComplete(ack));
        }
        if let Some(content) = raw.server_content {
            variants.push(ServerMessage::ServerContent(content));
        }
        if let Some(call) = raw.tool_call {
            variants.push(ServerMessage::ToolCall(call));
        }
        if let Some(cancellation) = raw.tool_call_cancellation {
            variants.push(ServerMessage::ToolCallCancellation(cancellation));
        }
        if let Some(go_away) = raw.go_away {
            variants.push(ServerMessage::GoAway(go_away));
        }
        if let Some(update) = raw.session_resumption_update {
            variants.push(ServerMessage::SessionResumptionUpdate(update));
        }

        match variants.len() {
            0 => Ok(ServerMessage::Unrecognized(raw.rest)),
            1 => Ok(variants.remove(0)),
            _ => Err(format!(
                "server message populates more than one variant: {}",
                variants
                    .iter()
                    .map(ServerMessage::kind)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Acknowledgement of the setup message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupComplete {}

/// Model output for the current turn.
///
/// Every flag is optional: absent means "not provided", not `false`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_turn: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_transcription: Option<Transcription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_transcription: Option<Transcription>,
}

impl ServerContent {
    pub fn is_turn_complete(&self) -> bool {
        self.turn_complete == Some(true)
    }

    pub fn text(&self) -> Option<String> {
        self.model_turn.as_ref().and_then(Content::joined_text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    #[serde(default)]
    pub function_calls: Vec<FunctionCall>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallCancellation {
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Notice that the server will drop the connection soon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoAway {
    /// Duration string such as `"10s"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_left: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResumptionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resumable: Option<bool>,
}

no_wire_defaults!(
    Setup,
    RealtimeInput,
    ToolResponse,
    ServerMessage,
    SetupComplete,
    ServerContent,
    ToolCall,
    ToolCallCancellation,
    GoAway,
    SessionResumptionUpdate,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode, Codec};
    use crate::Error;
    use pretty_assertions::assert_eq;

    fn to_value<T: Serialize + WireDefaults>(message: &T) -> Value {
        serde_json::from_str(&encode(message).unwrap()).unwrap()
    }

    #[test]
    fn test_setup_normalizes_model_name() {
        assert_eq!(Setup::new("gemini-2.0-flash-live-001").model, "models/gemini-2.0-flash-live-001");
        assert_eq!(Setup::new("models/gemini-2.0-flash-live-001").model, "models/gemini-2.0-flash-live-001");
    }

    #[test]
    fn test_setup_message_wire_format() {
        let message = ClientMessage::Setup(
            Setup::new("gemini-live")
                .with_system_instruction(Content::text("You are terse."))
                .with_generation_config(GenerationConfig {
                    temperature: Some(0.25),
                    ..Default::default()
                }),
        );

        assert_eq!(
            to_value(&message),
            json!({
                "setup": {
                    "model": "models/gemini-live",
                    "generationConfig": {"temperature": 0.25},
                    "systemInstruction": {"parts": [{"text": "You are terse."}]}
                }
            })
        );
    }

    #[test]
    fn test_turn_complete_true_is_written_literally() {
        let message = ClientMessage::ClientContent(ClientContent::user_text("hello"));

        assert_eq!(
            to_value(&message),
            json!({
                "clientContent": {
                    "turns": [{"role": "user", "parts": [{"text": "hello"}]}],
                    "turnComplete": true
                }
            })
        );
    }

    #[test]
    fn test_turn_complete_default_follows_emit_defaults() {
        let message =
            ClientMessage::ClientContent(ClientContent::new(vec![Content::user_text("a")], false));

        let omitted = to_value(&message);
        assert!(omitted["clientContent"].get("turnComplete").is_none());

        let codec = Codec::new().with_emit_defaults(true);
        let emitted: Value = serde_json::from_str(&codec.encode(&message).unwrap()).unwrap();
        assert_eq!(emitted["clientContent"]["turnComplete"], json!(false));
    }

    #[test]
    fn test_realtime_input_wire_format() {
        let chunk = Blob::from_bytes("audio/pcm;rate=16000", &[0, 1]).unwrap();
        let message = ClientMessage::RealtimeInput(RealtimeInput::media_chunks(vec![chunk]));

        assert_eq!(
            to_value(&message),
            json!({
                "realtimeInput": {
                    "mediaChunks": [{"mimeType": "audio/pcm;rate=16000", "data": "AAE="}]
                }
            })
        );
    }

    #[test]
    fn test_client_message_has_single_variant_key() {
        let messages = vec![
            ClientMessage::Setup(Setup::new("m")),
            ClientMessage::ClientContent(ClientContent::default()),
            ClientMessage::RealtimeInput(RealtimeInput::text("hi")),
            ClientMessage::ToolResponse(ToolResponse::default()),
        ];

        for message in messages {
            let value = to_value(&message);
            let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
            assert_eq!(keys, vec![message.kind()]);
        }
    }

    #[test]
    fn test_client_message_roundtrip() {
        let messages = vec![
            ClientMessage::Setup(Setup::new("m").with_audio_transcription()),
            ClientMessage::ClientContent(ClientContent::user_text("hello")),
            ClientMessage::RealtimeInput(RealtimeInput {
                audio_stream_end: Some(true),
                activity_end: Some(ActivityEnd {}),
                ..Default::default()
            }),
            ClientMessage::ToolResponse(ToolResponse {
                function_responses: vec![FunctionResponse {
                    id: Some("call-1".to_string()),
                    name: "lookup".to_string(),
                    response: json!({"result": 42}),
                }],
            }),
        ];

        for message in messages {
            let decoded: ClientMessage = decode(&encode(&message).unwrap()).unwrap();
            assert_eq!(decoded, message);
        }
    }

    #[test]
    fn test_client_message_rejects_multiple_variants() {
        let err = decode::<ClientMessage>(
            r#"{"setup":{"model":"models/m"},"clientContent":{"turnComplete":true}}"#,
        )
        .unwrap_err();

        match err {
            Error::Decode { message, .. } => assert!(message.contains("more than one variant")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_client_message_rejects_empty_object() {
        assert!(decode::<ClientMessage>("{}").is_err());
    }

    #[test]
    fn test_server_content_decodes_with_unknown_keys() {
        let message: ServerMessage = decode(
            r#"{
                "serverContent": {
                    "modelTurn": {"role": "model", "parts": [{"text": "Hi there"}]},
                    "turnComplete": true,
                    "groundingMetadata": {"webSearchQueries": []}
                },
                "usageMetadata": {"totalTokenCount": 12}
            }"#,
        )
        .unwrap();

        let content = message.server_content().unwrap();
        assert!(content.is_turn_complete());
        assert_eq!(content.text().as_deref(), Some("Hi there"));
        assert_eq!(content.interrupted, None);
    }

    #[test]
    fn test_absent_server_flags_are_not_false() {
        let message: ServerMessage =
            decode(r#"{"serverContent":{"modelTurn":{"parts":[{"text":"partial"}]}}}"#).unwrap();

        let content = message.server_content().unwrap();
        assert_eq!(content.turn_complete, None);
        assert!(!content.is_turn_complete());
    }

    #[test]
    fn test_setup_complete_and_other_events() {
        assert_eq!(
            decode::<ServerMessage>(r#"{"setupComplete":{}}"#).unwrap(),
            ServerMessage::SetupComplete(SetupComplete {})
        );
        assert_eq!(
            decode::<ServerMessage>(r#"{"goAway":{"timeLeft":"10s"}}"#).unwrap(),
            ServerMessage::GoAway(GoAway {
                time_left: Some("10s".to_string())
            })
        );
        assert_eq!(
            decode::<ServerMessage>(r#"{"toolCallCancellation":{"ids":["a","b"]}}"#).unwrap(),
            ServerMessage::ToolCallCancellation(ToolCallCancellation {
                ids: vec!["a".to_string(), "b".to_string()]
            })
        );
    }

    #[test]
    fn test_unrecognized_server_event_is_preserved() {
        let message: ServerMessage = decode(r#"{"voiceActivity":{"state":"ON"}}"#).unwrap();

        assert_eq!(message.kind(), "unrecognized");
        assert_eq!(
            to_value(&message),
            json!({"voiceActivity": {"state": "ON"}})
        );
    }

    #[test]
    fn test_server_message_roundtrip() {
        let messages = vec![
            ServerMessage::SetupComplete(SetupComplete {}),
            ServerMessage::ServerContent(ServerContent {
                model_turn: Some(Content::model_text("ok")),
                turn_complete: Some(true),
                output_transcription: Some(Transcription {
                    text: Some("ok".to_string()),
                }),
                ..Default::default()
            }),
            ServerMessage::ToolCall(ToolCall {
                function_calls: vec![FunctionCall {
                    id: Some("call-1".to_string()),
                    name: "lookup".to_string(),
                    args: Some(json!({"q": "rust"})),
                }],
            }),
            ServerMessage::SessionResumptionUpdate(SessionResumptionUpdate {
                new_handle: Some("h-1".to_string()),
                resumable: Some(true),
            }),
        ];

        for message in messages {
            let value = to_value(&message);
            assert_eq!(value.as_object().unwrap().len(), 1);
            let decoded: ServerMessage = decode(&value.to_string()).unwrap();
            assert_eq!(decoded, message);
        }
    }

    #[test]
    fn test_server_decode_error_carries_nested_path() {
        let raw = r#"{"serverContent":{"turnComplete":"yes"}}"#;
        let err = decode::<ServerMessage>(raw).unwrap_err();

        match err {
            Error::Decode { path, raw: payload, .. } => {
                assert_eq!(path, "serverContent.turnComplete");
                assert_eq!(payload, raw);
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
