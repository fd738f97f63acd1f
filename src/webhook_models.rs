use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Voice-assistant tool-call webhook.
///
/// The assistant platform wraps the `search_flights` arguments as
/// `message.toolCalls[0].function.arguments`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCallEnvelope {
    pub message: EnvelopeMessage,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMessage {
    /// Message type (e.g., "tool-calls")
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    pub tool_calls: Vec<ToolCall>,

    /// Raw data for any additional fields (call, artifact, timestamp...)
    #[serde(flatten)]
    pub raw: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,

    pub function: ToolFunction,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolFunction {
    #[serde(default)]
    pub name: Option<String>,

    pub arguments: ToolArguments,
}

/// Tool arguments arrive either as an object or as a JSON-encoded string.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ToolArguments {
    Object(Map<String, Value>),
    Encoded(String),
}

/// Why a payload could not be read as a tool-call envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeMiss {
    /// The payload does not have the `message.toolCalls[..].function.arguments` shape.
    NotAnEnvelope(String),
    /// `toolCalls` is present but empty.
    NoToolCalls,
    /// `arguments` is a string that is not a JSON object.
    MalformedArguments(String),
}

/// The body a search is read from, after envelope detection.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundPayload {
    /// Arguments unwrapped from a tool call.
    ToolCall {
        tool_call_id: Option<String>,
        function_name: Option<String>,
        arguments: Map<String, Value>,
    },
    /// The request body itself.
    Direct(Value),
}

impl InboundPayload {
    /// Reads `payload` as a tool-call envelope, or falls back to the direct body.
    ///
    /// Never fails: an envelope miss is logged at debug and the raw payload is
    /// used as-is.
    pub fn decode(payload: Value) -> Self {
        match ToolCallEnvelope::unwrap_arguments(&payload) {
            Ok(decoded) => decoded,
            Err(miss) => {
                tracing::debug!("Treating payload as direct body: {:?}", miss);
                InboundPayload::Direct(payload)
            }
        }
    }

    /// The effective search body.
    pub fn into_body(self) -> Value {
        match self {
            InboundPayload::ToolCall { arguments, .. } => Value::Object(arguments),
            InboundPayload::Direct(body) => body,
        }
    }

    pub fn is_tool_call(&self) -> bool {
        matches!(self, InboundPayload::ToolCall { .. })
    }
}

impl ToolCallEnvelope {
    /// Tries the envelope shape and returns the first tool call's arguments.
    pub fn unwrap_arguments(payload: &Value) -> Result<InboundPayload, EnvelopeMiss> {
        let envelope: ToolCallEnvelope = serde_json::from_value(payload.clone())
            .map_err(|e| EnvelopeMiss::NotAnEnvelope(e.to_string()))?;

        let call = envelope
            .message
            .tool_calls
            .into_iter()
            .next()
            .ok_or(EnvelopeMiss::NoToolCalls)?;

        let arguments = match call.function.arguments {
            ToolArguments::Object(map) => map,
            ToolArguments::Encoded(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    return Err(EnvelopeMiss::MalformedArguments(format!(
                        "expected a JSON object, got {}",
                        other
                    )))
                }
                Err(e) => return Err(EnvelopeMiss::MalformedArguments(e.to_string())),
            },
        };

        Ok(InboundPayload::ToolCall {
            tool_call_id: call.id,
            function_name: call.function.name,
            arguments,
        })
    }
}
