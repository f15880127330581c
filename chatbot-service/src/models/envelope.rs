//! Trigger envelopes: the outer request/response objects carrying a JSON-encoded string body.

use crate::error::ChatError;
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io;

/// Inbound envelope as delivered by the HTTP trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// JSON text of an [`IncomingRequest`]. `None` when the trigger sent no body.
    #[serde(default)]
    pub body: Option<String>,
}

impl RequestEnvelope {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
        }
    }
}

/// The decoded envelope body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRequest {
    /// `None` when the key is absent or holds a falsy JSON value.
    pub message: Option<String>,
}

impl IncomingRequest {
    /// Decode the envelope body. It must be a JSON object; on duplicate keys the last
    /// one wins.
    pub fn parse(body: &str) -> Result<Self, ChatError> {
        match serde_json::from_str::<Value>(body)? {
            Value::Object(mut fields) => {
                let message = match fields.remove("message") {
                    None => None,
                    Some(value) if is_falsy(&value) => None,
                    Some(Value::String(text)) => Some(text),
                    Some(other) => return Err(ChatError::InvalidMessage(kind_of(&other))),
                };
                Ok(Self { message })
            }
            other => Err(ChatError::NotAnObject(kind_of(&other))),
        }
    }
}

/// `null`, `false`, zero, and empty strings, arrays or objects.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Outbound envelope. `body` is itself JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply<'a> {
    pub response: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

impl ResponseEnvelope {
    pub fn success(text: &str) -> Self {
        Self::with_json(200, &ChatReply { response: text })
    }

    pub fn error(status_code: u16, message: &str) -> Self {
        Self::with_json(status_code, &ErrorBody { error: message })
    }

    fn with_json<T: Serialize>(status_code: u16, value: &T) -> Self {
        match encode_body(value) {
            Ok(body) => Self { status_code, body },
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode response body");
                Self {
                    status_code: 500,
                    body: r#"{"error": "Failed to encode response body"}"#.to_string(),
                }
            }
        }
    }
}

/// Encode with `", "` and `": "` separators, the layout clients of this endpoint already
/// compare against.
pub fn encode_body<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::with_capacity(64);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(<serde_json::Error as serde::ser::Error>::custom)
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_body_uses_spaced_separators() {
        let envelope = ResponseEnvelope::success("Hi there");
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.body, r#"{"response": "Hi there"}"#);
    }

    #[test]
    fn error_body_escapes_quotes() {
        let envelope = ResponseEnvelope::error(500, r#"bad "thing""#);
        assert_eq!(envelope.body, r#"{"error": "bad \"thing\""}"#);
    }

    #[test]
    fn nested_values_keep_layout() {
        let body = encode_body(&json!({"a": [1, 2], "b": {"c": null}})).unwrap();
        assert_eq!(body, r#"{"a": [1, 2], "b": {"c": null}}"#);
    }

    #[test]
    fn response_envelope_serializes_camel_case() {
        let envelope = ResponseEnvelope::error(400, "No message provided");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["statusCode"], 400);
        assert_eq!(value["body"], r#"{"error": "No message provided"}"#);
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn parse_reads_string_message() {
        let request = IncomingRequest::parse(r#"{"message": "hi", "extra": 1}"#).unwrap();
        assert_eq!(request.message.as_deref(), Some("hi"));
    }

    #[test]
    fn parse_treats_falsy_messages_as_absent() {
        for body in [
            "{}",
            r#"{"message": null}"#,
            r#"{"message": ""}"#,
            r#"{"message": false}"#,
            r#"{"message": 0}"#,
            r#"{"message": 0.0}"#,
            r#"{"message": []}"#,
            r#"{"message": {}}"#,
        ] {
            let request = IncomingRequest::parse(body).unwrap();
            assert!(request.message.is_none(), "body: {}", body);
        }
    }

    #[test]
    fn parse_rejects_truthy_non_string_messages() {
        for body in [
            r#"{"message": 42}"#,
            r#"{"message": true}"#,
            r#"{"message": ["hi"]}"#,
            r#"{"message": {"text": "hi"}}"#,
        ] {
            let err = IncomingRequest::parse(body).unwrap_err();
            assert!(matches!(err, ChatError::InvalidMessage(_)), "body: {}", body);
        }
    }

    #[test]
    fn parse_rejects_non_object_bodies() {
        for (body, kind) in [
            ("[]", "array"),
            (r#"["hi"]"#, "array"),
            (r#""str""#, "string"),
            ("null", "null"),
            ("1", "number"),
        ] {
            match IncomingRequest::parse(body) {
                Err(ChatError::NotAnObject(found)) => assert_eq!(found, kind),
                other => panic!("body {}: unexpected {:?}", body, other),
            }
        }
    }

    #[test]
    fn parse_keeps_last_duplicate_key() {
        let request = IncomingRequest::parse(r#"{"message": "first", "message": "last"}"#).unwrap();
        assert_eq!(request.message.as_deref(), Some("last"));
    }

    #[test]
    fn request_envelope_tolerates_missing_body() {
        let envelope: RequestEnvelope = serde_json::from_str(r#"{"headers": {}}"#).unwrap();
        assert!(envelope.body.is_none());

        let envelope: RequestEnvelope = serde_json::from_str(r#"{"body": null}"#).unwrap();
        assert!(envelope.body.is_none());
    }
}
