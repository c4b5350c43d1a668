//! mpv JSON IPC wire format.
//!
//! One JSON object per line in both directions. Requests carry a numeric
//! `request_id` that the matching reply echoes back; everything with an
//! `event` key is unsolicited.

use crate::error::BackendError;
use crate::player::events::{EndReason, EngineEvent, Property};
use serde::Deserialize;
use serde_json::{json, Value};

/// Decoded line from the engine socket.
#[derive(Debug, Clone, PartialEq)]
pub enum IpcMessage {
    Reply {
        request_id: u64,
        /// `Ok(data)` on `"error": "success"`, otherwise the error string
        result: Result<Value, String>,
    },
    Event(EngineEvent),
    /// Events and replies the core has no use for
    Ignored,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    event: Option<String>,
    request_id: Option<u64>,
    error: Option<String>,
    #[serde(default)]
    data: Value,
    name: Option<String>,
    reason: Option<String>,
}

pub fn parse_line(line: &str) -> Result<IpcMessage, BackendError> {
    let raw: RawMessage = serde_json::from_str(line)?;

    if let Some(event) = raw.event.as_deref() {
        let event = match event {
            "start-file" => EngineEvent::StartFile,
            "end-file" => EngineEvent::EndFile(
                raw.reason
                    .as_deref()
                    .map(EndReason::from_name)
                    .unwrap_or(EndReason::Unknown),
            ),
            "property-change" => match raw.name.as_deref().and_then(Property::from_name) {
                Some(property) => EngineEvent::PropertyChange(property),
                None => return Ok(IpcMessage::Ignored),
            },
            "seek" => EngineEvent::Seek,
            "idle" => EngineEvent::Idle,
            "shutdown" => EngineEvent::Shutdown,
            _ => return Ok(IpcMessage::Ignored),
        };
        return Ok(IpcMessage::Event(event));
    }

    match raw.request_id {
        Some(request_id) => {
            let result = match raw.error.as_deref() {
                Some("success") | None => Ok(raw.data),
                Some(message) => Err(message.to_string()),
            };
            Ok(IpcMessage::Reply { request_id, result })
        }
        None => Ok(IpcMessage::Ignored),
    }
}

/// Serialize a command line, newline included.
pub fn encode_command(request_id: u64, args: &[Value]) -> String {
    let mut line = json!({
        "command": args,
        "request_id": request_id,
    })
    .to_string();
    line.push('\n');
    line
}
