use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Logical namespace that partitions the client registry.
///
/// `Default` is the "no group specified" sentinel. It is resolved here at the API
/// boundary so that registry keys are never optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Group {
    #[default]
    Default,
    Named(String),
}

impl Group {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Group::Default
        } else {
            Group::Named(name)
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Group::Default => write!(f, "<default>"),
            Group::Named(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for Group {
    fn from(name: &str) -> Self {
        Group::named(name)
    }
}

impl From<String> for Group {
    fn from(name: String) -> Self {
        Group::named(name)
    }
}

impl<T: Into<Group>> From<Option<T>> for Group {
    fn from(name: Option<T>) -> Self {
        name.map(Into::into).unwrap_or_default()
    }
}

/// Body of an event, either raw text or structured data sent as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Json(Value),
}

impl Payload {
    /// Converts any serializable value into a JSON payload.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Payload::Json(serde_json::to_value(value)?))
    }

    /// Text form of the payload as it appears on the `data` line.
    pub fn to_text(&self) -> Result<Cow<'_, str>> {
        match self {
            Payload::Text(text) => Ok(Cow::Borrowed(text)),
            Payload::Json(value) => Ok(Cow::Owned(serde_json::to_string(value)?)),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_owned())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        // Bare JSON strings go out unquoted, the same as text.
        match value {
            Value::String(text) => Payload::Text(text),
            other => Payload::Json(other),
        }
    }
}

/// A single message to push to one or more connections.
///
/// ```rust,ignore
/// let event = Event::new(json!({"a": 1})).event_type("update").id(7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub payload: Payload,
    pub event_type: Option<String>,
    pub id: Option<u64>,
}

impl Event {
    pub fn new(payload: impl Into<Payload>) -> Self {
        Self {
            payload: payload.into(),
            event_type: None,
            id: None,
        }
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }
}
