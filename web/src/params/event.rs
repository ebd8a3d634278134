use ::sse::{Event, Payload};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Body of an event push request.
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"data": {"status": "done"}, "event": "update", "id": 7}))]
pub(crate) struct EventParams {
    /// A string is sent as-is; any other JSON value is sent serialized.
    #[schema(value_type = Object)]
    pub(crate) data: Value,
    /// Optional event type label.
    pub(crate) event: Option<String>,
    /// Optional event id. Zero is treated as absent.
    pub(crate) id: Option<u64>,
}

impl From<EventParams> for Event {
    fn from(params: EventParams) -> Self {
        Event {
            payload: Payload::from(params.data),
            event_type: params.event,
            id: params.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_data_becomes_text_payload() {
        let params: EventParams = serde_json::from_value(json!({"data": "hello"})).unwrap();
        let event = Event::from(params);

        assert_eq!(event.payload, Payload::Text("hello".to_string()));
        assert_eq!(event.event_type, None);
        assert_eq!(event.id, None);
    }

    #[test]
    fn test_structured_data_and_fields() {
        let params: EventParams =
            serde_json::from_value(json!({"data": {"a": 1}, "event": "update", "id": 7})).unwrap();
        let event = Event::from(params);

        assert_eq!(event.payload, Payload::Json(json!({"a": 1})));
        assert_eq!(event.event_type.as_deref(), Some("update"));
        assert_eq!(event.id, Some(7));
    }
}
