use ::sse::Delivery;
use serde::Serialize;
use utoipa::ToSchema;

/// Outcome of an event push.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub(crate) struct DeliveryResponse {
    /// Connections the event was written to.
    pub(crate) delivered: usize,
    /// Connections whose write failed.
    pub(crate) failed_connection_ids: Vec<String>,
}

impl From<Delivery> for DeliveryResponse {
    fn from(delivery: Delivery) -> Self {
        Self {
            delivered: delivery.delivered,
            failed_connection_ids: delivery
                .failed
                .into_iter()
                .map(|failed| failed.connection_id.to_string())
                .collect(),
        }
    }
}
