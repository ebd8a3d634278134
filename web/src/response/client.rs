use ::sse::{Client, Metadata};
use serde::Serialize;
use utoipa::ToSchema;

/// A client as exposed over HTTP. Connection handles stay server-side; only
/// their number is reported.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub(crate) struct ClientSummary {
    pub(crate) id: String,
    #[schema(value_type = Object)]
    pub(crate) metadata: Metadata,
    pub(crate) connection_count: usize,
}

impl From<Client> for ClientSummary {
    fn from(client: Client) -> Self {
        Self {
            connection_count: client.connection_count(),
            id: client.id,
            metadata: client.metadata,
        }
    }
}
