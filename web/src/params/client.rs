use ::sse::{ConnectOptions, Group, Metadata};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use utoipa::IntoParams;

const CLIENT_ID_PARAM: &str = "client_id";
const GROUP_PARAM: &str = "group";

/// Selects the group an endpoint operates on. Omitted or empty means the
/// default group.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct GroupParams {
    pub(crate) group: Option<String>,
}

impl GroupParams {
    pub(crate) fn group(&self) -> Group {
        Group::from(self.group.as_deref())
    }
}

/// Query parameters accepted when opening an event stream.
///
/// `client_id` and `group` are reserved; every other parameter becomes a
/// string-valued metadata entry on a newly created client.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ConnectParams {
    pub(crate) client_id: Option<String>,
    pub(crate) group: Group,
    pub(crate) metadata: Metadata,
}

impl From<HashMap<String, String>> for ConnectParams {
    fn from(mut query: HashMap<String, String>) -> Self {
        let client_id = query.remove(CLIENT_ID_PARAM).filter(|id| !id.is_empty());
        let group = Group::from(query.remove(GROUP_PARAM));
        let metadata = query
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        Self {
            client_id,
            group,
            metadata,
        }
    }
}

impl ConnectParams {
    pub(crate) fn into_options(self) -> ConnectOptions {
        let mut options = ConnectOptions::new()
            .group(self.group)
            .metadata(self.metadata);
        if let Some(client_id) = self.client_id {
            options = options.client_id(client_id);
        }
        options
    }
}
