use crate::params::client::ConnectParams;
use crate::AppState;
use ::sse::transport::ChannelTransport;
use async_stream::stream;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use log::*;
use std::collections::HashMap;
use std::convert::Infallible;

/// SSE handler that establishes a long-lived connection for real-time updates.
///
/// Connections opened with the same `client_id` and `group` are merged into one
/// client, so every tab of a user receives the user's events.
#[utoipa::path(
    get,
    path = "/sse",
    params(
        ("client_id" = Option<String>, Query, description = "Client identity; generated when omitted"),
        ("group" = Option<String>, Query, description = "Group to join; the default group when omitted")
    ),
    responses(
        (status = 200, description = "Event stream opened", body = String, content_type = "text/event-stream")
    )
)]
pub(crate) async fn connect(
    State(app_state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let params = ConnectParams::from(query);
    let peer = params
        .client_id
        .clone()
        .unwrap_or_else(|| "anonymous client".to_string());
    debug!("Establishing SSE connection for {peer} in group {}", params.group);

    let (mut transport, mut frames) = ChannelTransport::new();
    let options = params
        .into_options()
        .on_disconnect(move || debug!("SSE stream for {peer} closed"));
    let connected = app_state.sse_manager.connect(&mut transport, options);

    debug!(
        "SSE connection {} open for client {} ({} connection(s))",
        connected.connection.id(),
        connected.client.id,
        connected.client.connection_count()
    );

    // Frames arrive from the channel. The body is dropped when the peer goes
    // away, which drops the receiver and fires the disconnect handling.
    let body = stream! {
        while let Some(frame) = frames.recv().await {
            yield Ok::<_, Infallible>(frame);
        }
    };

    let (status, headers) = transport.into_head();
    (status, headers, Body::from_stream(body)).into_response()
}
