use crate::controller::ApiResponse;
use crate::params::client::GroupParams;
use crate::params::event::EventParams;
use crate::response::delivery::DeliveryResponse;
use crate::{AppState, Error};
use ::sse::Event;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use log::*;

/// POST an event to every connection of one client
#[utoipa::path(
    post,
    path = "/clients/{id}/events",
    params(
        ("id" = String, Path, description = "Id of the receiving client"),
        GroupParams
    ),
    request_body = EventParams,
    responses(
        (status = 200, description = "Event written to the client's connections", body = DeliveryResponse),
        (status = 404, description = "Client not connected"),
        (status = 422, description = "Event could not be encoded")
    )
)]
pub async fn send_to_client(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<GroupParams>,
    Json(event_params): Json<EventParams>,
) -> Result<impl IntoResponse, Error> {
    let group = params.group();
    debug!("POST SSE event to client {id} in group {group}");

    let manager = app_state.sse_manager_ref();
    if manager.get_client(group.clone(), &id).is_none() {
        return Err(Error::NotFound);
    }

    let delivery = manager.send_to_client(group, &id, &Event::from(event_params))?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        DeliveryResponse::from(delivery),
    )))
}

/// POST an event to every client of a group
#[utoipa::path(
    post,
    path = "/events",
    params(GroupParams),
    request_body = EventParams,
    responses(
        (status = 200, description = "Event broadcast to the group", body = DeliveryResponse),
        (status = 422, description = "Event could not be encoded")
    )
)]
pub async fn broadcast(
    State(app_state): State<AppState>,
    Query(params): Query<GroupParams>,
    Json(event_params): Json<EventParams>,
) -> Result<impl IntoResponse, Error> {
    let group = params.group();
    debug!("POST SSE broadcast to group {group}");

    let delivery = app_state
        .sse_manager
        .send_to_group(group, &Event::from(event_params))?;

    if !delivery.is_complete() {
        warn!(
            "SSE broadcast reached {} of {} connection(s)",
            delivery.delivered,
            delivery.attempted()
        );
    }

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        DeliveryResponse::from(delivery),
    )))
}
