use crate::controller::ApiResponse;
use crate::params::client::GroupParams;
use crate::response::client::ClientSummary;
use crate::{AppState, Error};
use ::sse::Metadata;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use log::*;

/// GET all clients connected to a group
#[utoipa::path(
    get,
    path = "/clients",
    params(GroupParams),
    responses(
        (status = 200, description = "Successfully retrieved all clients of the group", body = [ClientSummary]),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<GroupParams>,
) -> Result<impl IntoResponse, Error> {
    let group = params.group();
    debug!("GET all SSE clients in group {group}");

    let clients: Vec<ClientSummary> = app_state
        .sse_manager
        .list_clients(group)
        .into_iter()
        .map(ClientSummary::from)
        .collect();

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), clients)))
}

/// GET a particular client specified by its id.
#[utoipa::path(
    get,
    path = "/clients/{id}",
    params(
        ("id" = String, Path, description = "Client id to retrieve"),
        GroupParams
    ),
    responses(
        (status = 200, description = "Successfully retrieved a specific client by its id", body = ClientSummary),
        (status = 404, description = "Client not connected"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<GroupParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET SSE client by id: {id}");

    let client = app_state
        .sse_manager
        .get_client(params.group(), &id)
        .ok_or(Error::NotFound)?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        ClientSummary::from(client),
    )))
}

/// PUT replace the metadata of a client. The previous metadata is discarded.
#[utoipa::path(
    put,
    path = "/clients/{id}/metadata",
    params(
        ("id" = String, Path, description = "Id of client to update"),
        GroupParams
    ),
    responses(
        (status = 200, description = "Successfully replaced client metadata", body = ClientSummary),
        (status = 404, description = "Client not connected"),
        (status = 422, description = "Unprocessable Entity")
    )
)]
pub async fn update_metadata(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<GroupParams>,
    Json(metadata): Json<Metadata>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update metadata of SSE client {id}: {metadata:?}");

    let client = app_state
        .sse_manager
        .set_client_metadata(params.group(), &id, metadata)
        .ok_or(Error::NotFound)?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        ClientSummary::from(client),
    )))
}
