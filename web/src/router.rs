use crate::controller::{client_controller, event_controller, health_check_controller};
use crate::{params, response, AppState};
use axum::{
    routing::{get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "SSE Broadcast API"
        ),
        paths(
            health_check_controller::health_check,
            crate::sse::handler::connect,
            client_controller::index,
            client_controller::read,
            client_controller::update_metadata,
            event_controller::send_to_client,
            event_controller::broadcast,
        ),
        components(
            schemas(
                params::event::EventParams,
                response::client::ClientSummary,
                response::delivery::DeliveryResponse,
            )
        ),
        tags(
            (name = "sse_broadcast", description = "Server-Sent Events connection and broadcast API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(sse_routes(app_state.clone()))
        .merge(client_routes(app_state.clone()))
        .merge(event_routes(app_state))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sse", get(crate::sse::handler::connect))
        .with_state(app_state)
}

fn client_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/clients", get(client_controller::index))
        .route("/clients/:id", get(client_controller::read))
        .route("/clients/:id/metadata", put(client_controller::update_metadata))
        .with_state(app_state)
}

fn event_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/clients/:id/events", post(event_controller::send_to_client))
        .route("/events", post(event_controller::broadcast))
        .with_state(app_state)
}
