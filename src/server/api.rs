use crate::agent::ChatAgent;
use crate::error::ChatError;
use crate::models::{ ChatRequest, ErrorBody, EventFilter };
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    extract::{ Path, Query, State, rejection::{ JsonRejection, PathRejection } },
    response::{ IntoResponse, Response },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tower_http::cors::{ Any, CorsLayer };
use log::error;

#[derive(Clone)]
struct AppState {
    agent: Arc<ChatAgent>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router(agent: Arc<ChatAgent>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/events", get(list_events_handler))
        .route("/events/{id}", get(get_event_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(AppState { agent })
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return ChatError::InvalidInput(rejection.body_text()).into_response();
        }
    };

    match state.agent.process_chat(request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn list_events_handler(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>
) -> Response {
    match state.agent.store().list_events(&filter).await {
        Ok(events) => Json(events).into_response(),
        Err(e) => {
            error!("Error fetching events: {}", e);
            store_unavailable()
        }
    }
}

async fn get_event_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => {
            return ChatError::InvalidInput(rejection.body_text()).into_response();
        }
    };

    match state.agent.store().get_event(id).await {
        Ok(Some(event)) => Json(event).into_response(),
        Ok(None) =>
            (StatusCode::NOT_FOUND, Json(ErrorBody::new("EventNotFound", None))).into_response(),
        Err(e) => {
            error!("Error fetching event {}: {}", id, e);
            store_unavailable()
        }
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

fn store_unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Json(ErrorBody::new("StoreUnavailable", None))).into_response()
}
