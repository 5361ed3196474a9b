//! Events API endpoints (exhibitions, talks, workshops)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::event::{
        CreateEvent, Event, EventQuery, EventRegistration, EventSummary, RegisterForEvent,
        RegistrationResult, UpdateEvent,
    },
    AppState,
};

use super::{AuthenticatedUser, EventsPage, Page};

/// Upcoming active events with registration counts
#[utoipa::path(
    get,
    path = "/events/upcoming",
    tag = "events",
    responses(
        (status = 200, description = "Upcoming events", body = Vec<EventSummary>)
    )
)]
pub async fn upcoming_events(State(state): State<AppState>) -> AppResult<Json<Vec<EventSummary>>> {
    let events = state.services.events.upcoming().await?;
    Ok(Json(events))
}

/// List events with filters and pagination
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    security(("bearer_auth" = [])),
    params(EventQuery),
    responses(
        (status = 200, description = "Events list", body = EventsPage)
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<Page<Event>>> {
    let (events, total) = state.services.events.list(&query).await?;
    Ok(Json(Page::new(events, total, query.page, query.per_page, 50)))
}

/// Get event by ID
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event details", body = Event),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Event>> {
    let event = state.services.events.get_by_id(id).await?;
    Ok(Json(event))
}

/// Create an event
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    security(("bearer_auth" = [])),
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 403, description = "Administrator privileges required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateEvent>,
) -> AppResult<(StatusCode, Json<Event>)> {
    claims.require_admin()?;
    let event = state.services.events.create(&data).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event
#[utoipa::path(
    put,
    path = "/events/{id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    request_body = UpdateEvent,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateEvent>,
) -> AppResult<Json<Event>> {
    claims.require_admin()?;
    let event = state.services.events.update(id, &data).await?;
    Ok(Json(event))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_admin()?;
    state.services.events.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register for an event
#[utoipa::path(
    post,
    path = "/events/{id}/register",
    tag = "events",
    params(("id" = i32, Path, description = "Event ID")),
    request_body = RegisterForEvent,
    responses(
        (status = 201, description = "Registered", body = RegistrationResult),
        (status = 200, description = "Already registered", body = RegistrationResult),
        (status = 422, description = "Event full or inactive", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<RegisterForEvent>,
) -> AppResult<(StatusCode, Json<RegistrationResult>)> {
    let result = state.services.events.register(id, &data).await?;
    let status = if result.already_registered {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(result)))
}

/// Registrations for an event
#[utoipa::path(
    get,
    path = "/events/{id}/registrations",
    tag = "events",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Registrations", body = Vec<EventRegistration>),
        (status = 404, description = "Event not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_registrations(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<EventRegistration>>> {
    let registrations = state.services.events.registrations(id).await?;
    Ok(Json(registrations))
}
