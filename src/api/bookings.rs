//! Booking endpoints: public reservation and walk-in intake, staff management

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        booking::{
            Booking, BookingCreated, BookingQuery, CreateBooking, CreateWalkIn, InviteMembers,
            UpdateBookingStatus,
        },
        visitor::Visitor,
    },
    AppState,
};

use super::{AuthenticatedUser, BookingsPage, Page};

/// Create a booking from the public reservation form
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created", body = BookingCreated),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(data): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingCreated>)> {
    let created = state.services.bookings.create_booking(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Register a walk-in visitor for today
#[utoipa::path(
    post,
    path = "/walk-ins",
    tag = "bookings",
    request_body = CreateWalkIn,
    responses(
        (status = 201, description = "Walk-in recorded", body = BookingCreated),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_walk_in(
    State(state): State<AppState>,
    Json(data): Json<CreateWalkIn>,
) -> AppResult<(StatusCode, Json<BookingCreated>)> {
    let created = state.services.bookings.create_walk_in(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List bookings with filters and pagination
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(BookingQuery),
    responses(
        (status = 200, description = "Bookings list", body = BookingsPage)
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Page<Booking>>> {
    let (bookings, total) = state.services.bookings.list(&query).await?;
    Ok(Json(Page::new(bookings, total, query.page, query.per_page, 50)))
}

/// Get booking by ID
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = Booking),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.get_by_id(id).await?;
    Ok(Json(booking))
}

/// Visitor rows of a booking
#[utoipa::path(
    get,
    path = "/bookings/{id}/visitors",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Visitors", body = Vec<Visitor>),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_booking_visitors(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Visitor>>> {
    let visitors = state.services.bookings.visitors(id).await?;
    Ok(Json(visitors))
}

/// Set a booking's status
#[utoipa::path(
    put,
    path = "/bookings/{id}/status",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = UpdateBookingStatus,
    responses(
        (status = 200, description = "Booking updated", body = Booking),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_booking_status(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateBookingStatus>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.update_status(id, data.status).await?;
    Ok(Json(booking))
}

/// Invite group members by email
#[utoipa::path(
    post,
    path = "/bookings/{id}/invites",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = InviteMembers,
    responses(
        (status = 201, description = "Visitor rows created", body = Vec<Visitor>),
        (status = 422, description = "Declared group size exceeded", body = crate::error::ErrorResponse)
    )
)]
pub async fn invite_members(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<InviteMembers>,
) -> AppResult<(StatusCode, Json<Vec<Visitor>>)> {
    data.validate()?;
    let visitors = state.services.bookings.invite_members(id, &data.emails).await?;
    Ok((StatusCode::CREATED, Json(visitors)))
}
