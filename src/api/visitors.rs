//! Visitor link endpoints, keyed by the token emailed to each visitor

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        booking::InviteMembers,
        visitor::{CompleteVisitorDetails, InvitedMember, Visitor, VisitorForm},
    },
    AppState,
};

/// Visitor form, pre-filled from the booking
#[utoipa::path(
    get,
    path = "/visitors/token/{token}",
    tag = "visitors",
    params(("token" = String, Path, description = "Visitor link token")),
    responses(
        (status = 200, description = "Visitor form", body = VisitorForm),
        (status = 404, description = "Unknown token", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_visitor_form(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<VisitorForm>> {
    let form = state.services.bookings.visitor_form(&token).await?;
    Ok(Json(form))
}

/// Submit visitor details
#[utoipa::path(
    put,
    path = "/visitors/token/{token}",
    tag = "visitors",
    params(("token" = String, Path, description = "Visitor link token")),
    request_body = CompleteVisitorDetails,
    responses(
        (status = 200, description = "Details saved", body = Visitor),
        (status = 404, description = "Unknown token", body = crate::error::ErrorResponse),
        (status = 409, description = "Visitor already checked in", body = crate::error::ErrorResponse)
    )
)]
pub async fn complete_visitor_details(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(data): Json<CompleteVisitorDetails>,
) -> AppResult<Json<Visitor>> {
    let visitor = state.services.bookings.complete_details(&token, data).await?;
    Ok(Json(visitor))
}

/// Group leader invites members through their own link
#[utoipa::path(
    post,
    path = "/visitors/token/{token}/invites",
    tag = "visitors",
    params(("token" = String, Path, description = "Group leader link token")),
    request_body = InviteMembers,
    responses(
        (status = 201, description = "Members invited", body = Vec<InvitedMember>),
        (status = 403, description = "Token does not belong to the group leader", body = crate::error::ErrorResponse),
        (status = 422, description = "Declared group size exceeded", body = crate::error::ErrorResponse)
    )
)]
pub async fn invite_members(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(data): Json<InviteMembers>,
) -> AppResult<(StatusCode, Json<Vec<InvitedMember>>)> {
    data.validate()?;
    let members = state
        .services
        .bookings
        .invite_members_as_leader(&token, &data.emails)
        .await?;
    Ok((StatusCode::CREATED, Json(members)))
}
