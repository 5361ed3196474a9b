//! QR and manual check-in endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::checkin::{CheckinResult, ScanRequest},
    AppState,
};

use super::AuthenticatedUser;

/// Check in the visitor whose QR code was scanned
#[utoipa::path(
    post,
    path = "/checkin/scan",
    tag = "checkin",
    security(("bearer_auth" = [])),
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Check-in result", body = CheckinResult),
        (status = 404, description = "Unknown token", body = crate::error::ErrorResponse),
        (status = 422, description = "Booking cancelled", body = crate::error::ErrorResponse)
    )
)]
pub async fn scan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ScanRequest>,
) -> AppResult<Json<CheckinResult>> {
    if request.token.trim().is_empty() {
        return Err(AppError::BadRequest("Token is required".to_string()));
    }
    tracing::debug!(staff = %claims.sub, "QR scan");
    let result = state.services.bookings.check_in_by_token(&request.token).await?;
    Ok(Json(result))
}

/// Manual check-in by visitor ID
#[utoipa::path(
    post,
    path = "/checkin/visitors/{id}",
    tag = "checkin",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Visitor ID")),
    responses(
        (status = 200, description = "Check-in result", body = CheckinResult),
        (status = 404, description = "Visitor not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Booking cancelled", body = crate::error::ErrorResponse)
    )
)]
pub async fn check_in_visitor(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<CheckinResult>> {
    tracing::debug!(staff = %claims.sub, visitor_id = id, "Manual check-in");
    let result = state.services.bookings.check_in_by_id(id).await?;
    Ok(Json(result))
}
