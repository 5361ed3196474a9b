//! Group check-in reporting endpoints

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::AppResult,
    models::checkin::{
        CheckinExportRow, CheckinStatsQuery, DailyCheckinStats, ExportFormat, ExportQuery,
        GroupArrival, GroupCheckinDetails,
    },
    services::export,
    AppState,
};

use super::AuthenticatedUser;

/// Arrival time and checked-in count for a group booking
#[utoipa::path(
    get,
    path = "/checkin/groups/{booking_id}/arrival",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(("booking_id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Group arrival", body = GroupArrival),
        (status = 400, description = "Invalid booking id", body = crate::error::ErrorResponse)
    )
)]
pub async fn group_arrival(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(booking_id): Path<i32>,
) -> AppResult<Json<GroupArrival>> {
    let arrival = state.services.checkins.group_arrival(booking_id).await?;
    Ok(Json(arrival))
}

/// Booking, visitors by role, arrival and summary
#[utoipa::path(
    get,
    path = "/checkin/groups/{booking_id}",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(("booking_id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Group check-in details", body = GroupCheckinDetails),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn group_details(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(booking_id): Path<i32>,
) -> AppResult<Json<GroupCheckinDetails>> {
    let details = state.services.checkins.group_checkin_details(booking_id).await?;
    Ok(Json(details))
}

/// Daily check-in statistics
#[utoipa::path(
    get,
    path = "/checkin/stats",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(CheckinStatsQuery),
    responses(
        (status = 200, description = "One entry per day with check-ins", body = Vec<DailyCheckinStats>),
        (status = 400, description = "start_date after end_date", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkin_stats(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<CheckinStatsQuery>,
) -> AppResult<Json<Vec<DailyCheckinStats>>> {
    let stats = state
        .services
        .checkins
        .checkin_stats(query.start_date, query.end_date)
        .await?;
    Ok(Json(stats))
}

/// Download a group's check-in list as JSON or CSV
#[utoipa::path(
    get,
    path = "/checkin/groups/{booking_id}/export",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(
        ("booking_id" = i32, Path, description = "Booking ID"),
        ExportQuery
    ),
    responses(
        (status = 200, description = "Export rows, or a CSV file with format=csv", content(
            ("application/json" = Vec<CheckinExportRow>),
            ("text/csv" = String)
        )),
        (status = 404, description = "Booking not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn export_group(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(booking_id): Path<i32>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let rows = state.services.checkins.export(booking_id).await?;

    match query.format.unwrap_or_default() {
        ExportFormat::Json => Ok(Json(rows).into_response()),
        ExportFormat::Csv => {
            let body = export::to_csv(&rows)?;
            let disposition = format!(
                "attachment; filename=\"booking-{}-checkins.csv\"",
                booking_id
            );
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response())
        }
    }
}
