//! API handlers for MuseoSmart REST endpoints

pub mod auth;
pub mod bookings;
pub mod checkin;
pub mod events;
pub mod health;
pub mod openapi;
pub mod promotions;
pub mod reports;
pub mod users;
pub mod visitors;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated staff from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Paginated list response
#[derive(Serialize, ToSchema)]
#[aliases(
    BookingsPage = Page<crate::models::booking::Booking>,
    EventsPage = Page<crate::models::event::Event>,
    PromotionsPage = Page<crate::models::promotion::Promotion>
)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: Option<i64>, per_page: Option<i64>, default_per_page: i64) -> Self {
        Self {
            items,
            total,
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(default_per_page).clamp(1, 200),
        }
    }
}

/// All `/api/v1` routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Staff accounts
        .route("/users", get(users::list_users).post(users::create_user))
        // Bookings
        .route("/bookings", get(bookings::list_bookings).post(bookings::create_booking))
        .route("/walk-ins", post(bookings::create_walk_in))
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/status", put(bookings::update_booking_status))
        .route("/bookings/:id/visitors", get(bookings::list_booking_visitors))
        .route("/bookings/:id/invites", post(bookings::invite_members))
        // Visitor links
        .route(
            "/visitors/token/:token",
            get(visitors::get_visitor_form).put(visitors::complete_visitor_details),
        )
        .route("/visitors/token/:token/invites", post(visitors::invite_members))
        // Check-in
        .route("/checkin/scan", post(checkin::scan))
        .route("/checkin/visitors/:id", post(checkin::check_in_visitor))
        .route("/checkin/stats", get(reports::checkin_stats))
        .route("/checkin/groups/:booking_id", get(reports::group_details))
        .route("/checkin/groups/:booking_id/arrival", get(reports::group_arrival))
        .route("/checkin/groups/:booking_id/export", get(reports::export_group))
        // Events
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/upcoming", get(events::upcoming_events))
        .route(
            "/events/:id",
            get(events::get_event).put(events::update_event).delete(events::delete_event),
        )
        .route("/events/:id/register", post(events::register))
        .route("/events/:id/registrations", get(events::list_registrations))
        // Promotions
        .route("/promotions", get(promotions::list_promotions).post(promotions::create_promotion))
        .route("/promotions/active", get(promotions::active_promotions))
        .route("/promotions/order", put(promotions::reorder_promotions))
        .route("/promotions/bulk", post(promotions::bulk_action))
        .route(
            "/promotions/:id",
            get(promotions::get_promotion)
                .put(promotions::update_promotion)
                .delete(promotions::delete_promotion),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = Page::new(vec![1, 2], 2, None, None, 50);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 50);

        let page = Page::<i32>::new(vec![], 0, Some(0), Some(1000), 50);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 200);
    }
}
