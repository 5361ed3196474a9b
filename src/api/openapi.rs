//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, bookings, checkin, events, health, promotions, reports, users, visitors};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MuseoSmart API",
        version = "1.0.0",
        description = "Museum visitor management REST API",
        contact(name = "MuseoSmart Team")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::create_user,
        // Bookings
        bookings::create_booking,
        bookings::create_walk_in,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::list_booking_visitors,
        bookings::update_booking_status,
        bookings::invite_members,
        // Visitor links
        visitors::get_visitor_form,
        visitors::complete_visitor_details,
        visitors::invite_members,
        // Check-in
        checkin::scan,
        checkin::check_in_visitor,
        // Reports
        reports::group_arrival,
        reports::group_details,
        reports::checkin_stats,
        reports::export_group,
        // Events
        events::upcoming_events,
        events::list_events,
        events::get_event,
        events::create_event,
        events::update_event,
        events::delete_event,
        events::register,
        events::list_registrations,
        // Promotions
        promotions::active_promotions,
        promotions::list_promotions,
        promotions::get_promotion,
        promotions::create_promotion,
        promotions::update_promotion,
        promotions::delete_promotion,
        promotions::reorder_promotions,
        promotions::bulk_action,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::UserInfo,
            crate::models::user::Role,
            crate::models::user::CreateUser,
            // Bookings
            crate::models::booking::Booking,
            crate::models::booking::BookingType,
            crate::models::booking::BookingStatus,
            crate::models::booking::MainVisitorInput,
            crate::models::booking::CreateBooking,
            crate::models::booking::CreateWalkIn,
            crate::models::booking::UpdateBookingStatus,
            crate::models::booking::InviteMembers,
            crate::models::booking::BookingCreated,
            crate::api::BookingsPage,
            // Visitors
            crate::models::visitor::Visitor,
            crate::models::visitor::VisitorForm,
            crate::models::visitor::CompleteVisitorDetails,
            crate::models::visitor::InvitedMember,
            // Check-in
            crate::models::checkin::ScanRequest,
            crate::models::checkin::CheckinResult,
            crate::models::checkin::ArrivalVisitor,
            crate::models::checkin::GroupArrival,
            crate::models::checkin::CheckinSummary,
            crate::models::checkin::GroupCheckinDetails,
            crate::models::checkin::DailyCheckinStats,
            crate::models::checkin::CheckinExportRow,
            crate::models::checkin::ExportFormat,
            // Events
            crate::models::event::Event,
            crate::models::event::EventSummary,
            crate::models::event::CreateEvent,
            crate::models::event::UpdateEvent,
            crate::models::event::EventRegistration,
            crate::models::event::RegisterForEvent,
            crate::models::event::RegistrationResult,
            crate::api::EventsPage,
            // Promotions
            crate::models::promotion::Promotion,
            crate::models::promotion::CreatePromotion,
            crate::models::promotion::UpdatePromotion,
            crate::models::promotion::PromotionSort,
            crate::models::promotion::ReorderPromotions,
            crate::models::promotion::BulkAction,
            crate::models::promotion::BulkPromotionAction,
            crate::models::promotion::BulkActionResult,
            crate::api::PromotionsPage,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Staff authentication"),
        (name = "users", description = "Staff account management"),
        (name = "bookings", description = "Reservations and walk-ins"),
        (name = "visitors", description = "Visitor links and intake forms"),
        (name = "checkin", description = "QR and manual check-in"),
        (name = "reports", description = "Group arrival and check-in statistics"),
        (name = "events", description = "Events and registrations"),
        (name = "promotions", description = "Homepage promotional content")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
