//! Event model (exhibitions, talks, workshops open for registration)

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::visitor::not_blank;

/// Event record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    /// Maximum registrations; unlimited when null
    pub capacity: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Event with its current registration count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub registered_count: i64,
}

/// Create event request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Event date (YYYY-MM-DD)
    pub event_date: NaiveDate,
    /// Start time (HH:MM:SS)
    pub start_time: Option<NaiveTime>,
    /// End time (HH:MM:SS)
    pub end_time: Option<NaiveTime>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Update event request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEvent {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Query parameters for events
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct EventQuery {
    /// Filter by start date (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Filter by end date (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Items per page
    pub per_page: Option<i64>,
}

/// Registration record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventRegistration {
    pub id: i32,
    pub event_id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub institution: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Register for an event
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterForEvent {
    #[validate(
        length(min = 1, max = 255, message = "Full name is required"),
        custom(function = "not_blank", message = "Full name is required")
    )]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: Option<String>,
    pub institution: Option<String>,
}

/// Registration outcome; a repeated registration is not an error
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResult {
    pub registration: EventRegistration,
    pub already_registered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_rejects_blank_name() {
        let data = RegisterForEvent {
            full_name: "  ".to_string(),
            email: "lea@example.org".to_string(),
            phone: None,
            institution: None,
        };
        let errors = data.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("full_name"));
    }
}
