//! Booking model (scheduled museum visits)

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::visitor::{not_blank, Visitor};

/// "09:00-10:00" style slots, or the literal "walk-in"
pub static TIME_SLOT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(walk-in|([01]\d|2[0-3]):[0-5]\d-([01]\d|2[0-3]):[0-5]\d)$")
        .expect("valid time slot regex")
});

pub const WALK_IN_SLOT: &str = "walk-in";

/// Booking record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i32,
    /// Name of the person who made the booking
    pub visitor_name: String,
    pub email: String,
    pub booking_date: NaiveDate,
    /// "HH:MM-HH:MM" or "walk-in"
    pub time_slot: String,
    /// individual | group
    pub booking_type: String,
    /// pending | checked-in | cancelled
    pub status: String,
    /// Visitor count declared at booking time
    pub total_visitors: i32,
    pub institution: Option<String>,
    pub purpose: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Individual,
    Group,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Individual => "individual",
            BookingType::Group => "group",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookingStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "checked-in")]
    CheckedIn,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::CheckedIn => "checked-in",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main visitor details submitted with a booking or a walk-in
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MainVisitorInput {
    #[validate(
        length(min = 1, max = 128, message = "First name is required"),
        custom(function = "not_blank", message = "First name is required")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, max = 128, message = "Last name is required"),
        custom(function = "not_blank", message = "Last name is required")
    )]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub gender: Option<String>,
    pub visitor_type: Option<String>,
    pub address: Option<String>,
}

/// Create booking request (public reservation form)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    /// Visit date (YYYY-MM-DD)
    pub booking_date: NaiveDate,
    /// "HH:MM-HH:MM"
    #[validate(regex(path = *TIME_SLOT_RE, message = "Invalid time slot"))]
    pub time_slot: String,
    pub booking_type: BookingType,
    /// Declared number of visitors including the main visitor
    #[validate(range(min = 1, max = 500))]
    pub total_visitors: Option<i32>,
    pub institution: Option<String>,
    pub purpose: Option<String>,
    #[validate(nested)]
    pub main_visitor: MainVisitorInput,
}

/// Walk-in intake request (individual visitor at the front desk)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWalkIn {
    pub institution: Option<String>,
    pub purpose: Option<String>,
    #[validate(nested)]
    pub visitor: MainVisitorInput,
}

/// Update booking status request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
}

/// Invite group members by email
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct InviteMembers {
    #[validate(length(min = 1, max = 200, message = "At least one email is required"))]
    pub emails: Vec<String>,
}

/// Query parameters for bookings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookingQuery {
    /// Filter by start date (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Filter by end date (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
    pub booking_type: Option<BookingType>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Items per page
    pub per_page: Option<i64>,
}

/// Booking with its visitor rows, returned on creation
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCreated {
    pub booking: Booking,
    pub main_visitor: Visitor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_slot_regex() {
        assert!(TIME_SLOT_RE.is_match("09:00-10:30"));
        assert!(TIME_SLOT_RE.is_match("walk-in"));
        assert!(!TIME_SLOT_RE.is_match("9:00-10:30"));
        assert!(!TIME_SLOT_RE.is_match("24:00-25:00"));
        assert!(!TIME_SLOT_RE.is_match("morning"));
    }

    #[test]
    fn test_main_visitor_rejects_blank_name() {
        let visitor = MainVisitorInput {
            first_name: "   ".to_string(),
            last_name: "Cruz".to_string(),
            email: "ana@school.ph".to_string(),
            gender: None,
            visitor_type: None,
            address: None,
        };
        let errors = visitor.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&BookingStatus::CheckedIn).unwrap();
        assert_eq!(json, "\"checked-in\"");
        let parsed: BookingStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, BookingStatus::Cancelled);
    }
}
