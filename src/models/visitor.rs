//! Visitor model (one row per person attached to a booking)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_VISITED: &str = "visited";

/// Visitor record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Visitor {
    pub id: i32,
    pub booking_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    /// Free label (student, teacher, local, foreign, ...)
    pub visitor_type: Option<String>,
    pub address: Option<String>,
    pub institution: Option<String>,
    pub purpose: Option<String>,
    /// True for the person who created the booking
    pub is_main_visitor: bool,
    /// pending | visited
    pub status: String,
    /// Set once, when status becomes visited
    pub checkin_time: Option<DateTime<Utc>>,
    /// Emailed link / QR payload
    pub token: String,
    pub details_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Visitor {
    /// Display name, falling back to the email for members who have not
    /// completed their form yet
    pub fn display_name(&self) -> String {
        display_name(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.email.as_deref(),
        )
    }

    pub fn is_visited(&self) -> bool {
        self.status == STATUS_VISITED
    }
}

pub fn display_name(first: Option<&str>, last: Option<&str>, email: Option<&str>) -> String {
    let full = [first, last]
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !full.is_empty() {
        full
    } else {
        email.unwrap_or("Unnamed visitor").to_string()
    }
}

/// Form returned to a visitor opening their emailed link.
/// Institution and purpose are pre-filled from the booking when the
/// visitor has not set them.
#[derive(Debug, Serialize, ToSchema)]
pub struct VisitorForm {
    pub visitor_id: i32,
    pub booking_id: i32,
    pub is_main_visitor: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub visitor_type: Option<String>,
    pub address: Option<String>,
    pub institution: Option<String>,
    pub purpose: Option<String>,
    pub details_completed: bool,
    /// Visit date and slot, for display
    pub booking_date: chrono::NaiveDate,
    pub time_slot: String,
}

/// Visitor details submitted through a token link
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CompleteVisitorDetails {
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
    pub email: Option<String>,
    pub gender: Option<String>,
    pub visitor_type: Option<String>,
    pub address: Option<String>,
    pub institution: Option<String>,
    pub purpose: Option<String>,
}

/// Invitation outcome shown to a group leader; member tokens stay private
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InvitedMember {
    pub id: i32,
    pub email: Option<String>,
    /// pending | visited
    pub status: String,
}

impl From<&Visitor> for InvitedMember {
    fn from(visitor: &Visitor) -> Self {
        Self {
            id: visitor.id,
            email: visitor.email.clone(),
            status: visitor.status.clone(),
        }
    }
}

/// Rejects names made only of whitespace
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Row inserted for a new visitor
#[derive(Debug, Clone, Default)]
pub struct NewVisitor {
    pub booking_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub visitor_type: Option<String>,
    pub address: Option<String>,
    pub institution: Option<String>,
    pub purpose: Option<String>,
    pub is_main_visitor: bool,
    pub details_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Some("Ana"), Some("Reyes"), None), "Ana Reyes");
        assert_eq!(display_name(Some("Ana"), None, None), "Ana");
        assert_eq!(display_name(Some(" "), None, Some("a@b.ph")), "a@b.ph");
        assert_eq!(display_name(None, None, None), "Unnamed visitor");
    }

    fn details(first: &str, last: &str) -> CompleteVisitorDetails {
        CompleteVisitorDetails {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: None,
            gender: None,
            visitor_type: None,
            address: None,
            institution: None,
            purpose: None,
        }
    }

    #[test]
    fn test_blank_names_rejected() {
        assert!(details("Ana", "Reyes").validate().is_ok());
        let errors = details(" ", "Reyes").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
        let errors = details("Ana", "\t ").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("last_name"));
    }

    #[test]
    fn test_invited_member_hides_token() {
        let visitor = Visitor {
            id: 12,
            booking_id: 4,
            first_name: None,
            last_name: None,
            email: Some("ben@school.ph".to_string()),
            gender: None,
            visitor_type: None,
            address: None,
            institution: None,
            purpose: None,
            is_main_visitor: false,
            status: STATUS_PENDING.to_string(),
            checkin_time: None,
            token: "secret-member-token".to_string(),
            details_completed: false,
            created_at: Utc::now(),
        };

        let member = InvitedMember::from(&visitor);
        assert_eq!(member.id, 12);
        let json = serde_json::to_value(&member).unwrap();
        assert!(json.get("token").is_none());
        assert!(!json.to_string().contains("secret-member-token"));
    }
}
