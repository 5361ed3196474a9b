//! Check-in models: QR scan payloads, group arrival, reporting rows

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::{booking::Booking, visitor::Visitor};

/// Visitor row with a check-in timestamp, as read for arrival computation
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CheckedInVisitor {
    pub id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub checkin_time: DateTime<Utc>,
    pub is_main_visitor: bool,
}

/// Number of visitor rows recorded against a booking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitorCounts {
    pub main: i64,
    pub additional: i64,
}

impl VisitorCounts {
    pub fn total(&self) -> i64 {
        self.main + self.additional
    }
}

/// One entry of the ordered arrival list
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ArrivalVisitor {
    pub id: i32,
    pub name: String,
    pub checkin_time: DateTime<Utc>,
    pub is_main_visitor: bool,
}

/// Arrival state of a booking
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GroupArrival {
    pub booking_id: i32,
    /// Earliest check-in among the booking's visitors; null until someone arrives
    pub arrival_time: Option<DateTime<Utc>>,
    pub checked_in_count: i64,
    /// Main visitor rows plus additional visitor rows
    pub total_expected: i64,
    /// Checked-in visitors, earliest first
    pub visitors: Vec<ArrivalVisitor>,
    pub message: String,
}

/// Expected vs. checked-in counts for a booking
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CheckinSummary {
    pub expected: i64,
    pub checked_in: i64,
    /// Visitor count declared on the booking
    pub declared: i32,
    /// e.g. "3/4 visitors checked in"
    pub progress: String,
    pub is_complete: bool,
}

/// Full administrative view of a booking's check-in state
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupCheckinDetails {
    pub booking: Booking,
    pub main_visitors: Vec<Visitor>,
    pub additional_visitors: Vec<Visitor>,
    pub arrival: GroupArrival,
    pub summary: CheckinSummary,
}

/// Per-day aggregate as returned by the database
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DailyCheckinRow {
    pub day: NaiveDate,
    pub checkins: i64,
    pub group_count: i64,
    pub first_checkin: NaiveTime,
    pub last_checkin: NaiveTime,
    /// Mean of seconds since local midnight
    pub avg_seconds: f64,
}

/// Per-day check-in statistics
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyCheckinStats {
    pub date: NaiveDate,
    pub checkins: i64,
    /// Distinct bookings with at least one check-in that day
    pub groups: i64,
    pub first_checkin: NaiveTime,
    pub last_checkin: NaiveTime,
    /// Mean time of day; does not account for check-ins past midnight
    pub average_checkin_time: NaiveTime,
}

/// Query parameters for check-in statistics
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CheckinStatsQuery {
    /// First day, inclusive (YYYY-MM-DD)
    pub start_date: NaiveDate,
    /// Last day, inclusive (YYYY-MM-DD)
    pub end_date: NaiveDate,
}

/// Flattened visitor line for download
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CheckinExportRow {
    /// "Main" or "Additional"
    pub visitor_type: String,
    pub name: String,
    pub email: Option<String>,
    pub checkin_time: Option<DateTime<Utc>>,
    pub status: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ExportQuery {
    /// json (default) or csv
    pub format: Option<ExportFormat>,
}

/// QR scan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanRequest {
    /// Token encoded in the visitor's QR code
    pub token: String,
}

/// Outcome of a check-in attempt
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckinResult {
    pub visitor: Visitor,
    /// True when the visitor had already been checked in; the original
    /// timestamp is kept
    pub already_checked_in: bool,
}
