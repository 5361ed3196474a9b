//! Flatten a booking's check-in details into downloadable rows

use crate::{
    error::{AppError, AppResult},
    models::{
        checkin::{CheckinExportRow, GroupCheckinDetails},
        visitor::Visitor,
    },
};

/// Main and additional visitors as one list, ordered by check-in time.
/// Visitors without a check-in come last, in their input order.
pub fn format_checkin_export(details: &GroupCheckinDetails) -> Vec<CheckinExportRow> {
    let mut rows: Vec<CheckinExportRow> = details
        .main_visitors
        .iter()
        .map(|v| export_row(v, "Main"))
        .chain(details.additional_visitors.iter().map(|v| export_row(v, "Additional")))
        .collect();

    rows.sort_by_key(|r| (r.checkin_time.is_none(), r.checkin_time));
    rows
}

fn export_row(visitor: &Visitor, visitor_type: &str) -> CheckinExportRow {
    CheckinExportRow {
        visitor_type: visitor_type.to_string(),
        name: visitor.display_name(),
        email: visitor.email.clone(),
        checkin_time: visitor.checkin_time,
        status: visitor.status.clone(),
    }
}

/// Render rows as CSV with a header line
pub fn to_csv(rows: &[CheckinExportRow]) -> AppResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::Internal(format!("CSV encoding failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        booking::Booking,
        checkin::{CheckinSummary, GroupArrival},
    };
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    fn visitor(id: i32, name: &str, main: bool, checkin: Option<DateTime<Utc>>) -> Visitor {
        Visitor {
            id,
            booking_id: 1,
            first_name: Some(name.to_string()),
            last_name: None,
            email: Some(format!("{}@mail.ph", name.to_lowercase())),
            gender: None,
            visitor_type: None,
            address: None,
            institution: None,
            purpose: None,
            is_main_visitor: main,
            status: if checkin.is_some() { "visited" } else { "pending" }.to_string(),
            checkin_time: checkin,
            token: format!("t{}", id),
            details_completed: true,
            created_at: at(0, 0),
        }
    }

    fn details(main: Vec<Visitor>, additional: Vec<Visitor>) -> GroupCheckinDetails {
        GroupCheckinDetails {
            booking: Booking {
                id: 1,
                visitor_name: "Leader".to_string(),
                email: "leader@mail.ph".to_string(),
                booking_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                time_slot: "09:00-11:00".to_string(),
                booking_type: "group".to_string(),
                status: "checked-in".to_string(),
                total_visitors: 4,
                institution: None,
                purpose: None,
                created_at: at(0, 0),
                updated_at: None,
            },
            main_visitors: main,
            additional_visitors: additional,
            arrival: GroupArrival {
                booking_id: 1,
                arrival_time: None,
                checked_in_count: 0,
                total_expected: 0,
                visitors: vec![],
                message: String::new(),
            },
            summary: CheckinSummary {
                expected: 0,
                checked_in: 0,
                declared: 4,
                progress: String::new(),
                is_complete: false,
            },
        }
    }

    #[test]
    fn test_export_sorted_by_checkin_time() {
        let d = details(
            vec![visitor(1, "Leader", true, Some(at(9, 30)))],
            vec![
                visitor(2, "Ana", false, Some(at(9, 45))),
                visitor(3, "Ben", false, Some(at(9, 10))),
                visitor(4, "Cris", false, None),
            ],
        );

        let rows = format_checkin_export(&d);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ben", "Leader", "Ana", "Cris"]);
        assert_eq!(rows[1].visitor_type, "Main");
        assert_eq!(rows[0].visitor_type, "Additional");
        assert_eq!(rows[3].status, "pending");
        assert_eq!(rows[3].checkin_time, None);
    }

    #[test]
    fn test_pending_visitors_keep_input_order() {
        let d = details(
            vec![visitor(1, "Leader", true, None)],
            vec![visitor(2, "Ana", false, None), visitor(3, "Ben", false, None)],
        );
        let names: Vec<_> = format_checkin_export(&d).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Leader", "Ana", "Ben"]);
    }

    #[test]
    fn test_to_csv() {
        let d = details(vec![visitor(1, "Leader", true, Some(at(9, 30)))], vec![]);
        let csv = to_csv(&format_checkin_export(&d)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("visitor_type,name,email,checkin_time,status"));
        let line = lines.next().unwrap();
        assert!(line.starts_with("Main,Leader,leader@mail.ph,2025-06-02T09:30:00"));
        assert!(line.ends_with(",visited"));
    }
}
