//! Group check-in aggregation: arrival time, per-booking detail view and
//! daily statistics.
//!
//! Everything here is read-only. Visitor and booking status are written by
//! the check-in endpoints in [`crate::services::bookings`]; this service only
//! observes them, so concurrent scans may make a result slightly stale.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use crate::{
    error::{AppError, AppResult},
    models::{
        checkin::{
            ArrivalVisitor, CheckedInVisitor, CheckinExportRow, CheckinSummary, DailyCheckinRow,
            DailyCheckinStats, GroupArrival, GroupCheckinDetails, VisitorCounts,
        },
        visitor::display_name,
    },
    repository::checkins::CheckinStore,
    services::export,
};

pub const NO_ARRIVALS_MESSAGE: &str = "No visitors have checked in yet";

#[derive(Clone)]
pub struct CheckinService {
    store: Arc<dyn CheckinStore>,
    timezone: String,
}

impl CheckinService {
    pub fn new(store: Arc<dyn CheckinStore>, timezone: String) -> Self {
        Self { store, timezone }
    }

    /// When did the group start arriving, and how many of its visitors are in
    pub async fn group_arrival(&self, booking_id: i32) -> AppResult<GroupArrival> {
        ensure_booking_id(booking_id)?;

        let rows = self
            .store
            .checked_in_visitors(booking_id)
            .await
            .inspect_err(|e| tracing::error!(booking_id, error = %e, "Failed to load checked-in visitors"))?;
        let counts = self
            .store
            .visitor_counts(booking_id)
            .await
            .inspect_err(|e| tracing::error!(booking_id, error = %e, "Failed to count booking visitors"))?;

        Ok(build_arrival(booking_id, rows, counts))
    }

    /// Booking, its visitors split by role, arrival info and a summary
    pub async fn group_checkin_details(&self, booking_id: i32) -> AppResult<GroupCheckinDetails> {
        ensure_booking_id(booking_id)?;

        let booking = self
            .store
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        let main_visitors = self.store.main_visitors(booking_id).await?;
        let additional_visitors = self.store.additional_visitors(booking_id).await?;
        let arrival = self.group_arrival(booking_id).await?;
        let summary = summarize(&arrival, booking.total_visitors);

        Ok(GroupCheckinDetails {
            booking,
            main_visitors,
            additional_visitors,
            arrival,
            summary,
        })
    }

    /// Daily check-in statistics for an inclusive date range
    pub async fn checkin_stats(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DailyCheckinStats>> {
        if start > end {
            return Err(AppError::Validation(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }

        let rows = self
            .store
            .daily_checkins(start, end, &self.timezone)
            .await
            .inspect_err(|e| tracing::error!(%start, %end, error = %e, "Failed to aggregate check-ins"))?;

        Ok(rows.into_iter().map(daily_stats).collect())
    }

    /// Visitor-by-visitor list for download, earliest check-in first
    pub async fn export(&self, booking_id: i32) -> AppResult<Vec<CheckinExportRow>> {
        let details = self.group_checkin_details(booking_id).await?;
        Ok(export::format_checkin_export(&details))
    }
}

fn ensure_booking_id(booking_id: i32) -> AppResult<()> {
    if booking_id <= 0 {
        return Err(AppError::Validation(format!("Invalid booking id {}", booking_id)));
    }
    Ok(())
}

/// Arrival time is the earliest check-in; expected is main + additional rows.
pub fn build_arrival(
    booking_id: i32,
    mut rows: Vec<CheckedInVisitor>,
    counts: VisitorCounts,
) -> GroupArrival {
    let total_expected = counts.total();

    if rows.is_empty() {
        return GroupArrival {
            booking_id,
            arrival_time: None,
            checked_in_count: 0,
            total_expected,
            visitors: Vec::new(),
            message: NO_ARRIVALS_MESSAGE.to_string(),
        };
    }

    rows.sort_by_key(|r| (r.checkin_time, r.id));
    let arrival_time = rows[0].checkin_time;
    let checked_in_count = rows.len() as i64;

    let visitors = rows
        .into_iter()
        .map(|r| ArrivalVisitor {
            id: r.id,
            name: display_name(
                r.first_name.as_deref(),
                r.last_name.as_deref(),
                r.email.as_deref(),
            ),
            checkin_time: r.checkin_time,
            is_main_visitor: r.is_main_visitor,
        })
        .collect();

    GroupArrival {
        booking_id,
        arrival_time: Some(arrival_time),
        checked_in_count,
        total_expected,
        visitors,
        message: format!(
            "Group arrived at {}; {} of {} visitors checked in",
            arrival_time.format("%Y-%m-%d %H:%M:%S UTC"),
            checked_in_count,
            total_expected
        ),
    }
}

/// Complete as soon as checked-in reaches expected
pub fn summarize(arrival: &GroupArrival, declared: i32) -> CheckinSummary {
    let expected = arrival.total_expected;
    let checked_in = arrival.checked_in_count;
    CheckinSummary {
        expected,
        checked_in,
        declared,
        progress: format!("{}/{} visitors checked in", checked_in, expected),
        is_complete: checked_in >= expected,
    }
}

/// Convert a mean of seconds-since-midnight back to a clock time,
/// rounded to the second
pub fn clock_from_seconds(seconds: f64) -> NaiveTime {
    if !seconds.is_finite() {
        return NaiveTime::MIN;
    }
    let secs = seconds.round().clamp(0.0, 86_399.0) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or_default()
}

fn daily_stats(row: DailyCheckinRow) -> DailyCheckinStats {
    DailyCheckinStats {
        date: row.day,
        checkins: row.checkins,
        groups: row.group_count,
        first_checkin: row.first_checkin,
        last_checkin: row.last_checkin,
        average_checkin_time: clock_from_seconds(row.avg_seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{booking::Booking, visitor::Visitor};
    use crate::repository::checkins::MockCheckinStore;
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, h, m, s).unwrap()
    }

    fn checked_in(id: i32, first: &str, time: DateTime<Utc>, main: bool) -> CheckedInVisitor {
        CheckedInVisitor {
            id,
            first_name: Some(first.to_string()),
            last_name: Some("Santos".to_string()),
            email: None,
            checkin_time: time,
            is_main_visitor: main,
        }
    }

    fn booking(id: i32, declared: i32) -> Booking {
        Booking {
            id,
            visitor_name: "Maria Santos".to_string(),
            email: "maria@school.ph".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            time_slot: "09:00-10:00".to_string(),
            booking_type: "group".to_string(),
            status: "checked-in".to_string(),
            total_visitors: declared,
            institution: Some("Rizal High School".to_string()),
            purpose: Some("Field trip".to_string()),
            created_at: at(1, 0, 0),
            updated_at: None,
        }
    }

    fn visitor(id: i32, main: bool, checkin: Option<DateTime<Utc>>) -> Visitor {
        Visitor {
            id,
            booking_id: 9,
            first_name: Some(format!("V{}", id)),
            last_name: None,
            email: Some(format!("v{}@school.ph", id)),
            gender: None,
            visitor_type: Some("student".to_string()),
            address: None,
            institution: None,
            purpose: None,
            is_main_visitor: main,
            status: if checkin.is_some() { "visited" } else { "pending" }.to_string(),
            checkin_time: checkin,
            token: format!("tok{}", id),
            details_completed: true,
            created_at: at(1, 0, 0),
        }
    }

    fn service(store: MockCheckinStore) -> CheckinService {
        CheckinService::new(Arc::new(store), "Asia/Manila".to_string())
    }

    #[tokio::test]
    async fn test_no_arrivals_yet() {
        let mut store = MockCheckinStore::new();
        store
            .expect_checked_in_visitors()
            .with(eq(9))
            .returning(|_| Ok(vec![]));
        store
            .expect_visitor_counts()
            .with(eq(9))
            .returning(|_| Ok(VisitorCounts { main: 1, additional: 3 }));

        let arrival = assert_ok!(service(store).group_arrival(9).await);
        assert_eq!(arrival.arrival_time, None);
        assert_eq!(arrival.checked_in_count, 0);
        assert_eq!(arrival.total_expected, 4);
        assert!(arrival.visitors.is_empty());
        assert_eq!(arrival.message, NO_ARRIVALS_MESSAGE);
    }

    #[tokio::test]
    async fn test_arrival_is_earliest_checkin() {
        let mut store = MockCheckinStore::new();
        store.expect_checked_in_visitors().returning(|_| {
            Ok(vec![
                checked_in(2, "Ben", at(9, 5, 0), false),
                checked_in(1, "Maria", at(9, 12, 0), true),
                checked_in(3, "Carla", at(9, 40, 0), false),
            ])
        });
        store
            .expect_visitor_counts()
            .returning(|_| Ok(VisitorCounts { main: 1, additional: 3 }));

        let arrival = assert_ok!(service(store).group_arrival(9).await);
        assert_eq!(arrival.arrival_time, Some(at(9, 5, 0)));
        assert_eq!(arrival.checked_in_count, 3);
        let times: Vec<_> = arrival.visitors.iter().map(|v| v.checkin_time).collect();
        assert_eq!(times, vec![at(9, 5, 0), at(9, 12, 0), at(9, 40, 0)]);
        assert_eq!(arrival.visitors[1].name, "Maria Santos");
        assert!(arrival.visitors[1].is_main_visitor);
    }

    #[test]
    fn test_build_arrival_orders_unsorted_rows() {
        let rows = vec![
            checked_in(3, "Carla", at(10, 0, 0), false),
            checked_in(1, "Maria", at(8, 30, 0), true),
            checked_in(2, "Ben", at(9, 15, 0), false),
        ];
        let arrival = build_arrival(9, rows, VisitorCounts { main: 1, additional: 2 });
        assert_eq!(arrival.arrival_time, Some(at(8, 30, 0)));
        let ids: Vec<_> = arrival.visitors.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_completion_flag() {
        let rows = |n: i32| {
            (1..=n)
                .map(|i| checked_in(i, "V", at(9, i as u32, 0), i == 1))
                .collect::<Vec<_>>()
        };
        let counts = VisitorCounts { main: 1, additional: 3 };

        let full = summarize(&build_arrival(9, rows(4), counts), 4);
        assert!(full.is_complete);
        assert_eq!(full.progress, "4/4 visitors checked in");

        let partial = summarize(&build_arrival(9, rows(3), counts), 4);
        assert!(!partial.is_complete);
        assert_eq!(partial.expected, 4);
        assert_eq!(partial.checked_in, 3);
    }

    #[tokio::test]
    async fn test_arrival_is_idempotent() {
        let mut store = MockCheckinStore::new();
        store
            .expect_checked_in_visitors()
            .times(2)
            .returning(|_| Ok(vec![checked_in(1, "Maria", at(9, 0, 0), true)]));
        store
            .expect_visitor_counts()
            .times(2)
            .returning(|_| Ok(VisitorCounts { main: 1, additional: 0 }));

        let service = service(store);
        let first = assert_ok!(service.group_arrival(9).await);
        let second = assert_ok!(service.group_arrival(9).await);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_database_error_propagates() {
        let mut store = MockCheckinStore::new();
        store
            .expect_checked_in_visitors()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let err = assert_err!(service(store).group_arrival(9).await);
        assert!(matches!(err, AppError::Database(sqlx::Error::PoolTimedOut)));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_booking_id() {
        let store = MockCheckinStore::new();
        let err = assert_err!(service(store).group_arrival(0).await);
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_details_for_missing_booking() {
        let mut store = MockCheckinStore::new();
        store.expect_find_booking().with(eq(42)).returning(|_| Ok(None));

        let err = assert_err!(service(store).group_checkin_details(42).await);
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Booking 42 not found"));
    }

    #[tokio::test]
    async fn test_details_summary() {
        let mut store = MockCheckinStore::new();
        store.expect_find_booking().returning(|id| Ok(Some(booking(id, 3))));
        store
            .expect_main_visitors()
            .returning(|_| Ok(vec![visitor(1, true, Some(at(9, 0, 0)))]));
        store.expect_additional_visitors().returning(|_| {
            Ok(vec![
                visitor(2, false, Some(at(9, 3, 0))),
                visitor(3, false, None),
            ])
        });
        store.expect_checked_in_visitors().returning(|_| {
            Ok(vec![
                checked_in(1, "V1", at(9, 0, 0), true),
                checked_in(2, "V2", at(9, 3, 0), false),
            ])
        });
        store
            .expect_visitor_counts()
            .returning(|_| Ok(VisitorCounts { main: 1, additional: 2 }));

        let details = assert_ok!(service(store).group_checkin_details(9).await);
        assert_eq!(details.booking.id, 9);
        assert_eq!(details.main_visitors.len(), 1);
        assert_eq!(details.additional_visitors.len(), 2);
        assert_eq!(details.arrival.arrival_time, Some(at(9, 0, 0)));
        assert_eq!(details.summary.expected, 3);
        assert_eq!(details.summary.checked_in, 2);
        assert_eq!(details.summary.declared, 3);
        assert!(!details.summary.is_complete);
    }

    #[tokio::test]
    async fn test_stats_empty_range() {
        let mut store = MockCheckinStore::new();
        store
            .expect_daily_checkins()
            .withf(|_, _, tz| tz.to_string() == "Asia/Manila")
            .returning(|_, _, _| Ok(vec![]));

        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let stats = assert_ok!(service(store).checkin_stats(start, end).await);
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn test_stats_rejects_inverted_range() {
        let store = MockCheckinStore::new();
        let start = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let err = assert_err!(service(store).checkin_stats(start, end).await);
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_stats_average_time() {
        let mut store = MockCheckinStore::new();
        store.expect_daily_checkins().returning(|_, _, _| {
            Ok(vec![DailyCheckinRow {
                day: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
                checkins: 2,
                group_count: 1,
                first_checkin: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                last_checkin: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
                avg_seconds: 36_000.0,
            }])
        });

        let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let stats = assert_ok!(service(store).checkin_stats(day, day).await);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].groups, 1);
        assert_eq!(
            stats[0].average_checkin_time,
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_clock_from_seconds() {
        assert_eq!(clock_from_seconds(37_800.4), NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(clock_from_seconds(37_800.6), NaiveTime::from_hms_opt(10, 30, 1).unwrap());
        assert_eq!(clock_from_seconds(-5.0), NaiveTime::MIN);
        assert_eq!(clock_from_seconds(90_000.0), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        assert_eq!(clock_from_seconds(f64::NAN), NaiveTime::MIN);
    }
}
