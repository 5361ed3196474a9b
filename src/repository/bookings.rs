//! Bookings repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingQuery, BookingStatus},
        visitor::{NewVisitor, Visitor},
    },
};

use super::visitors::insert_visitor;

/// Columns of a booking insert
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub visitor_name: String,
    pub email: String,
    pub booking_date: chrono::NaiveDate,
    pub time_slot: String,
    pub booking_type: String,
    pub total_visitors: i32,
    pub institution: Option<String>,
    pub purpose: Option<String>,
}

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List bookings with optional filters and pagination
    pub async fn list(&self, query: &BookingQuery) -> AppResult<(Vec<Booking>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let offset = (page - 1) * per_page;

        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.start_date.is_some() {
            conditions.push(format!("booking_date >= ${}", idx));
            idx += 1;
        }
        if query.end_date.is_some() {
            conditions.push(format!("booking_date <= ${}", idx));
            idx += 1;
        }
        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if query.booking_type.is_some() {
            conditions.push(format!("booking_type = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let status = query.status.map(|s| s.as_str());
        let booking_type = query.booking_type.map(|t| t.as_str());

        let count_q = format!("SELECT COUNT(*) FROM bookings {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(sd) = query.start_date { count_builder = count_builder.bind(sd); }
        if let Some(ed) = query.end_date { count_builder = count_builder.bind(ed); }
        if let Some(st) = status { count_builder = count_builder.bind(st); }
        if let Some(bt) = booking_type { count_builder = count_builder.bind(bt); }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "SELECT * FROM bookings {} ORDER BY booking_date DESC, time_slot, id LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, Booking>(&select_q);
        if let Some(sd) = query.start_date { builder = builder.bind(sd); }
        if let Some(ed) = query.end_date { builder = builder.bind(ed); }
        if let Some(st) = status { builder = builder.bind(st); }
        if let Some(bt) = booking_type { builder = builder.bind(bt); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    /// Get booking by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Booking> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a booking and its main visitor in one transaction
    pub async fn create_with_main_visitor(
        &self,
        booking: &NewBooking,
        main_visitor: NewVisitor,
        token: &str,
    ) -> AppResult<(Booking, Visitor)> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                visitor_name, email, booking_date, time_slot, booking_type,
                total_visitors, institution, purpose
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&booking.visitor_name)
        .bind(&booking.email)
        .bind(booking.booking_date)
        .bind(&booking.time_slot)
        .bind(&booking.booking_type)
        .bind(booking.total_visitors)
        .bind(&booking.institution)
        .bind(&booking.purpose)
        .fetch_one(&mut *tx)
        .await?;

        let visitor = NewVisitor {
            booking_id: created.id,
            ..main_visitor
        };
        let visitor = insert_visitor(&mut *tx, &visitor, token).await?;

        tx.commit().await?;
        Ok((created, visitor))
    }

    /// Current calendar date in the museum's timezone
    pub async fn local_today(&self, timezone: &str) -> AppResult<chrono::NaiveDate> {
        let today = sqlx::query_scalar::<_, chrono::NaiveDate>("SELECT (NOW() AT TIME ZONE $1)::date")
            .bind(timezone)
            .fetch_one(&self.pool)
            .await?;
        Ok(today)
    }

    /// Set the booking status label
    pub async fn update_status(&self, id: i32, status: BookingStatus) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }
}
