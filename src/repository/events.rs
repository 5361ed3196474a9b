//! Events repository

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::event::{
        CreateEvent, Event, EventQuery, EventRegistration, EventSummary, RegisterForEvent,
        UpdateEvent,
    },
};

#[derive(Clone)]
pub struct EventsRepository {
    pool: Pool<Postgres>,
}

impl EventsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List events with optional filters and pagination
    pub async fn list(&self, query: &EventQuery) -> AppResult<(Vec<Event>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let offset = (page - 1) * per_page;

        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.start_date.is_some() {
            conditions.push(format!("event_date >= ${}", idx));
            idx += 1;
        }
        if query.end_date.is_some() {
            conditions.push(format!("event_date <= ${}", idx));
            idx += 1;
        }
        if query.is_active.is_some() {
            conditions.push(format!("is_active = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_q = format!("SELECT COUNT(*) FROM events {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(sd) = query.start_date { count_builder = count_builder.bind(sd); }
        if let Some(ed) = query.end_date { count_builder = count_builder.bind(ed); }
        if let Some(active) = query.is_active { count_builder = count_builder.bind(active); }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "SELECT * FROM events {} ORDER BY event_date DESC, start_time LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, Event>(&select_q);
        if let Some(sd) = query.start_date { builder = builder.bind(sd); }
        if let Some(ed) = query.end_date { builder = builder.bind(ed); }
        if let Some(active) = query.is_active { builder = builder.bind(active); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    /// Active events on or after `from`, soonest first, with registration counts
    pub async fn upcoming(&self, from: NaiveDate) -> AppResult<Vec<EventSummary>> {
        let rows = sqlx::query_as::<_, EventSummary>(
            r#"
            SELECT e.*, COUNT(r.id) AS registered_count
            FROM events e
            LEFT JOIN event_registrations r ON r.event_id = e.id
            WHERE e.is_active AND e.event_date >= $1
            GROUP BY e.id
            ORDER BY e.event_date, e.start_time NULLS LAST, e.id
            "#,
        )
        .bind(from)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get event by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Event> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    /// Create an event
    pub async fn create(&self, data: &CreateEvent) -> AppResult<Event> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                title, description, location, event_date, start_time, end_time,
                capacity, image_url, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.location)
        .bind(data.event_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.capacity)
        .bind(&data.image_url)
        .bind(data.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update an event; only provided fields change
    pub async fn update(&self, id: i32, data: &UpdateEvent) -> AppResult<Event> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_f {
            ($field:expr, $name:expr) => {
                if $field.is_some() { sets.push(format!("{} = ${}", $name, idx)); idx += 1; }
            };
        }

        add_f!(data.title, "title");
        add_f!(data.description, "description");
        add_f!(data.location, "location");
        add_f!(data.event_date, "event_date");
        add_f!(data.start_time, "start_time");
        add_f!(data.end_time, "end_time");
        add_f!(data.capacity, "capacity");
        add_f!(data.image_url, "image_url");
        add_f!(data.is_active, "is_active");

        let query = format!("UPDATE events SET {} WHERE id = ${} RETURNING *", sets.join(", "), idx);

        let mut builder = sqlx::query_as::<_, Event>(&query).bind(now);

        macro_rules! bind_f {
            ($field:expr) => {
                if let Some(ref val) = $field { builder = builder.bind(val); }
            };
        }

        bind_f!(data.title);
        bind_f!(data.description);
        bind_f!(data.location);
        bind_f!(data.event_date);
        bind_f!(data.start_time);
        bind_f!(data.end_time);
        bind_f!(data.capacity);
        bind_f!(data.image_url);
        bind_f!(data.is_active);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    /// Delete an event and its registrations
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Event {} not found", id)));
        }
        Ok(())
    }

    /// Register for an event.
    ///
    /// Returns the existing registration with `true` when the email is
    /// already registered. Capacity is checked with the event row locked.
    pub async fn register(
        &self,
        event_id: i32,
        data: &RegisterForEvent,
    ) -> AppResult<(EventRegistration, bool)> {
        let email = data.email.trim().to_lowercase();
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

        let existing = sqlx::query_as::<_, EventRegistration>(
            "SELECT * FROM event_registrations WHERE event_id = $1 AND email = $2",
        )
        .bind(event_id)
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(registration) = existing {
            tx.commit().await?;
            return Ok((registration, true));
        }

        if !event.is_active {
            return Err(AppError::BusinessRule(format!(
                "Event {} is not open for registration",
                event_id
            )));
        }

        if let Some(capacity) = event.capacity {
            let registered: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
                    .bind(event_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if registered >= capacity as i64 {
                return Err(AppError::BusinessRule(format!("Event {} is full", event_id)));
            }
        }

        let registration = sqlx::query_as::<_, EventRegistration>(
            r#"
            INSERT INTO event_registrations (event_id, full_name, email, phone, institution)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(data.full_name.trim())
        .bind(&email)
        .bind(&data.phone)
        .bind(&data.institution)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((registration, false))
    }

    pub async fn registrations(&self, event_id: i32) -> AppResult<Vec<EventRegistration>> {
        let rows = sqlx::query_as::<_, EventRegistration>(
            "SELECT * FROM event_registrations WHERE event_id = $1 ORDER BY created_at, id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
