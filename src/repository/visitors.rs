//! Visitors repository

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::visitor::{CompleteVisitorDetails, NewVisitor, Visitor},
};

#[derive(Clone)]
pub struct VisitorsRepository {
    pool: Pool<Postgres>,
}

/// Insert one visitor row on an open connection or transaction
pub(crate) async fn insert_visitor(
    conn: &mut PgConnection,
    visitor: &NewVisitor,
    token: &str,
) -> AppResult<Visitor> {
    let row = sqlx::query_as::<_, Visitor>(
        r#"
        INSERT INTO visitors (
            booking_id, first_name, last_name, email, gender, visitor_type,
            address, institution, purpose, is_main_visitor, details_completed, token
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(visitor.booking_id)
    .bind(&visitor.first_name)
    .bind(&visitor.last_name)
    .bind(&visitor.email)
    .bind(&visitor.gender)
    .bind(&visitor.visitor_type)
    .bind(&visitor.address)
    .bind(&visitor.institution)
    .bind(&visitor.purpose)
    .bind(visitor.is_main_visitor)
    .bind(visitor.details_completed)
    .bind(token)
    .fetch_one(conn)
    .await?;
    Ok(row)
}

impl VisitorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Visitor> {
        sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Visitor {} not found", id)))
    }

    /// Look up the visitor owning an emailed link or QR token
    pub async fn get_by_token(&self, token: &str) -> AppResult<Visitor> {
        sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid or expired visitor link".to_string()))
    }

    pub async fn list_for_booking(&self, booking_id: i32) -> AppResult<Vec<Visitor>> {
        let rows = sqlx::query_as::<_, Visitor>(
            "SELECT * FROM visitors WHERE booking_id = $1 ORDER BY is_main_visitor DESC, id",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert pending group members, refusing to exceed the declared
    /// visitor count. The booking row is locked for the duration.
    pub async fn create_members(
        &self,
        booking_id: i32,
        members: &[(NewVisitor, String)],
    ) -> AppResult<Vec<Visitor>> {
        let mut tx = self.pool.begin().await?;

        let declared: i32 =
            sqlx::query_scalar("SELECT total_visitors FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(booking_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visitors WHERE booking_id = $1")
            .bind(booking_id)
            .fetch_one(&mut *tx)
            .await?;

        let requested = members.len() as i64;
        if existing + requested > declared as i64 {
            return Err(AppError::BusinessRule(format!(
                "Booking {} declares {} visitors; {} registered, {} more requested",
                booking_id, declared, existing, requested
            )));
        }

        let mut created = Vec::with_capacity(members.len());
        for (member, token) in members {
            created.push(insert_visitor(&mut *tx, member, token).await?);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Store details submitted through a visitor link.
    /// Returns `None` when the visitor has already been checked in.
    pub async fn complete_details(
        &self,
        id: i32,
        data: &CompleteVisitorDetails,
    ) -> AppResult<Option<Visitor>> {
        let row = sqlx::query_as::<_, Visitor>(
            r#"
            UPDATE visitors SET
                first_name = $1,
                last_name = $2,
                email = COALESCE($3, email),
                gender = $4,
                visitor_type = $5,
                address = $6,
                institution = COALESCE($7, institution),
                purpose = COALESCE($8, purpose),
                details_completed = TRUE
            WHERE id = $9 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(data.first_name.trim())
        .bind(data.last_name.trim())
        .bind(&data.email)
        .bind(&data.gender)
        .bind(&data.visitor_type)
        .bind(&data.address)
        .bind(&data.institution)
        .bind(&data.purpose)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Mark a visitor as visited and stamp the check-in time.
    ///
    /// The timestamp is only written when none exists yet; a repeated scan
    /// returns the stored row with `true`. The first check-in of a booking
    /// moves a pending booking to `checked-in`.
    pub async fn check_in(&self, id: i32) -> AppResult<(Visitor, bool)> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Visitor>(
            r#"
            UPDATE visitors SET status = 'visited', checkin_time = NOW()
            WHERE id = $1 AND checkin_time IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let result = match updated {
            Some(visitor) => {
                sqlx::query(
                    "UPDATE bookings SET status = 'checked-in', updated_at = NOW() WHERE id = $1 AND status = 'pending'",
                )
                .bind(visitor.booking_id)
                .execute(&mut *tx)
                .await?;
                (visitor, false)
            }
            None => {
                let existing = sqlx::query_as::<_, Visitor>("SELECT * FROM visitors WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Visitor {} not found", id)))?;
                (existing, true)
            }
        };

        tx.commit().await?;
        Ok(result)
    }
}
