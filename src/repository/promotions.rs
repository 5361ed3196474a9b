//! Promotions repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::promotion::{
        BulkAction, CreatePromotion, Promotion, PromotionQuery, UpdatePromotion,
    },
};

#[derive(Clone)]
pub struct PromotionsRepository {
    pool: Pool<Postgres>,
}

impl PromotionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Admin grid listing: search, active filter, sort and pagination
    pub async fn list(&self, query: &PromotionQuery) -> AppResult<(Vec<Promotion>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let offset = (page - 1) * per_page;

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));

        let mut conditions = Vec::new();
        let mut idx = 1;

        if search.is_some() {
            conditions.push(format!("(title ILIKE ${0} OR description ILIKE ${0})", idx));
            idx += 1;
        }
        if query.active.is_some() {
            conditions.push(format!("is_active = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_q = format!("SELECT COUNT(*) FROM promotions {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(ref s) = search { count_builder = count_builder.bind(s); }
        if let Some(active) = query.active { count_builder = count_builder.bind(active); }
        let total = count_builder.fetch_one(&self.pool).await?;

        let order_by = query.sort.unwrap_or_default().order_by();
        let select_q = format!(
            "SELECT * FROM promotions {} ORDER BY {} LIMIT {} OFFSET {}",
            where_clause, order_by, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, Promotion>(&select_q);
        if let Some(ref s) = search { builder = builder.bind(s); }
        if let Some(active) = query.active { builder = builder.bind(active); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    /// Active promotions in carousel order
    pub async fn list_active(&self) -> AppResult<Vec<Promotion>> {
        let rows = sqlx::query_as::<_, Promotion>(
            "SELECT * FROM promotions WHERE is_active ORDER BY display_order, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Promotion> {
        sqlx::query_as::<_, Promotion>("SELECT * FROM promotions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Promotion {} not found", id)))
    }

    /// Create a promotion, appended after the last one unless an order is given
    pub async fn create(&self, data: &CreatePromotion) -> AppResult<Promotion> {
        let row = sqlx::query_as::<_, Promotion>(
            r#"
            INSERT INTO promotions (
                title, description, image_url, badge, cta_text, cta_link,
                display_order, is_active
            ) VALUES (
                $1, $2, $3, $4, $5, $6,
                COALESCE($7, (SELECT COALESCE(MAX(display_order), -1) + 1 FROM promotions)),
                $8
            )
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.image_url)
        .bind(&data.badge)
        .bind(&data.cta_text)
        .bind(&data.cta_link)
        .bind(data.display_order)
        .bind(data.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a promotion; only provided fields change
    pub async fn update(&self, id: i32, data: &UpdatePromotion) -> AppResult<Promotion> {
        let row = sqlx::query_as::<_, Promotion>(
            r#"
            UPDATE promotions SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                image_url = COALESCE($3, image_url),
                badge = COALESCE($4, badge),
                cta_text = COALESCE($5, cta_text),
                cta_link = COALESCE($6, cta_link),
                display_order = COALESCE($7, display_order),
                is_active = COALESCE($8, is_active),
                updated_at = $9
            WHERE id = $10
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.image_url)
        .bind(&data.badge)
        .bind(&data.cta_text)
        .bind(&data.cta_link)
        .bind(data.display_order)
        .bind(data.is_active)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("Promotion {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM promotions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Promotion {} not found", id)));
        }
        Ok(())
    }

    /// Assign `display_order = position` for each id, all or nothing
    pub async fn reorder(&self, ids: &[i32]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for (position, id) in ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE promotions SET display_order = $1, updated_at = $2 WHERE id = $3",
            )
            .bind(position as i32)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::NotFound(format!("Promotion {} not found", id)));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Apply a bulk action; returns the number of rows touched
    pub async fn bulk(&self, ids: &[i32], action: BulkAction) -> AppResult<u64> {
        let result = match action {
            BulkAction::Activate | BulkAction::Deactivate => {
                sqlx::query(
                    "UPDATE promotions SET is_active = $1, updated_at = $2 WHERE id = ANY($3)",
                )
                .bind(action == BulkAction::Activate)
                .bind(Utc::now())
                .bind(ids)
                .execute(&self.pool)
                .await?
            }
            BulkAction::Delete => {
                sqlx::query("DELETE FROM promotions WHERE id = ANY($1)")
                    .bind(ids)
                    .execute(&self.pool)
                    .await?
            }
        };
        Ok(result.rows_affected())
    }
}
