//! Repository layer for database operations

pub mod bookings;
pub mod checkins;
pub mod events;
pub mod promotions;
pub mod users;
pub mod visitors;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub bookings: bookings::BookingsRepository,
    pub visitors: visitors::VisitorsRepository,
    pub checkins: checkins::CheckinsRepository,
    pub events: events::EventsRepository,
    pub promotions: promotions::PromotionsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            bookings: bookings::BookingsRepository::new(pool.clone()),
            visitors: visitors::VisitorsRepository::new(pool.clone()),
            checkins: checkins::CheckinsRepository::new(pool.clone()),
            events: events::EventsRepository::new(pool.clone()),
            promotions: promotions::PromotionsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// Make sure the database accepts `timezone` in `AT TIME ZONE`
    pub async fn check_timezone(&self, timezone: &str) -> crate::error::AppResult<()> {
        sqlx::query("SELECT NOW() AT TIME ZONE $1")
            .bind(timezone)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Round-trip to the database, used by the readiness probe
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
