//! Business logic services

pub mod bookings;
pub mod checkins;
pub mod email;
pub mod events;
pub mod export;
pub mod promotions;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub bookings: bookings::BookingsService,
    pub checkins: checkins::CheckinService,
    pub events: events::EventsService,
    pub promotions: promotions::PromotionsService,
    pub users: users::UsersService,
    pub email: email::EmailService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let email = email::EmailService::new(config.email.clone(), config.museum.clone());

        Self {
            bookings: bookings::BookingsService::new(
                repository.clone(),
                email.clone(),
                config.museum.clone(),
            ),
            checkins: checkins::CheckinService::new(
                Arc::new(repository.checkins.clone()),
                config.museum.timezone.clone(),
            ),
            events: events::EventsService::new(repository.clone(), config.museum.clone()),
            promotions: promotions::PromotionsService::new(repository.clone()),
            users: users::UsersService::new(repository, config.auth.clone()),
            email,
        }
    }
}
