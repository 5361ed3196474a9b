//! Events service

use validator::Validate;

use crate::{
    config::MuseumConfig,
    error::{AppError, AppResult},
    models::event::{
        CreateEvent, Event, EventQuery, EventRegistration, EventSummary, RegisterForEvent,
        RegistrationResult, UpdateEvent,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EventsService {
    repository: Repository,
    museum: MuseumConfig,
}

impl EventsService {
    pub fn new(repository: Repository, museum: MuseumConfig) -> Self {
        Self { repository, museum }
    }

    pub async fn list(&self, query: &EventQuery) -> AppResult<(Vec<Event>, i64)> {
        self.repository.events.list(query).await
    }

    /// Active events from today on, for the public listing
    pub async fn upcoming(&self) -> AppResult<Vec<EventSummary>> {
        let today = self.repository.bookings.local_today(&self.museum.timezone).await?;
        self.repository.events.upcoming(today).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Event> {
        self.repository.events.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateEvent) -> AppResult<Event> {
        data.validate()?;
        check_time_range(data.start_time, data.end_time)?;
        self.repository.events.create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdateEvent) -> AppResult<Event> {
        data.validate()?;
        check_time_range(data.start_time, data.end_time)?;
        self.repository.events.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.events.delete(id).await
    }

    /// Register a visitor; registering twice with the same email succeeds
    pub async fn register(&self, event_id: i32, data: &RegisterForEvent) -> AppResult<RegistrationResult> {
        data.validate()?;
        let (registration, already_registered) =
            self.repository.events.register(event_id, data).await?;

        if already_registered {
            tracing::info!(event_id, registration_id = registration.id, "Visitor already registered");
        } else {
            tracing::info!(event_id, registration_id = registration.id, "Event registration created");
        }

        Ok(RegistrationResult {
            registration,
            already_registered,
        })
    }

    pub async fn registrations(&self, event_id: i32) -> AppResult<Vec<EventRegistration>> {
        self.repository.events.get_by_id(event_id).await?;
        self.repository.events.registrations(event_id).await
    }
}

fn check_time_range(
    start: Option<chrono::NaiveTime>,
    end: Option<chrono::NaiveTime>,
) -> AppResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(AppError::Validation("end_time must be after start_time".to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_check_time_range() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0);
        let noon = NaiveTime::from_hms_opt(12, 0, 0);
        assert!(check_time_range(nine, noon).is_ok());
        assert!(check_time_range(noon, nine).is_err());
        assert!(check_time_range(nine, nine).is_err());
        assert!(check_time_range(None, nine).is_ok());
    }
}
