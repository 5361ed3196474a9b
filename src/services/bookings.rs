//! Booking intake, group member invitations and QR check-in

use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use crate::{
    config::MuseumConfig,
    error::{AppError, AppResult},
    models::{
        booking::{
            Booking, BookingCreated, BookingQuery, BookingStatus, BookingType, CreateBooking,
            CreateWalkIn, MainVisitorInput, WALK_IN_SLOT,
        },
        checkin::CheckinResult,
        visitor::{CompleteVisitorDetails, InvitedMember, NewVisitor, Visitor, VisitorForm},
    },
    repository::{bookings::NewBooking, Repository},
    services::email::EmailService,
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    email: EmailService,
    museum: MuseumConfig,
}

impl BookingsService {
    pub fn new(repository: Repository, email: EmailService, museum: MuseumConfig) -> Self {
        Self {
            repository,
            email,
            museum,
        }
    }

    pub async fn list(&self, query: &BookingQuery) -> AppResult<(Vec<Booking>, i64)> {
        self.repository.bookings.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Booking> {
        self.repository.bookings.get_by_id(id).await
    }

    pub async fn visitors(&self, booking_id: i32) -> AppResult<Vec<Visitor>> {
        self.repository.bookings.get_by_id(booking_id).await?;
        self.repository.visitors.list_for_booking(booking_id).await
    }

    pub async fn update_status(&self, id: i32, status: BookingStatus) -> AppResult<Booking> {
        let booking = self.repository.bookings.update_status(id, status).await?;
        tracing::info!(booking_id = id, %status, "Booking status updated");
        Ok(booking)
    }

    /// Reserve a visit slot and register its main visitor
    pub async fn create_booking(&self, data: CreateBooking) -> AppResult<BookingCreated> {
        data.validate()?;

        let today = self.repository.bookings.local_today(&self.museum.timezone).await?;
        if data.booking_date < today {
            return Err(AppError::Validation("Booking date is in the past".to_string()));
        }

        let total_visitors = resolve_total_visitors(data.booking_type, data.total_visitors)?;
        let new_booking = NewBooking {
            visitor_name: full_name(&data.main_visitor),
            email: data.main_visitor.email.trim().to_lowercase(),
            booking_date: data.booking_date,
            time_slot: data.time_slot.clone(),
            booking_type: data.booking_type.as_str().to_string(),
            total_visitors,
            institution: data.institution.clone(),
            purpose: data.purpose.clone(),
        };

        self.insert_booking(new_booking, &data.main_visitor).await
    }

    /// Front-desk intake of an individual visitor arriving without a booking
    pub async fn create_walk_in(&self, data: CreateWalkIn) -> AppResult<BookingCreated> {
        data.validate()?;

        let today = self.repository.bookings.local_today(&self.museum.timezone).await?;
        let new_booking = NewBooking {
            visitor_name: full_name(&data.visitor),
            email: data.visitor.email.trim().to_lowercase(),
            booking_date: today,
            time_slot: WALK_IN_SLOT.to_string(),
            booking_type: BookingType::Individual.as_str().to_string(),
            total_visitors: 1,
            institution: data.institution.clone(),
            purpose: data.purpose.clone(),
        };

        self.insert_booking(new_booking, &data.visitor).await
    }

    async fn insert_booking(
        &self,
        new_booking: NewBooking,
        main: &MainVisitorInput,
    ) -> AppResult<BookingCreated> {
        let main_visitor = NewVisitor {
            booking_id: 0,
            first_name: Some(main.first_name.trim().to_string()),
            last_name: Some(main.last_name.trim().to_string()),
            email: Some(new_booking.email.clone()),
            gender: main.gender.clone(),
            visitor_type: main.visitor_type.clone(),
            address: main.address.clone(),
            institution: new_booking.institution.clone(),
            purpose: new_booking.purpose.clone(),
            is_main_visitor: true,
            details_completed: true,
        };
        let token = new_token();

        let (booking, main_visitor) = self
            .repository
            .bookings
            .create_with_main_visitor(&new_booking, main_visitor, &token)
            .await?;

        tracing::info!(
            booking_id = booking.id,
            booking_type = %booking.booking_type,
            date = %booking.booking_date,
            "Booking created"
        );

        if let Err(e) = self
            .email
            .send_booking_confirmation(&booking.email, &booking, &token)
            .await
        {
            tracing::warn!(booking_id = booking.id, error = %e, "Failed to send booking confirmation");
        }

        Ok(BookingCreated {
            booking,
            main_visitor,
        })
    }

    /// Create pending member rows for a group booking and email each a link
    pub async fn invite_members(&self, booking_id: i32, emails: &[String]) -> AppResult<Vec<Visitor>> {
        let booking = self.repository.bookings.get_by_id(booking_id).await?;
        if booking.booking_type != BookingType::Group.as_str() {
            return Err(AppError::BusinessRule(format!(
                "Booking {} is not a group booking",
                booking_id
            )));
        }
        if booking.status == BookingStatus::Cancelled.as_str() {
            return Err(AppError::BusinessRule(format!("Booking {} is cancelled", booking_id)));
        }

        let emails = normalize_invite_emails(emails)?;
        let members: Vec<(NewVisitor, String)> = emails
            .iter()
            .map(|email| {
                let member = NewVisitor {
                    booking_id,
                    email: Some(email.clone()),
                    institution: booking.institution.clone(),
                    purpose: booking.purpose.clone(),
                    ..NewVisitor::default()
                };
                (member, new_token())
            })
            .collect();

        let created = self.repository.visitors.create_members(booking_id, &members).await?;
        tracing::info!(booking_id, count = created.len(), "Group members invited");

        for visitor in &created {
            if let Some(ref to) = visitor.email {
                if let Err(e) = self.email.send_member_invite(to, &booking, &visitor.token).await {
                    tracing::warn!(booking_id, visitor_id = visitor.id, error = %e, "Failed to send invitation");
                }
            }
        }

        Ok(created)
    }

    /// Invitations sent by the group leader through their own link
    pub async fn invite_members_as_leader(
        &self,
        leader_token: &str,
        emails: &[String],
    ) -> AppResult<Vec<InvitedMember>> {
        let leader = self.repository.visitors.get_by_token(leader_token).await?;
        if !leader.is_main_visitor {
            return Err(AppError::Authorization(
                "Only the group leader can invite members".to_string(),
            ));
        }
        let created = self.invite_members(leader.booking_id, emails).await?;
        Ok(created.iter().map(InvitedMember::from).collect())
    }

    /// Visitor form behind an emailed link, pre-filled from the booking
    pub async fn visitor_form(&self, token: &str) -> AppResult<VisitorForm> {
        let visitor = self.repository.visitors.get_by_token(token).await?;
        let booking = self.repository.bookings.get_by_id(visitor.booking_id).await?;
        Ok(prefill_form(visitor, &booking))
    }

    /// Store the details a visitor submitted through their link
    pub async fn complete_details(
        &self,
        token: &str,
        data: CompleteVisitorDetails,
    ) -> AppResult<Visitor> {
        data.validate()?;

        let visitor = self.repository.visitors.get_by_token(token).await?;
        if visitor.is_visited() {
            return Err(AppError::Conflict(
                "Visitor has already checked in; details can no longer be changed".to_string(),
            ));
        }

        self.repository
            .visitors
            .complete_details(visitor.id, &data)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(
                    "Visitor has already checked in; details can no longer be changed".to_string(),
                )
            })
    }

    /// Check in the visitor whose QR code was scanned
    pub async fn check_in_by_token(&self, token: &str) -> AppResult<CheckinResult> {
        let visitor = self.repository.visitors.get_by_token(token.trim()).await?;
        self.check_in(visitor).await
    }

    /// Manual check-in from the admin screen
    pub async fn check_in_by_id(&self, visitor_id: i32) -> AppResult<CheckinResult> {
        let visitor = self.repository.visitors.get_by_id(visitor_id).await?;
        self.check_in(visitor).await
    }

    async fn check_in(&self, visitor: Visitor) -> AppResult<CheckinResult> {
        let booking = self.repository.bookings.get_by_id(visitor.booking_id).await?;
        if booking.status == BookingStatus::Cancelled.as_str() {
            return Err(AppError::BusinessRule(format!(
                "Booking {} is cancelled",
                booking.id
            )));
        }

        let (visitor, already_checked_in) = self.repository.visitors.check_in(visitor.id).await?;

        if already_checked_in {
            tracing::info!(visitor_id = visitor.id, booking_id = visitor.booking_id, "Visitor already checked in");
        } else {
            tracing::info!(visitor_id = visitor.id, booking_id = visitor.booking_id, "Visitor checked in");
        }

        Ok(CheckinResult {
            visitor,
            already_checked_in,
        })
    }
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn full_name(visitor: &MainVisitorInput) -> String {
    format!("{} {}", visitor.first_name.trim(), visitor.last_name.trim())
}

/// Group bookings need at least two visitors; individual bookings are one
pub fn resolve_total_visitors(booking_type: BookingType, declared: Option<i32>) -> AppResult<i32> {
    match (booking_type, declared) {
        (BookingType::Individual, None | Some(1)) => Ok(1),
        (BookingType::Individual, Some(n)) => Err(AppError::Validation(format!(
            "Individual bookings are for one visitor, got {}",
            n
        ))),
        (BookingType::Group, Some(n)) if n >= 2 => Ok(n),
        (BookingType::Group, _) => Err(AppError::Validation(
            "Group bookings must declare at least 2 visitors".to_string(),
        )),
    }
}

/// Trim, lowercase and de-duplicate invite addresses, rejecting invalid ones
pub fn normalize_invite_emails(emails: &[String]) -> AppResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(emails.len());
    for email in emails {
        let email = email.trim().to_lowercase();
        if !email.validate_email() {
            return Err(AppError::Validation(format!("Invalid email address: {}", email)));
        }
        if !normalized.contains(&email) {
            normalized.push(email);
        }
    }
    if normalized.is_empty() {
        return Err(AppError::Validation("At least one email is required".to_string()));
    }
    Ok(normalized)
}

fn prefill_form(visitor: Visitor, booking: &Booking) -> VisitorForm {
    VisitorForm {
        visitor_id: visitor.id,
        booking_id: visitor.booking_id,
        is_main_visitor: visitor.is_main_visitor,
        first_name: visitor.first_name,
        last_name: visitor.last_name,
        email: visitor.email,
        gender: visitor.gender,
        visitor_type: visitor.visitor_type,
        address: visitor.address,
        institution: visitor.institution.or_else(|| booking.institution.clone()),
        purpose: visitor.purpose.or_else(|| booking.purpose.clone()),
        details_completed: visitor.details_completed,
        booking_date: booking.booking_date,
        time_slot: booking.time_slot.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_resolve_total_visitors() {
        assert_eq!(resolve_total_visitors(BookingType::Individual, None).unwrap(), 1);
        assert_eq!(resolve_total_visitors(BookingType::Individual, Some(1)).unwrap(), 1);
        assert!(resolve_total_visitors(BookingType::Individual, Some(3)).is_err());
        assert_eq!(resolve_total_visitors(BookingType::Group, Some(25)).unwrap(), 25);
        assert!(resolve_total_visitors(BookingType::Group, Some(1)).is_err());
        assert!(resolve_total_visitors(BookingType::Group, None).is_err());
    }

    #[test]
    fn test_normalize_invite_emails() {
        let emails = vec![
            " Ana@School.ph ".to_string(),
            "ana@school.ph".to_string(),
            "ben@school.ph".to_string(),
        ];
        assert_eq!(
            normalize_invite_emails(&emails).unwrap(),
            vec!["ana@school.ph".to_string(), "ben@school.ph".to_string()]
        );
        assert!(normalize_invite_emails(&["not-an-email".to_string()]).is_err());
        assert!(normalize_invite_emails(&[]).is_err());
    }

    #[test]
    fn test_prefill_form_uses_booking_defaults() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap();
        let booking = Booking {
            id: 4,
            visitor_name: "Leader".to_string(),
            email: "leader@school.ph".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            time_slot: "13:00-15:00".to_string(),
            booking_type: "group".to_string(),
            status: "pending".to_string(),
            total_visitors: 5,
            institution: Some("Rizal High School".to_string()),
            purpose: Some("Field trip".to_string()),
            created_at: now,
            updated_at: None,
        };
        let member = Visitor {
            id: 11,
            booking_id: 4,
            first_name: None,
            last_name: None,
            email: Some("ana@school.ph".to_string()),
            gender: None,
            visitor_type: None,
            address: None,
            institution: None,
            purpose: Some("Research".to_string()),
            is_main_visitor: false,
            status: "pending".to_string(),
            checkin_time: None,
            token: "t".to_string(),
            details_completed: false,
            created_at: now,
        };

        let form = prefill_form(member, &booking);
        assert_eq!(form.institution.as_deref(), Some("Rizal High School"));
        assert_eq!(form.purpose.as_deref(), Some("Research"));
        assert_eq!(form.time_slot, "13:00-15:00");
        assert!(!form.details_completed);
    }
}
