//! Data models for MuseoSmart

pub mod booking;
pub mod checkin;
pub mod event;
pub mod promotion;
pub mod user;
pub mod visitor;

// Re-export commonly used types
pub use booking::{Booking, BookingStatus, BookingType};
pub use checkin::{GroupArrival, GroupCheckinDetails};
pub use event::{Event, EventRegistration};
pub use promotion::Promotion;
pub use user::{User, UserClaims};
pub use visitor::Visitor;
