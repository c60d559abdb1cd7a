//! Core types: booking sources, stay ranges, reservations, availability

pub mod availability;
pub mod event;
pub mod reservation;
pub mod source;
pub mod time;
pub mod tracing;

pub use availability::{AvailabilityDay, AvailabilityGrid, AvailabilityStatus, RoomId};
pub use event::{CachedExternalBooking, ExternalEvent};
pub use reservation::{
    EXTERNAL_DEFAULT_ADULTS, EXTERNAL_DEFAULT_KIDS, Guest, PaymentInfo, Reservation,
    ReservationStatus,
};
pub use source::{BookingSource, UnknownSource};
pub use time::{DateRange, InvalidRange};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
