//! Booking cache, feed sync, availability reconciliation and admission.
//!
//! ```text
//!                 ┌──────────────────┐
//!  FeedConfig ──► │ SyncOrchestrator │ ──► replace_source(source, events)
//!                 └──────────────────┘                 │
//!                                                      ▼
//!  AdmissionRequest ──► BookingAdmission ──►  ┌───────────────┐
//!                                             │     Store     │ (SQLite)
//!  update_availability ───────────────────►   └───────────────┘
//!                                                      │
//!                 ┌───────────────────────┐            │
//!  room, range ─► │ AvailabilityReconciler│ ◄──────────┘
//!                 └───────────────────────┘ ──► AvailabilityGrid
//! ```
//!
//! All components share one [`Store`]; it is cheap to clone.

pub mod admission;
pub mod auth;
pub mod db;
pub mod error;
pub mod reconcile;
pub mod store;
pub mod sync;

pub use admission::{AdmissionRequest, BookingAdmission};
pub use auth::{AllowListPolicy, AuthError, AuthorizationPolicy, IdentityProvider, PolicyGate, User};
pub use db::ManualOverride;
pub use error::{EngineError, EngineResult};
pub use reconcile::{AvailabilityReconciler, RoomMapping};
pub use store::{AvailabilityInputs, Store};
pub use sync::{DEFAULT_FETCH_TIMEOUT, SyncOrchestrator, SyncOutcome, SyncReport};
