//! `atrium-core`: shared building blocks for the session-validation services.
//!
//! This crate has no IO: identifiers, the shared error type and the clock seam.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{BusinessId, DelegationSessionId, StaffId};
