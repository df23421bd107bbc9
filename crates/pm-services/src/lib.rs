//! # pm-services
//!
//! Business rules that sit between the HTTP handlers and the repositories:
//! audit recording, attendance and leave arithmetic, weekly reports, tracker
//! recomputation, task state transitions and OTP delivery.

pub mod attendance;
pub mod audit;
pub mod leave;
pub mod otp;
pub mod projects;
pub mod reports;
pub mod tasks;
pub mod tracker;

pub use audit::{AuditEntry, AuditError, AuditRecorder, AuditStore, MemoryAuditStore};
pub use otp::{DeliveryError, LogOtpDelivery, OtpDelivery, OtpDestination};
