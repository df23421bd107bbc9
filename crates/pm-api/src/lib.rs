//! # pm-api
//!
//! REST handlers for ProManager.
//!
//! Handlers validate request bodies with `pm-contracts`, authorize through
//! [`extractors::AuthenticatedUser`], persist through `pm-db` repositories
//! and answer with the payloads built in [`representers`].

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod representers;
pub mod routes;

#[cfg(test)]
mod test_support;

pub use error::{ApiError, ApiResult};
pub use extractors::AppState;
pub use routes::router;
