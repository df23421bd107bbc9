//! # pm-contracts
//!
//! Contract validation for ProManager.
//!
//! Each operation that accepts a request body has a `*Params` struct (the
//! deserialized body) and a contract that validates it before any write.
//! Contracts only look at the input and the entity being changed; access
//! control lives in `pm-auth`.

pub mod auth;
pub mod base;
pub mod leaves;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod teams;

pub use base::*;
