//! # API Shared
//!
//! Shared utilities and definitions for certlocker APIs.
//!
//! Contains:
//! - Shared services like `HealthService`
//! - Request signature verification (HMAC-SHA256)
//!
//! Used by `api-rest` and the operator CLI.

pub mod auth;
pub mod health;

pub use auth::{sign_request_body, verify_request_signature, DEFAULT_SIGNATURE_HEADER};
pub use health::{HealthRes, HealthService};
