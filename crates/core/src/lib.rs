//! # certlocker core
//!
//! Core business logic for serving vaccination credentials over the DigiLocker Pull-URI
//! protocol.
//!
//! This crate contains the pipeline between a decoded request and an encodable response:
//! - credential resolution against the registry, with an explicit selection policy
//! - display formatting of credential fields
//! - format negotiation and response assembly
//!
//! **No API concerns**: authentication, HTTP servers and wire encoding belong in `api-shared`,
//! `api-rest` and `digilocker`.

pub mod bundle;
pub mod config;
pub mod constants;
pub mod credential;
pub mod error;
pub mod formatting;
pub mod pull;
pub mod resolver;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use bundle::CredentialBundle;
pub use config::CoreConfig;
pub use credential::VaccinationCertificate;
pub use error::{CoreError, CoreResult};
pub use pull::PullService;
pub use resolver::CredentialResolver;
