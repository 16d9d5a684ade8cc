//! # Meridian Core
//!
//! The domain layer of the Meridian site backend.
//! Locale routing, form submissions and CMS document lookups live here as
//! pure logic; everything touching the outside world goes through `ports`.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::DomainError;
