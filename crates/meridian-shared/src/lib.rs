//! # Meridian Shared
//!
//! Request and response types exchanged with the site frontend.
//! Field names are camelCase on the wire.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
