//! Request extractors and error mapping.

pub mod client_ip;
pub mod error;
