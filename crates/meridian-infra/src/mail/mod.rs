//! Mailer implementations - HTTP provider and console fallback.

mod console;

pub use console::ConsoleMailer;

#[cfg(feature = "http-mail")]
mod http;
#[cfg(feature = "http-mail")]
pub use http::{HttpMailConfig, HttpMailer};
