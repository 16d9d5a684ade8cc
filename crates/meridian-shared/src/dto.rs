//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Contact form body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}

/// Final step of the quote wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// One of `air`, `ocean`, `road`, `rail`, `warehousing`, `customs`.
    pub service: String,
    pub origin: String,
    pub destination: String,
    pub cargo_description: String,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub ready_date: Option<String>,
}

/// Careers board application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub position: String,
    pub cover_letter: String,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

/// Response to an accepted form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
}

/// CMS webhook body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidateRequest {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidateResponse {
    pub revalidated: bool,
    /// Cache entries dropped.
    pub purged: usize,
    pub now: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleInfo {
    pub code: String,
    pub display_name: String,
    pub flag: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternateLinkDto {
    pub locale: String,
    pub href: String,
}

/// A CMS document resolved for a public path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    /// Locale requested by the path.
    pub locale: String,
    /// Locale of the document actually served.
    pub served_locale: String,
    pub path: String,
    pub alternates: Vec<AlternateLinkDto>,
    pub document: serde_json::Value,
}
