//! Lead-generation form submissions.
//!
//! Each submission is validated as a whole so the caller gets every field
//! error at once, then rendered into a plain-text notification email.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::DomainError;
use crate::ports::OutboundEmail;

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const MAX_PHONE_LEN: usize = 30;
const MAX_SHORT_TEXT_LEN: usize = 120;
const MAX_LONG_TEXT_LEN: usize = 5000;
const MAX_URL_LEN: usize = 2048;

/// The forms the site accepts. Each has its own rate-limit namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Contact,
    Quote,
    Careers,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Contact => "contact",
            FormKind::Quote => "quote",
            FormKind::Careers => "careers",
        }
    }

    /// Rate-limit identifier for a client, e.g. `contact-form:1.2.3.4`.
    pub fn rate_limit_key(&self, client: &str) -> String {
        format!("{}-form:{}", self.as_str(), client)
    }
}

/// Transport mode requested in a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreightService {
    Air,
    Ocean,
    Road,
    Rail,
    Warehousing,
    Customs,
}

impl FreightService {
    pub fn label(&self) -> &'static str {
        match self {
            FreightService::Air => "Air freight",
            FreightService::Ocean => "Ocean freight",
            FreightService::Road => "Road freight",
            FreightService::Rail => "Rail freight",
            FreightService::Warehousing => "Warehousing",
            FreightService::Customs => "Customs brokerage",
        }
    }
}

impl FromStr for FreightService {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "air" => Ok(FreightService::Air),
            "ocean" => Ok(FreightService::Ocean),
            "road" => Ok(FreightService::Road),
            "rail" => Ok(FreightService::Rail),
            "warehousing" => Ok(FreightService::Warehousing),
            "customs" => Ok(FreightService::Customs),
            other => Err(DomainError::validation(format!(
                "service: unknown service {other:?}"
            ))),
        }
    }
}

/// Collects field errors so a submission reports all of them at once.
#[derive(Default)]
struct FieldErrors(Vec<String>);

impl FieldErrors {
    fn required(&mut self, field: &str, value: &str, max_len: usize) {
        if value.trim().is_empty() {
            self.0.push(format!("{field}: is required"));
        } else {
            self.max_len(field, value, max_len);
        }
    }

    fn max_len(&mut self, field: &str, value: &str, max_len: usize) {
        if value.chars().count() > max_len {
            self.0
                .push(format!("{field}: must be at most {max_len} characters"));
        }
    }

    fn email(&mut self, field: &str, value: &str) {
        if !is_plausible_email(value) || value.len() > MAX_EMAIL_LEN {
            self.0.push(format!("{field}: must be a valid email address"));
        }
    }

    fn phone(&mut self, field: &str, value: Option<&str>) {
        let Some(value) = value else { return };
        let valid_chars = value
            .chars()
            .all(|c| c.is_ascii_digit() || " +-().".contains(c));
        let digits = value.chars().filter(char::is_ascii_digit).count();
        if !valid_chars || digits < 5 || value.len() > MAX_PHONE_LEN {
            self.0.push(format!("{field}: must be a valid phone number"));
        }
    }

    fn url(&mut self, field: &str, value: Option<&str>) {
        let Some(value) = value else { return };
        let valid = value.len() <= MAX_URL_LEN
            && Url::parse(value).is_ok_and(|url| {
                matches!(url.scheme(), "http" | "https")
                    && url.host_str().is_some_and(|host| !host.is_empty())
            });
        if !valid {
            self.0.push(format!("{field}: must be an http(s) URL"));
        }
    }

    fn push(&mut self, message: String) {
        self.0.push(message);
    }

    fn finish(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.0))
        }
    }
}

fn is_plausible_email(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Append `Label: value` and a newline.
fn push_line(body: &mut String, label: &str, value: &str) {
    body.push_str(label);
    body.push_str(": ");
    body.push_str(value);
    body.push('\n');
}

fn trim_owned(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value.map(trim_owned).filter(|v| !v.is_empty())
}

/// A submission that can be relayed to the sales or recruiting inbox.
pub trait Inquiry {
    fn kind(&self) -> FormKind;
    fn subject(&self) -> String;
    fn body(&self) -> String;
    /// Address replies should go to.
    fn reply_to(&self) -> &str;

    fn to_email(&self, from: &str, to: &[String]) -> OutboundEmail {
        OutboundEmail {
            from: from.to_string(),
            to: to.to_vec(),
            reply_to: Some(self.reply_to().to_string()),
            subject: self.subject(),
            text: self.body(),
        }
    }
}

/// General contact form.
#[derive(Debug, Clone)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub message: String,
}

impl ContactSubmission {
    /// Trim every field and check it, reporting all failures together.
    pub fn validated(self) -> Result<Self, DomainError> {
        let this = Self {
            name: trim_owned(self.name),
            email: trim_owned(self.email),
            company: trim_optional(self.company),
            phone: trim_optional(self.phone),
            message: trim_owned(self.message),
        };

        let mut errors = FieldErrors::default();
        errors.required("name", &this.name, MAX_NAME_LEN);
        errors.email("email", &this.email);
        if let Some(company) = &this.company {
            errors.max_len("company", company, MAX_SHORT_TEXT_LEN);
        }
        errors.phone("phone", this.phone.as_deref());
        errors.required("message", &this.message, MAX_LONG_TEXT_LEN);
        errors.finish()?;

        Ok(this)
    }
}

impl Inquiry for ContactSubmission {
    fn kind(&self) -> FormKind {
        FormKind::Contact
    }

    fn subject(&self) -> String {
        format!("New contact enquiry from {}", self.name)
    }

    fn body(&self) -> String {
        let mut body = String::new();
        push_line(&mut body, "Name", &self.name);
        push_line(&mut body, "Email", &self.email);
        if let Some(company) = &self.company {
            push_line(&mut body, "Company", company);
        }
        if let Some(phone) = &self.phone {
            push_line(&mut body, "Phone", phone);
        }
        body.push_str(&format!("\n{}\n", self.message));
        body
    }

    fn reply_to(&self) -> &str {
        &self.email
    }
}

/// Freight quote request.
#[derive(Debug, Clone)]
pub struct QuoteSubmission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub service: String,
    pub origin: String,
    pub destination: String,
    pub cargo_description: String,
    pub weight_kg: Option<f64>,
    pub ready_date: Option<String>,
}

/// A quote request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidQuote {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub service: FreightService,
    pub origin: String,
    pub destination: String,
    pub cargo_description: String,
    pub weight_kg: Option<f64>,
    pub ready_date: Option<NaiveDate>,
}

impl QuoteSubmission {
    pub fn validated(self) -> Result<ValidQuote, DomainError> {
        let name = trim_owned(self.name);
        let email = trim_owned(self.email);
        let company = trim_optional(self.company);
        let phone = trim_optional(self.phone);
        let origin = trim_owned(self.origin);
        let destination = trim_owned(self.destination);
        let cargo_description = trim_owned(self.cargo_description);

        let mut errors = FieldErrors::default();
        errors.required("name", &name, MAX_NAME_LEN);
        errors.email("email", &email);
        if let Some(company) = &company {
            errors.max_len("company", company, MAX_SHORT_TEXT_LEN);
        }
        errors.phone("phone", phone.as_deref());

        let service = match self.service.parse::<FreightService>() {
            Ok(service) => Some(service),
            Err(DomainError::Validation(messages)) => {
                messages.into_iter().for_each(|m| errors.push(m));
                None
            }
            Err(other) => return Err(other),
        };

        errors.required("origin", &origin, MAX_SHORT_TEXT_LEN);
        errors.required("destination", &destination, MAX_SHORT_TEXT_LEN);
        errors.required("cargoDescription", &cargo_description, MAX_LONG_TEXT_LEN);

        if let Some(weight) = self.weight_kg
            && !(weight.is_finite() && weight > 0.0)
        {
            errors.push("weightKg: must be a positive number".to_string());
        }

        let ready_date = match trim_optional(self.ready_date) {
            Some(raw) => match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push("readyDate: must be a date in YYYY-MM-DD format".to_string());
                    None
                }
            },
            None => None,
        };

        errors.finish()?;

        let service = service.ok_or_else(|| {
            DomainError::Internal("service missing after successful validation".to_string())
        })?;

        Ok(ValidQuote {
            name,
            email,
            company,
            phone,
            service,
            origin,
            destination,
            cargo_description,
            weight_kg: self.weight_kg,
            ready_date,
        })
    }
}

impl Inquiry for ValidQuote {
    fn kind(&self) -> FormKind {
        FormKind::Quote
    }

    fn subject(&self) -> String {
        format!(
            "Quote request: {} {} → {}",
            self.service.label(),
            self.origin,
            self.destination
        )
    }

    fn body(&self) -> String {
        let mut body = String::new();
        push_line(&mut body, "Name", &self.name);
        push_line(&mut body, "Email", &self.email);
        if let Some(company) = &self.company {
            push_line(&mut body, "Company", company);
        }
        if let Some(phone) = &self.phone {
            push_line(&mut body, "Phone", phone);
        }
        push_line(&mut body, "Service", self.service.label());
        push_line(&mut body, "Origin", &self.origin);
        push_line(&mut body, "Destination", &self.destination);
        if let Some(weight) = self.weight_kg {
            push_line(&mut body, "Weight", &format!("{weight} kg"));
        }
        if let Some(date) = self.ready_date {
            push_line(&mut body, "Ready date", &date.format("%Y-%m-%d").to_string());
        }
        body.push_str(&format!("\nCargo:\n{}\n", self.cargo_description));
        body
    }

    fn reply_to(&self) -> &str {
        &self.email
    }
}

/// Job application from the careers board.
#[derive(Debug, Clone)]
pub struct JobApplication {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub cover_letter: String,
    pub resume_url: Option<String>,
    pub linkedin_url: Option<String>,
}

impl JobApplication {
    pub fn validated(self) -> Result<Self, DomainError> {
        let this = Self {
            name: trim_owned(self.name),
            email: trim_owned(self.email),
            phone: trim_optional(self.phone),
            position: trim_owned(self.position),
            cover_letter: trim_owned(self.cover_letter),
            resume_url: trim_optional(self.resume_url),
            linkedin_url: trim_optional(self.linkedin_url),
        };

        let mut errors = FieldErrors::default();
        errors.required("name", &this.name, MAX_NAME_LEN);
        errors.email("email", &this.email);
        errors.phone("phone", this.phone.as_deref());
        errors.required("position", &this.position, MAX_SHORT_TEXT_LEN);
        errors.required("coverLetter", &this.cover_letter, MAX_LONG_TEXT_LEN);
        errors.url("resumeUrl", this.resume_url.as_deref());
        errors.url("linkedinUrl", this.linkedin_url.as_deref());
        errors.finish()?;

        Ok(this)
    }
}

impl Inquiry for JobApplication {
    fn kind(&self) -> FormKind {
        FormKind::Careers
    }

    fn subject(&self) -> String {
        format!("Application for {}: {}", self.position, self.name)
    }

    fn body(&self) -> String {
        let mut body = String::new();
        push_line(&mut body, "Position", &self.position);
        push_line(&mut body, "Name", &self.name);
        push_line(&mut body, "Email", &self.email);
        if let Some(phone) = &self.phone {
            push_line(&mut body, "Phone", phone);
        }
        if let Some(url) = &self.resume_url {
            push_line(&mut body, "Resume", url);
        }
        if let Some(url) = &self.linkedin_url {
            push_line(&mut body, "LinkedIn", url);
        }
        body.push_str(&format!("\n{}\n", self.cover_letter));
        body
    }

    fn reply_to(&self) -> &str {
        &self.email
    }
}
