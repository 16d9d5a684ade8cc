//! Lead-generation form endpoints.
//!
//! Validation runs before the rate limit check, so a rejected submission
//! does not use up the sender's budget.

use actix_web::{HttpResponse, web};
use meridian_core::domain::{
    ContactSubmission, FormKind, Inquiry, JobApplication, QuoteSubmission,
};
use meridian_shared::dto::{
    ContactRequest, JobApplicationRequest, QuoteRequest, SubmissionResponse,
};
use uuid::Uuid;

use crate::middleware::client_ip::ClientIp;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/forms/contact
pub async fn contact(
    state: web::Data<AppState>,
    client: ClientIp,
    body: web::Json<ContactRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let submission = ContactSubmission {
        name: req.name,
        email: req.email,
        company: req.company,
        phone: req.phone,
        message: req.message,
    }
    .validated()?;

    deliver(&state, &client, &submission).await
}

/// POST /api/forms/quote
pub async fn quote(
    state: web::Data<AppState>,
    client: ClientIp,
    body: web::Json<QuoteRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let quote = QuoteSubmission {
        name: req.name,
        email: req.email,
        company: req.company,
        phone: req.phone,
        service: req.service,
        origin: req.origin,
        destination: req.destination,
        cargo_description: req.cargo_description,
        weight_kg: req.weight_kg,
        ready_date: req.ready_date,
    }
    .validated()?;

    deliver(&state, &client, &quote).await
}

/// POST /api/forms/careers
pub async fn careers(
    state: web::Data<AppState>,
    client: ClientIp,
    body: web::Json<JobApplicationRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let application = JobApplication {
        name: req.name,
        email: req.email,
        phone: req.phone,
        position: req.position,
        cover_letter: req.cover_letter,
        resume_url: req.resume_url,
        linkedin_url: req.linkedin_url,
    }
    .validated()?;

    deliver(&state, &client, &application).await
}

/// Charge the sender's budget, then mail the inquiry to the site inbox.
async fn deliver<I: Inquiry>(
    state: &AppState,
    client: &ClientIp,
    inquiry: &I,
) -> AppResult<HttpResponse> {
    let kind = inquiry.kind();
    let key = kind.rate_limit_key(client.as_str());
    let decision = state.rate_limiter.check(&key, state.form_policy);

    if !decision.allowed {
        tracing::warn!(form = kind.as_str(), client = %client.as_str(), "Form rate limit exceeded");
        return Err(AppError::TooManyRequests {
            retry_after: decision.retry_after(state.clock.now_millis()),
        });
    }

    let reference = Uuid::new_v4();
    let email = inquiry.to_email(&state.mail.from, &state.mail.to);
    if let Err(e) = state.mailer.send(&email).await {
        tracing::error!(form = kind.as_str(), reference = %reference, "Delivery failed: {}", e);
        return Err(e.into());
    }

    tracing::info!(
        form = kind.as_str(),
        reference = %reference,
        remaining = decision.remaining,
        "Form submission delivered"
    );

    Ok(HttpResponse::Accepted()
        .insert_header(("X-RateLimit-Remaining", decision.remaining.to_string()))
        .json(SubmissionResponse {
            success: true,
            message: confirmation(kind).to_string(),
        }))
}

fn confirmation(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Contact => "Thank you for reaching out. We will get back to you shortly.",
        FormKind::Quote => "Thank you. Our team will prepare your quote within one business day.",
        FormKind::Careers => "Thank you for applying. Our recruiting team will be in touch.",
    }
}
