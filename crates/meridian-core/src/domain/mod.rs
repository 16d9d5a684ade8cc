//! Domain entities - the core business objects.

mod content;
mod inquiry;
mod locale;

pub use content::{
    ContentQuery, Document, HOME_DOCUMENT, LocaleFallback, PAGE_DOCUMENT, fetch_localized,
};
pub use inquiry::{
    ContactSubmission, FormKind, FreightService, Inquiry, JobApplication, QuoteSubmission,
    ValidQuote,
};
pub use locale::{
    AlternateLink, LocaleConfig, LocaleDescriptor, ResolvedRoute, add_locale_prefix,
    normalize_path, resolve_locale, split_path, strip_locale_prefix,
};
