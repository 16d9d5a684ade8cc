//! Locale resolution over URL path segments.
//!
//! The default locale never appears in URLs: `/services` is served in the
//! default locale and `/zh-cn/services` in `zh-cn`. Every function here is
//! total; unknown or malformed segments fall through to the default locale.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::DomainError;

/// A locale the site is published in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleDescriptor {
    pub code: String,
    pub display_name: String,
    pub flag: String,
}

impl LocaleDescriptor {
    pub fn new(
        code: impl Into<String>,
        display_name: impl Into<String>,
        flag: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            flag: flag.into(),
        }
    }
}

/// A path split into its locale and the logical path behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Always a configured locale code.
    pub locale: String,
    pub remaining_segments: Vec<String>,
}

impl ResolvedRoute {
    /// The logical (unprefixed) path, e.g. `/careers/driver`.
    pub fn logical_path(&self) -> String {
        join_segments(&self.remaining_segments)
    }
}

/// Link to the same logical page in another locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternateLink {
    pub locale: String,
    pub href: String,
}

/// Split a path into its non-empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Collapse repeated slashes and guarantee exactly one leading slash.
pub fn normalize_path(path: &str) -> String {
    join_segments(&split_path(path))
}

fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(segment.as_ref());
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// The locale named by the first segment, or `default` if it names none.
pub fn resolve_locale<'a, S: AsRef<str>>(
    segments: &'a [S],
    configured: &HashSet<String>,
    default: &'a str,
) -> &'a str {
    match segments.first() {
        Some(first) if configured.contains(first.as_ref()) => first.as_ref(),
        _ => default,
    }
}

/// Drop the first segment iff it is a configured locale code.
pub fn strip_locale_prefix<'a, S: AsRef<str>>(
    segments: &'a [S],
    configured: &HashSet<String>,
) -> &'a [S] {
    match segments.split_first() {
        Some((first, rest)) if configured.contains(first.as_ref()) => rest,
        _ => segments,
    }
}

/// Prefix a logical path with `locale`, unless it is the default locale.
///
/// The root path maps to `/<locale>` without a trailing slash.
pub fn add_locale_prefix(path: &str, locale: &str, default_locale: &str) -> String {
    if locale == default_locale {
        return path.to_string();
    }

    let normalized = normalize_path(path);
    if normalized == "/" {
        format!("/{locale}")
    } else {
        format!("/{locale}{normalized}")
    }
}

/// The fixed set of locales the site is published in.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    locales: Vec<LocaleDescriptor>,
    codes: HashSet<String>,
    default_locale: String,
}

impl LocaleConfig {
    /// Build a validated configuration. `default_locale` must be one of `locales`.
    pub fn new(
        locales: Vec<LocaleDescriptor>,
        default_locale: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let default_locale = default_locale.into();

        if locales.is_empty() {
            return Err(DomainError::InvalidLocaleConfig(
                "at least one locale is required".to_string(),
            ));
        }

        let mut codes = HashSet::with_capacity(locales.len());
        for locale in &locales {
            if locale.code.is_empty() || locale.code.contains('/') {
                return Err(DomainError::InvalidLocaleConfig(format!(
                    "invalid locale code {:?}",
                    locale.code
                )));
            }
            if !codes.insert(locale.code.clone()) {
                return Err(DomainError::InvalidLocaleConfig(format!(
                    "duplicate locale code {:?}",
                    locale.code
                )));
            }
        }

        if !codes.contains(&default_locale) {
            return Err(DomainError::InvalidLocaleConfig(format!(
                "default locale {default_locale:?} is not among the configured locales"
            )));
        }

        Ok(Self {
            locales,
            codes,
            default_locale,
        })
    }

    /// Parse a `code:Display Name:flag` list separated by commas.
    ///
    /// Name and flag are optional; a bare `fr-fr` is accepted.
    pub fn parse(list: &str, default_locale: &str) -> Result<Self, DomainError> {
        let locales = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let mut parts = entry.splitn(3, ':').map(str::trim);
                let code = parts.next().unwrap_or_default();
                let name = parts.next().unwrap_or(code);
                let flag = parts.next().unwrap_or_default();
                LocaleDescriptor::new(code, name, flag)
            })
            .collect();

        Self::new(locales, default_locale)
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn locales(&self) -> &[LocaleDescriptor] {
        &self.locales
    }

    pub fn codes(&self) -> &HashSet<String> {
        &self.codes
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> ResolvedRoute {
        let locale = resolve_locale(segments, &self.codes, &self.default_locale);
        let remaining = strip_locale_prefix(segments, &self.codes);

        ResolvedRoute {
            locale: locale.to_string(),
            remaining_segments: remaining.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    pub fn resolve_path(&self, path: &str) -> ResolvedRoute {
        self.resolve(&split_path(path))
    }

    /// Public URL of a logical path in `locale`.
    pub fn localize(&self, path: &str, locale: &str) -> String {
        add_locale_prefix(path, locale, &self.default_locale)
    }

    /// One link per configured locale, in configuration order.
    pub fn alternates(&self, logical_path: &str) -> Vec<AlternateLink> {
        let path = normalize_path(logical_path);
        self.locales
            .iter()
            .map(|locale| AlternateLink {
                locale: locale.code.clone(),
                href: self.localize(&path, &locale.code),
            })
            .collect()
    }
}
