//! Client address extractor used to key per-source limits.

use std::future::{Ready, ready};
use std::net::{IpAddr, SocketAddr};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header::HeaderMap, web};

use crate::state::AppState;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// The caller's IP as a string, `"unknown"` if it cannot be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for ClientIp {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let hops = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.trusted_proxies)
            .unwrap_or(0);

        let ip = forwarded_client(req.headers(), hops)
            .or_else(|| req.peer_addr().map(|addr| addr.ip()))
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        ready(Ok(ClientIp(ip)))
    }
}

/// The `X-Forwarded-For` entry appended by the outermost of `hops` trusted
/// proxies, counted from the right.
///
/// Entries left of it are written by the client. `None` when no proxy is
/// trusted or the header is shorter than the proxy chain.
fn forwarded_client(headers: &HeaderMap, hops: usize) -> Option<IpAddr> {
    if hops == 0 {
        return None;
    }

    let entries: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();

    let index = entries.len().checked_sub(hops)?;
    parse_ip(entries[index])
}

/// `1.2.3.4`, `1.2.3.4:5678`, `::1` or `[::1]:80`.
fn parse_ip(entry: &str) -> Option<IpAddr> {
    entry
        .parse::<SocketAddr>()
        .map(|socket| socket.ip())
        .or_else(|_| entry.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>())
        .ok()
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    fn headers(values: &[&str]) -> HeaderMap {
        let mut req = TestRequest::default();
        for value in values {
            req = req.append_header(("X-Forwarded-For", *value));
        }
        req.to_http_request().headers().clone()
    }

    fn ip(s: &str) -> Option<IpAddr> {
        s.parse().ok()
    }

    #[test]
    fn test_untrusted_header_is_ignored() {
        let headers = headers(&["6.6.6.6"]);
        assert_eq!(forwarded_client(&headers, 0), None);
    }

    #[test]
    fn test_takes_entry_appended_by_trusted_proxy() {
        let headers = headers(&["6.6.6.6, 203.0.113.7"]);
        assert_eq!(forwarded_client(&headers, 1), ip("203.0.113.7"));
        assert_eq!(forwarded_client(&headers, 2), ip("6.6.6.6"));
        assert_eq!(forwarded_client(&headers, 3), None);
    }

    #[test]
    fn test_repeated_headers_form_one_list() {
        let headers = headers(&["6.6.6.6", "203.0.113.7, 10.0.0.2"]);
        assert_eq!(forwarded_client(&headers, 1), ip("10.0.0.2"));
        assert_eq!(forwarded_client(&headers, 2), ip("203.0.113.7"));
    }

    #[test]
    fn test_parse_ip() {
        assert_eq!(parse_ip("1.2.3.4:5678"), ip("1.2.3.4"));
        assert_eq!(parse_ip("[::1]:8080"), ip("::1"));
        assert_eq!(parse_ip("10.0.0.7"), ip("10.0.0.7"));
        assert_eq!(parse_ip("[2001:db8::1]"), ip("2001:db8::1"));
        assert_eq!(parse_ip("proxy.internal"), None);
    }
}
