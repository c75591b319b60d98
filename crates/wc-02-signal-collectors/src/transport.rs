//! Secure-transport check.
//!
//! A terminal client has no browser to ask, so the two inputs are read off
//! the session itself: the endpoint scheme, and whether the session counts as
//! a secure context. Mirroring browser rules, a context is secure when
//! certificates are verified and the origin is either HTTPS or loopback.

use reqwest::Url;
use std::net::IpAddr;

/// Verdict of the secure-transport check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSecurity {
    pub secure: bool,
    pub details: String,
}

/// Whether `url` with the given verification setting is a secure context.
pub fn is_secure_context(url: &Url, verify_certificates: bool) -> bool {
    verify_certificates && (url.scheme() == "https" || is_loopback_host(url))
}

fn is_loopback_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if host.eq_ignore_ascii_case("localhost") || host.to_ascii_lowercase().ends_with(".localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback())
}

/// Secure only when the scheme is `https` and the context is secure.
pub fn check_transport(url: &Url, verify_certificates: bool) -> TransportSecurity {
    let https = url.scheme() == "https";
    let secure_context = is_secure_context(url, verify_certificates);
    let secure = https && secure_context;

    let details = if secure {
        "HTTPS is active and the certificate chain is verified."
    } else if !https {
        "The endpoint is not served over HTTPS, which makes interception (MITM) easier."
    } else {
        "Certificate verification is disabled, so this context is not considered fully secure."
    };

    TransportSecurity {
        secure,
        details: details.to_string(),
    }
}
