//! Client Identification
//!
//! Derives the rate-limit client key from proxy forwarding headers.

use axum::http::HeaderMap;

/// Bucket shared by every request that carries no forwarding header.
pub const UNKNOWN_CLIENT: &str = "unknown";

// == Client Identifier ==
/// Returns the client address for rate limiting.
///
/// Uses the first address in `x-forwarded-for`, then `x-real-ip`. Requests
/// with neither header all share the [`UNKNOWN_CLIENT`] counter.
pub fn client_identifier(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|addr| !addr.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_first_hop() {
        let map = headers(&[("x-forwarded-for", "1.2.3.4, 10.0.0.1")]);
        assert_eq!(client_identifier(&map), "1.2.3.4");
    }

    #[test]
    fn test_forwarded_for_preferred_over_real_ip() {
        let map = headers(&[("x-forwarded-for", "1.2.3.4"), ("x-real-ip", "5.6.7.8")]);
        assert_eq!(client_identifier(&map), "1.2.3.4");
    }

    #[test]
    fn test_real_ip_fallback() {
        let map = headers(&[("x-real-ip", " 5.6.7.8 ")]);
        assert_eq!(client_identifier(&map), "5.6.7.8");
    }

    #[test]
    fn test_empty_forwarded_for_falls_back() {
        let map = headers(&[("x-forwarded-for", ""), ("x-real-ip", "5.6.7.8")]);
        assert_eq!(client_identifier(&map), "5.6.7.8");
    }

    #[test]
    fn test_unknown_bucket() {
        assert_eq!(client_identifier(&HeaderMap::new()), UNKNOWN_CLIENT);
    }
}
