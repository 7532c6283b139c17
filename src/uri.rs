//! Share-link dispatch and shared URI plumbing.
//!
//! The splitting helpers here are deliberately lenient: a scheme-only link
//! such as `vless://` decodes to a profile with empty host and port 0, which
//! matches the reference behavior. Only scheme mismatch and malformed
//! percent-encoding/base64 are fatal (see crate docs, "leniency rule").

use std::collections::HashMap;

use crate::constants::scheme;
use crate::error::{DecodeError, EncodeError, Result};
use crate::profile::{Profile, ProtocolKind};
use crate::{hysteria2, shadowsocks, trojan, tuic, vless, vmess, wireguard};

/// Decodes one share link, dispatching on the scheme prefix
/// (case-insensitive, including the `hy2://` and `wg://` aliases).
pub fn decode_uri(uri: &str) -> Result<Profile> {
    let uri = uri.trim();
    if has_scheme(uri, scheme::VMESS) {
        vmess::decode(uri)
    } else if has_scheme(uri, scheme::VLESS) {
        vless::decode(uri)
    } else if has_scheme(uri, scheme::TROJAN) {
        trojan::decode(uri)
    } else if has_scheme(uri, scheme::SHADOWSOCKS) {
        shadowsocks::decode(uri)
    } else if has_scheme(uri, scheme::HYSTERIA2) || has_scheme(uri, scheme::HYSTERIA2_SHORT) {
        hysteria2::decode(uri)
    } else if has_scheme(uri, scheme::TUIC) {
        tuic::decode(uri)
    } else if has_scheme(uri, scheme::WIREGUARD) || has_scheme(uri, scheme::WIREGUARD_SHORT) {
        wireguard::decode(uri)
    } else {
        let name = uri.split("://").next().unwrap_or("unknown");
        Err(DecodeError::UnsupportedScheme(name.to_string()))
    }
}

/// Encodes a profile back to a share link. Not byte-identical to the
/// original text; re-decoding yields an equivalent profile.
pub fn encode_uri(profile: &Profile) -> std::result::Result<String, EncodeError> {
    match profile.kind {
        ProtocolKind::Vmess => Ok(vmess::encode(profile)),
        ProtocolKind::Vless => Ok(vless::encode(profile)),
        ProtocolKind::Trojan => Ok(trojan::encode(profile)),
        ProtocolKind::Shadowsocks => Ok(shadowsocks::encode(profile)),
        ProtocolKind::Hysteria2 => Ok(hysteria2::encode(profile)),
        ProtocolKind::Tuic => Ok(tuic::encode(profile)),
        ProtocolKind::Wireguard => Ok(wireguard::encode(profile)),
        ProtocolKind::Socks | ProtocolKind::Http => {
            Err(EncodeError::NoUriForm(profile.kind.as_str().to_string()))
        }
    }
}

/// Case-insensitive scheme prefix check. Schemes are ASCII, so the byte
/// slice comparison is safe on any UTF-8 input.
pub(crate) fn has_scheme(uri: &str, prefix: &str) -> bool {
    uri.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

/// Strips a scheme prefix, case-insensitively. Returns `None` on mismatch.
pub(crate) fn strip_scheme<'a>(uri: &'a str, prefix: &str) -> Option<&'a str> {
    if has_scheme(uri, prefix) {
        Some(&uri[prefix.len()..])
    } else {
        None
    }
}

/// A link body split into `main [? query] [# fragment]`.
pub(crate) struct LinkParts<'a> {
    pub main: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

/// Splits a link body on `#` then `?`. Both parts are optional.
pub(crate) fn split_link(body: &str) -> LinkParts<'_> {
    let (before_hash, fragment) = match body.find('#') {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (main, query) = match before_hash.find('?') {
        Some(pos) => (&before_hash[..pos], Some(&before_hash[pos + 1..])),
        None => (before_hash, None),
    };
    LinkParts {
        main,
        query,
        fragment,
    }
}

/// Splits `[userinfo@]rest` at the last `@`.
pub(crate) fn split_userinfo(main: &str) -> (Option<&str>, &str) {
    match main.rfind('@') {
        Some(pos) => (Some(&main[..pos]), &main[pos + 1..]),
        None => (None, main),
    }
}

/// Splits `host[:port]`, handling bracketed IPv6 literals. Missing or
/// unparsable ports become 0 rather than an error.
pub(crate) fn split_host_port(s: &str) -> (String, u16) {
    if let Some(rest) = s.strip_prefix('[') {
        // [v6-literal]:port
        if let Some(close) = rest.find(']') {
            let host = rest[..close].to_string();
            let port = rest[close + 1..]
                .strip_prefix(':')
                .and_then(|p| p.parse().ok())
                .unwrap_or(0);
            return (host, port);
        }
    }
    match s.rfind(':') {
        Some(pos) => {
            let port = s[pos + 1..].parse().unwrap_or(0);
            (s[..pos].to_string(), port)
        }
        None => (s.to_string(), 0),
    }
}

/// Parses a query string as `application/x-www-form-urlencoded`.
pub(crate) fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    match query {
        Some(q) => url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect(),
        None => HashMap::new(),
    }
}

/// Returns a query parameter, or an empty string when absent.
pub(crate) fn query_get(q: &HashMap<String, String>, key: &str) -> String {
    q.get(key).cloned().unwrap_or_default()
}

/// Returns a query parameter, or `default` when absent or empty.
pub(crate) fn query_get_or(q: &HashMap<String, String>, key: &str, default: &str) -> String {
    match q.get(key) {
        Some(v) if !v.is_empty() => v.clone(),
        _ => default.to_string(),
    }
}

/// Percent-decodes a userinfo or fragment component.
pub(crate) fn percent_decode(s: &str) -> Result<String> {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .map_err(|e| DecodeError::PercentEncoding(e.to_string()))
}

/// Percent-decodes an optional fragment into a display name.
pub(crate) fn decode_fragment(fragment: Option<&str>) -> Result<String> {
    match fragment {
        Some(f) => percent_decode(f),
        None => Ok(String::new()),
    }
}

/// Builds a `k=v&k=v` query string, percent-encoding values. Returns an
/// empty string when no pairs are given.
pub(crate) fn encode_query(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Appends `?query` and `#fragment` to a link under construction.
pub(crate) fn push_query_and_fragment(link: &mut String, query: String, name: &str) {
    if !query.is_empty() {
        link.push('?');
        link.push_str(&query);
    }
    if !name.is_empty() {
        link.push('#');
        link.push_str(&urlencoding::encode(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_check_is_case_insensitive() {
        assert!(has_scheme("VLESS://x", scheme::VLESS));
        assert!(has_scheme("TrOjAn://x", scheme::TROJAN));
        assert!(!has_scheme("vless:/x", scheme::VLESS));
    }

    #[test]
    fn host_port_splits_ipv6_brackets() {
        assert_eq!(
            split_host_port("[2001:db8::1]:443"),
            ("2001:db8::1".to_string(), 443)
        );
        assert_eq!(split_host_port("host"), ("host".to_string(), 0));
        assert_eq!(split_host_port("host:bad"), ("host".to_string(), 0));
    }

    #[test]
    fn unsupported_scheme_is_typed() {
        let err = decode_uri("unknown://x").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedScheme(_)));
    }
}
