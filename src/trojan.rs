//! Trojan share-link codec.
//!
//! `trojan://password@host:port?query#name`. `security` defaults to `tls`;
//! the remaining query parameters mirror VLESS (`type`, `host`, `path`,
//! `sni`, `fp`, `alpn`, `flow`, `headerType`).

use crate::constants::scheme;
use crate::error::{DecodeError, Result};
use crate::profile::{Profile, ProtocolKind, SecurityKind, TransportKind};
use crate::uri::{
    decode_fragment, encode_query, parse_query, percent_decode, push_query_and_fragment,
    query_get, query_get_or, split_host_port, split_link, split_userinfo, strip_scheme,
};

/// Decodes a `trojan://` link.
pub(crate) fn decode(uri: &str) -> Result<Profile> {
    let body = strip_scheme(uri, scheme::TROJAN)
        .ok_or_else(|| DecodeError::UnsupportedScheme(uri.to_string()))?;

    let parts = split_link(body);
    let (userinfo, host_port) = split_userinfo(parts.main);
    let (host, port) = split_host_port(host_port);
    let q = parse_query(parts.query);

    let mut p = Profile::new(ProtocolKind::Trojan);
    p.secret = percent_decode(userinfo.unwrap_or_default())?;
    p.host = host;
    p.port = port;
    p.name = decode_fragment(parts.fragment)?;

    p.security = SecurityKind::parse(&query_get_or(&q, "security", "tls"));
    p.transport = TransportKind::parse(&query_get_or(&q, "type", "tcp"));
    p.sni = query_get(&q, "sni");
    p.host_header = query_get(&q, "host");
    p.path = query_get(&q, "path");
    p.fingerprint = query_get(&q, "fp");
    p.alpn = query_get(&q, "alpn");
    p.flow = query_get(&q, "flow");
    p.header_type = query_get(&q, "headerType");

    p.share_uri = Some(uri.to_string());
    Ok(p)
}

/// Encodes a profile as a `trojan://` link, omitting the `tls` default.
pub(crate) fn encode(profile: &Profile) -> String {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    let security = profile.security.as_str();
    if profile.security != SecurityKind::Tls {
        pairs.push(("security", security));
    }
    if !profile.sni.is_empty() {
        pairs.push(("sni", &profile.sni));
    }
    let transport = profile.transport.as_str();
    if profile.transport != TransportKind::Tcp {
        pairs.push(("type", transport));
    }
    if !profile.host_header.is_empty() {
        pairs.push(("host", &profile.host_header));
    }
    if !profile.path.is_empty() {
        pairs.push(("path", &profile.path));
    }
    if !profile.fingerprint.is_empty() {
        pairs.push(("fp", &profile.fingerprint));
    }
    if !profile.alpn.is_empty() {
        pairs.push(("alpn", &profile.alpn));
    }
    if !profile.flow.is_empty() {
        pairs.push(("flow", &profile.flow));
    }
    if !profile.header_type.is_empty() {
        pairs.push(("headerType", &profile.header_type));
    }

    let mut link = format!(
        "{}{}@{}:{}",
        scheme::TROJAN,
        urlencoding::encode(&profile.secret),
        profile.host,
        profile.port
    );
    push_query_and_fragment(&mut link, encode_query(&pairs), &profile.name);
    link
}
