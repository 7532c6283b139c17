//! Hysteria2 share-link codec.
//!
//! `hysteria2://auth@host:port?query#name` (alias `hy2://`). Query
//! parameters: `sni`, `alpn`, `fp`, `insecure` (1/0), `obfs`,
//! `obfs-password`. Hysteria2 always rides TLS; the profile's security is
//! fixed to `tls` and the engine affinity to sing-box, since xray has no
//! hysteria2 outbound.

use crate::constants::scheme;
use crate::error::{DecodeError, Result};
use crate::profile::{EngineKind, Profile, ProtocolKind, SecurityKind};
use crate::uri::{
    decode_fragment, encode_query, parse_query, percent_decode, push_query_and_fragment,
    query_get, split_host_port, split_link, split_userinfo, strip_scheme,
};

/// Decodes a `hysteria2://` / `hy2://` link.
pub(crate) fn decode(uri: &str) -> Result<Profile> {
    let body = strip_scheme(uri, scheme::HYSTERIA2)
        .or_else(|| strip_scheme(uri, scheme::HYSTERIA2_SHORT))
        .ok_or_else(|| DecodeError::UnsupportedScheme(uri.to_string()))?;

    let parts = split_link(body);
    let (userinfo, host_port) = split_userinfo(parts.main);
    let (host, port) = split_host_port(host_port);
    let q = parse_query(parts.query);

    let mut p = Profile::new(ProtocolKind::Hysteria2);
    p.engine = EngineKind::Singbox;
    p.secret = percent_decode(userinfo.unwrap_or_default())?;
    p.host = host;
    p.port = port;
    p.name = decode_fragment(parts.fragment)?;

    p.sni = query_get(&q, "sni");
    p.alpn = query_get(&q, "alpn");
    p.fingerprint = query_get(&q, "fp");
    p.allow_insecure = q.get("insecure").map(String::as_str) == Some("1");

    // Obfuscation rides in the shared header_type/path slots.
    p.header_type = query_get(&q, "obfs");
    p.path = query_get(&q, "obfs-password");

    p.security = SecurityKind::Tls;
    p.share_uri = Some(uri.to_string());
    Ok(p)
}

/// Encodes a profile as a `hysteria2://` link.
pub(crate) fn encode(profile: &Profile) -> String {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    if !profile.sni.is_empty() {
        pairs.push(("sni", &profile.sni));
    }
    if !profile.alpn.is_empty() {
        pairs.push(("alpn", &profile.alpn));
    }
    if !profile.fingerprint.is_empty() {
        pairs.push(("fp", &profile.fingerprint));
    }
    if profile.allow_insecure {
        pairs.push(("insecure", "1"));
    }
    if !profile.header_type.is_empty() {
        pairs.push(("obfs", &profile.header_type));
    }
    if !profile.path.is_empty() {
        pairs.push(("obfs-password", &profile.path));
    }

    let mut link = format!(
        "{}{}@{}:{}",
        scheme::HYSTERIA2,
        urlencoding::encode(&profile.secret),
        profile.host,
        profile.port
    );
    push_query_and_fragment(&mut link, encode_query(&pairs), &profile.name);
    link
}
