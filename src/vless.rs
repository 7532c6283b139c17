//! VLESS share-link codec.
//!
//! `vless://uuid@host:port?query#name`. Query parameters: `encryption`
//! (defaults to `none`), `security` (none/tls/reality), `type`, `host`,
//! `path`, `sni`, `fp`, `alpn`, `flow`, `headerType`, and the Reality
//! extension `pbk` / `sid` / `spx`.

use crate::constants::{defaults, scheme};
use crate::error::{DecodeError, Result};
use crate::profile::{Profile, ProtocolKind, SecurityKind, TransportKind};
use crate::uri::{
    decode_fragment, encode_query, percent_decode, push_query_and_fragment, query_get,
    query_get_or, split_host_port, split_link, split_userinfo, strip_scheme,
};

/// Decodes a `vless://` link.
pub(crate) fn decode(uri: &str) -> Result<Profile> {
    let body = strip_scheme(uri, scheme::VLESS)
        .ok_or_else(|| DecodeError::UnsupportedScheme(uri.to_string()))?;

    let parts = split_link(body);
    let (userinfo, host_port) = split_userinfo(parts.main);
    let (host, port) = split_host_port(host_port);
    let q = crate::uri::parse_query(parts.query);

    let mut p = Profile::new(ProtocolKind::Vless);
    p.uuid = percent_decode(userinfo.unwrap_or_default())?;
    p.host = host;
    p.port = port;
    p.name = decode_fragment(parts.fragment)?;

    p.method = query_get_or(&q, "encryption", defaults::VLESS_ENCRYPTION);
    p.security = SecurityKind::parse(q.get("security").map(String::as_str).unwrap_or("none"));
    p.transport = TransportKind::parse(q.get("type").map(String::as_str).unwrap_or("tcp"));
    p.host_header = query_get(&q, "host");
    p.path = query_get(&q, "path");
    p.sni = query_get(&q, "sni");
    p.fingerprint = query_get(&q, "fp");
    p.alpn = query_get(&q, "alpn");
    p.flow = query_get(&q, "flow");
    p.header_type = query_get(&q, "headerType");

    // Reality extension.
    p.public_key = query_get(&q, "pbk");
    p.short_id = query_get(&q, "sid");
    p.spider_x = query_get(&q, "spx");

    p.share_uri = Some(uri.to_string());
    Ok(p)
}

/// Encodes a profile as a `vless://` link, omitting protocol defaults.
pub(crate) fn encode(profile: &Profile) -> String {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    if !profile.method.is_empty() && profile.method != defaults::VLESS_ENCRYPTION {
        pairs.push(("encryption", &profile.method));
    }
    let security = profile.security.as_str();
    if profile.security != SecurityKind::None {
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
    if !profile.public_key.is_empty() {
        pairs.push(("pbk", &profile.public_key));
    }
    if !profile.short_id.is_empty() {
        pairs.push(("sid", &profile.short_id));
    }
    if !profile.spider_x.is_empty() {
        pairs.push(("spx", &profile.spider_x));
    }

    let mut link = format!(
        "{}{}@{}:{}",
        scheme::VLESS,
        urlencoding::encode(&profile.uuid),
        profile.host,
        profile.port
    );
    push_query_and_fragment(&mut link, encode_query(&pairs), &profile.name);
    link
}
