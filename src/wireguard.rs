//! WireGuard share-link codec.
//!
//! `wireguard://private-key@host:port?query#name` (alias `wg://`). Query
//! parameters: `publickey`, `address` (comma-joined tunnel v4/v6
//! addresses), `reserved` (comma-joined bytes), `mtu`, `sni`.
//!
//! WireGuard has no stream transport or TLS layer of its own; the profile
//! carries `TransportKind::Wireguard` and `SecurityKind::None`, and the
//! generators skip their transport/security blocks for it.

use crate::constants::scheme;
use crate::error::{DecodeError, Result};
use crate::profile::{EngineKind, Profile, ProtocolKind, SecurityKind, TransportKind};
use crate::uri::{
    decode_fragment, encode_query, parse_query, percent_decode, push_query_and_fragment,
    query_get, split_host_port, split_link, split_userinfo, strip_scheme,
};

/// Decodes a `wireguard://` / `wg://` link.
pub(crate) fn decode(uri: &str) -> Result<Profile> {
    let body = strip_scheme(uri, scheme::WIREGUARD)
        .or_else(|| strip_scheme(uri, scheme::WIREGUARD_SHORT))
        .ok_or_else(|| DecodeError::UnsupportedScheme(uri.to_string()))?;

    let parts = split_link(body);
    let (userinfo, host_port) = split_userinfo(parts.main);
    let (host, port) = split_host_port(host_port);
    let q = parse_query(parts.query);

    let mut p = Profile::new(ProtocolKind::Wireguard);
    p.engine = EngineKind::Singbox;
    p.secret = percent_decode(userinfo.unwrap_or_default())?;
    p.host = host;
    p.port = port;
    p.name = decode_fragment(parts.fragment)?;

    p.public_key = query_get(&q, "publickey");
    p.host_header = query_get(&q, "address");
    p.short_id = query_get(&q, "reserved");
    p.sni = query_get(&q, "sni");
    p.extra = query_get(&q, "mtu");

    p.transport = TransportKind::Wireguard;
    p.security = SecurityKind::None;
    p.share_uri = Some(uri.to_string());
    Ok(p)
}

/// Encodes a profile as a `wireguard://` link.
pub(crate) fn encode(profile: &Profile) -> String {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    if !profile.public_key.is_empty() {
        pairs.push(("publickey", &profile.public_key));
    }
    if !profile.host_header.is_empty() {
        pairs.push(("address", &profile.host_header));
    }
    if !profile.short_id.is_empty() {
        pairs.push(("reserved", &profile.short_id));
    }
    if !profile.sni.is_empty() {
        pairs.push(("sni", &profile.sni));
    }
    if !profile.extra.is_empty() {
        pairs.push(("mtu", &profile.extra));
    }

    let mut link = format!(
        "{}{}@{}:{}",
        scheme::WIREGUARD,
        urlencoding::encode(&profile.secret),
        profile.host,
        profile.port
    );
    push_query_and_fragment(&mut link, encode_query(&pairs), &profile.name);
    link
}
