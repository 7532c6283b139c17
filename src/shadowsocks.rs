//! Shadowsocks share-link codec.
//!
//! Two historical layouts are accepted:
//!
//! 1. `ss://base64(method:password)@host:port#name` (SIP002-style userinfo)
//! 2. `ss://base64(method:password@host:port)#name` (fully wrapped legacy)
//!
//! The decoder tries layout 1 (presence of `@` outside the base64) and
//! falls back to layout 2. Base64 is permissive across the four alphabets.
//! A missing `:` between method and password is a hard error.

use base64::Engine;

use crate::constants::scheme;
use crate::detect::decode_base64_permissive;
use crate::error::{DecodeError, Result};
use crate::profile::{Profile, ProtocolKind};
use crate::uri::{decode_fragment, split_host_port, split_link, strip_scheme};

/// Decodes an `ss://` link.
pub(crate) fn decode(uri: &str) -> Result<Profile> {
    let body = strip_scheme(uri, scheme::SHADOWSOCKS)
        .ok_or_else(|| DecodeError::UnsupportedScheme(uri.to_string()))?;

    let parts = split_link(body);
    let mut p = Profile::new(ProtocolKind::Shadowsocks);
    p.name = decode_fragment(parts.fragment)?;
    p.share_uri = Some(uri.to_string());

    // Layout 1: base64(method:password)@host:port
    if let Some(at) = parts.main.rfind('@') {
        let decoded = decode_base64_permissive(&parts.main[..at])?;
        let (method, password) = split_method_password(&decoded)?;
        let (host, port) = split_host_port(parts.main[at + 1..].trim_end_matches('/'));
        p.method = method;
        p.secret = password;
        p.host = host;
        p.port = port;
        return Ok(p);
    }

    // Layout 2: base64(method:password@host:port)
    let decoded = decode_base64_permissive(parts.main)?;
    let at = decoded
        .rfind('@')
        .ok_or_else(|| DecodeError::InvalidFormat("missing '@' in ss payload".to_string()))?;
    let (method, password) = split_method_password(&decoded[..at])?;
    let (host, port) = split_host_port(&decoded[at + 1..]);
    p.method = method;
    p.secret = password;
    p.host = host;
    p.port = port;
    Ok(p)
}

/// Encodes a profile as an `ss://` link in the userinfo layout, with
/// unpadded URL-safe base64.
pub(crate) fn encode(profile: &Profile) -> String {
    let userinfo = format!("{}:{}", profile.method, profile.secret);
    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(userinfo.as_bytes());

    let mut link = format!(
        "{}{}@{}:{}",
        scheme::SHADOWSOCKS,
        encoded,
        profile.host,
        profile.port
    );
    if !profile.name.is_empty() {
        link.push('#');
        link.push_str(&urlencoding::encode(&profile.name));
    }
    link
}

fn split_method_password(s: &str) -> Result<(String, String)> {
    match s.split_once(':') {
        Some((method, password)) => Ok((method.to_string(), password.to_string())),
        None => Err(DecodeError::InvalidFormat(
            "missing ':' in method:password".to_string(),
        )),
    }
}
