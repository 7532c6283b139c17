//! VMess share-link codec.
//!
//! Unlike the URL-shaped schemes, the entire body after `vmess://` is a
//! base64-encoded JSON object (`v`, `ps`, `add`, `port`, `id`, `aid`, `scy`,
//! `net`, `type`, `host`, `path`, `tls`, `sni`, `alpn`, `fp`). The base64
//! decode is permissive (four alphabets, whitespace stripped); the JSON
//! decode is strict. `port` and `aid` arrive as either number or string in
//! the wild and both representations are coerced.
//!
//! Absent `scy` / `net` / `tls` fields default to `auto` / `tcp` / `none`.

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{defaults, scheme};
use crate::detect::decode_base64_permissive;
use crate::error::{DecodeError, Result};
use crate::profile::{Profile, ProtocolKind, SecurityKind, TransportKind};
use crate::uri::strip_scheme;

/// Deserializes a number-or-string field, tolerating unparsable values as
/// `None` so one odd field never sinks the whole link.
fn number_or_string<'de, D>(d: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Num(i64),
        Str(String),
    }
    Ok(match Option::<Value>::deserialize(d)? {
        None => None,
        Some(Value::Num(n)) => u16::try_from(n).ok(),
        Some(Value::Str(s)) => s.trim().parse().ok(),
    })
}

/// The JSON body inside a `vmess://` link.
#[derive(Debug, Serialize, Deserialize)]
struct VmessBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    v: Option<String>,
    #[serde(default)]
    ps: String,
    #[serde(default)]
    add: String,
    #[serde(default, deserialize_with = "number_or_string")]
    port: Option<u16>,
    #[serde(default)]
    id: String,
    #[serde(default, deserialize_with = "number_or_string")]
    aid: Option<u16>,
    #[serde(default)]
    scy: String,
    #[serde(default)]
    net: String,
    #[serde(default, rename = "type")]
    header_type: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    tls: String,
    #[serde(default)]
    sni: String,
    #[serde(default)]
    alpn: String,
    #[serde(default)]
    fp: String,
}

/// Decodes a `vmess://` link.
pub(crate) fn decode(uri: &str) -> Result<Profile> {
    let body = strip_scheme(uri, scheme::VMESS)
        .ok_or_else(|| DecodeError::UnsupportedScheme(uri.to_string()))?;

    let json = decode_base64_permissive(body)?;
    let v: VmessBody = serde_json::from_str(&json)?;

    let mut p = Profile::new(ProtocolKind::Vmess);
    p.name = v.ps;
    p.host = v.add;
    p.port = v.port.unwrap_or(0);
    p.uuid = v.id;
    p.alter_id = v.aid.unwrap_or(0);
    p.method = if v.scy.is_empty() {
        defaults::VMESS_SECURITY.to_string()
    } else {
        v.scy
    };
    p.transport = TransportKind::parse(&v.net);
    p.header_type = v.header_type;
    p.host_header = v.host;
    p.path = v.path;
    p.security = SecurityKind::parse(&v.tls);
    p.sni = v.sni;
    p.alpn = v.alpn;
    p.fingerprint = v.fp;
    p.share_uri = Some(uri.to_string());
    Ok(p)
}

/// Encodes a profile as a `vmess://` link (always the base64-JSON form).
pub(crate) fn encode(profile: &Profile) -> String {
    let body = VmessBody {
        v: Some("2".to_string()),
        ps: profile.name.clone(),
        add: profile.host.clone(),
        port: Some(profile.port),
        id: profile.uuid.clone(),
        aid: Some(profile.alter_id),
        scy: profile.method.clone(),
        net: profile.transport.as_str().to_string(),
        header_type: profile.header_type.clone(),
        host: profile.host_header.clone(),
        path: profile.path.clone(),
        tls: match profile.security {
            SecurityKind::None => String::new(),
            other => other.as_str().to_string(),
        },
        sni: profile.sni.clone(),
        alpn: profile.alpn.clone(),
        fp: profile.fingerprint.clone(),
    };
    // Field order and values are fixed by the struct; serialization of a
    // plain struct cannot fail.
    let json = serde_json::to_string(&body).unwrap_or_default();
    format!(
        "{}{}",
        scheme::VMESS,
        base64::engine::general_purpose::STANDARD.encode(json.as_bytes())
    )
}
