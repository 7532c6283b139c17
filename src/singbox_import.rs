//! sing-box config-dump decoding.
//!
//! Subscriptions sometimes ship a whole sing-box config; its `outbounds`
//! array is mined for proxy endpoints. Only vmess / vless / trojan /
//! shadowsocks outbounds are mapped; routing outbounds (selector, direct,
//! block, ...) are skipped silently.

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::profile::{Profile, ProtocolKind, SecurityKind, TransportKind};

#[derive(Debug, Deserialize)]
struct SingboxDump {
    #[serde(default)]
    outbounds: Vec<DumpOutbound>,
}

#[derive(Debug, Deserialize)]
struct DumpOutbound {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    server: String,
    #[serde(default)]
    server_port: u16,

    // vmess / vless
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    alter_id: u16,
    #[serde(default)]
    security: String,
    #[serde(default)]
    flow: String,

    // shadowsocks / trojan
    #[serde(default)]
    method: String,
    #[serde(default)]
    password: String,

    transport: Option<DumpTransport>,
    tls: Option<DumpTls>,
}

#[derive(Debug, Deserialize)]
struct DumpTransport {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    host: serde_json::Value,
    #[serde(default)]
    path: String,
    #[serde(default)]
    service_name: String,
}

#[derive(Debug, Deserialize)]
struct DumpTls {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    server_name: String,
    #[serde(default)]
    insecure: bool,
    #[serde(default)]
    alpn: Vec<String>,
    reality: Option<DumpReality>,
    utls: Option<DumpUtls>,
}

#[derive(Debug, Deserialize)]
struct DumpReality {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    public_key: String,
    #[serde(default)]
    short_id: String,
}

#[derive(Debug, Deserialize)]
struct DumpUtls {
    #[serde(default)]
    fingerprint: String,
}

/// Decodes a sing-box config dump into profiles, one per recognized
/// outbound. A malformed outer document is the only fatal error.
pub(crate) fn decode(content: &str) -> Result<Vec<Profile>> {
    let dump: SingboxDump = serde_json::from_str(content)?;
    Ok(dump
        .outbounds
        .into_iter()
        .filter_map(outbound_to_profile)
        .collect())
}

fn outbound_to_profile(ob: DumpOutbound) -> Option<Profile> {
    let kind = match ob.kind.as_str() {
        "vmess" => ProtocolKind::Vmess,
        "vless" => ProtocolKind::Vless,
        "trojan" => ProtocolKind::Trojan,
        "shadowsocks" => ProtocolKind::Shadowsocks,
        other => {
            debug!(kind = other, tag = %ob.tag, "skipping unrecognized outbound");
            return None;
        }
    };

    let mut p = Profile::new(kind);
    p.name = ob.tag;
    p.host = ob.server;
    p.port = ob.server_port;

    match kind {
        ProtocolKind::Vmess => {
            p.uuid = ob.uuid;
            p.alter_id = ob.alter_id;
            if !ob.security.is_empty() {
                p.method = ob.security;
            }
        }
        ProtocolKind::Vless => {
            p.uuid = ob.uuid;
            p.method = "none".to_string();
            p.flow = ob.flow;
        }
        ProtocolKind::Trojan => {
            p.secret = ob.password;
        }
        ProtocolKind::Shadowsocks => {
            p.method = ob.method;
            p.secret = ob.password;
        }
        _ => unreachable!(),
    }

    if let Some(t) = ob.transport {
        let host = match &t.host {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str())
                .next()
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        };
        match t.kind.as_str() {
            "ws" => {
                p.transport = TransportKind::Ws;
                p.host_header = host;
                p.path = t.path;
            }
            "http" => {
                p.transport = TransportKind::Http2;
                p.host_header = host;
                p.path = t.path;
            }
            "grpc" => {
                p.transport = TransportKind::Grpc;
                p.path = t.service_name;
            }
            "httpupgrade" => {
                p.transport = TransportKind::HttpUpgrade;
                p.host_header = host;
                p.path = t.path;
            }
            _ => {}
        }
    }

    if let Some(tls) = ob.tls {
        if tls.enabled {
            p.security = SecurityKind::Tls;
            p.sni = tls.server_name;
            p.allow_insecure = tls.insecure;
            if !tls.alpn.is_empty() {
                p.alpn = tls.alpn.join(",");
            }
            if let Some(utls) = tls.utls {
                p.fingerprint = utls.fingerprint;
            }
            if let Some(reality) = tls.reality {
                if reality.enabled {
                    p.security = SecurityKind::Reality;
                    p.public_key = reality.public_key;
                    p.short_id = reality.short_id;
                }
            }
        }
    }

    Some(p)
}
