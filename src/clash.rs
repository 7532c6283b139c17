//! Clash YAML subscription decoding.
//!
//! Maps the `proxies` list of a Clash config onto profiles. Option blocks
//! (`ws-opts`, `grpc-opts`, `h2-opts`, `reality-opts`) translate into the
//! same transport/security fields the URI decoders populate. Entries with
//! an unrecognized `type` are skipped silently.

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::profile::{EngineKind, Profile, ProtocolKind, SecurityKind, TransportKind};

#[derive(Debug, Deserialize)]
struct ClashDocument {
    #[serde(default)]
    proxies: Vec<ClashProxy>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClashProxy {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    server: String,
    port: u16,
    password: String,
    uuid: String,
    #[serde(rename = "alterId")]
    alter_id: u16,
    cipher: String,

    // TLS
    tls: bool,
    #[serde(rename = "skip-cert-verify")]
    skip_cert_verify: bool,
    servername: String,
    sni: String,
    alpn: Vec<String>,
    #[serde(rename = "client-fingerprint")]
    client_fingerprint: String,

    // Transport
    network: String,
    #[serde(rename = "ws-opts")]
    ws_opts: Option<ClashWsOpts>,
    #[serde(rename = "grpc-opts")]
    grpc_opts: Option<ClashGrpcOpts>,
    #[serde(rename = "h2-opts")]
    h2_opts: Option<ClashH2Opts>,

    // VLESS
    flow: String,
    #[serde(rename = "reality-opts")]
    reality_opts: Option<ClashRealityOpts>,

    // Hysteria2
    auth: String,
    obfs: String,
    #[serde(rename = "obfs-password")]
    obfs_password: String,

    // TUIC
    #[serde(rename = "congestion-controller")]
    congestion_controller: String,
    #[serde(rename = "udp-relay-mode")]
    udp_relay_mode: String,

    // WireGuard
    #[serde(rename = "private-key")]
    private_key: String,
    #[serde(rename = "public-key")]
    public_key: String,
    ip: String,
    ipv6: String,
    reserved: Vec<i64>,
    mtu: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClashWsOpts {
    path: String,
    headers: std::collections::HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClashGrpcOpts {
    #[serde(rename = "grpc-service-name")]
    grpc_service_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClashH2Opts {
    host: Vec<String>,
    path: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClashRealityOpts {
    #[serde(rename = "public-key")]
    public_key: String,
    #[serde(rename = "short-id")]
    short_id: String,
}

/// Decodes a Clash YAML document into profiles, one per recognized proxy.
/// A malformed outer document is the only fatal error.
pub(crate) fn decode(content: &str) -> Result<Vec<Profile>> {
    let doc: ClashDocument = serde_yaml::from_str(content)?;
    Ok(doc.proxies.into_iter().filter_map(proxy_to_profile).collect())
}

fn proxy_to_profile(cp: ClashProxy) -> Option<Profile> {
    let kind = match cp.kind.to_lowercase().as_str() {
        "vmess" => ProtocolKind::Vmess,
        "vless" => ProtocolKind::Vless,
        "trojan" => ProtocolKind::Trojan,
        "ss" | "shadowsocks" => ProtocolKind::Shadowsocks,
        "hysteria2" | "hy2" => ProtocolKind::Hysteria2,
        "tuic" => ProtocolKind::Tuic,
        "wireguard" | "wg" => ProtocolKind::Wireguard,
        other => {
            debug!(kind = other, name = %cp.name, "skipping unrecognized proxy type");
            return None;
        }
    };

    let mut p = Profile::new(kind);
    p.name = cp.name;
    p.host = cp.server;
    p.port = cp.port;

    match kind {
        ProtocolKind::Vmess => {
            p.uuid = cp.uuid;
            p.alter_id = cp.alter_id;
            if !cp.cipher.is_empty() {
                p.method = cp.cipher;
            }
        }
        ProtocolKind::Vless => {
            p.uuid = cp.uuid;
            p.flow = cp.flow;
            p.method = "none".to_string();
        }
        ProtocolKind::Trojan => {
            p.secret = cp.password;
        }
        ProtocolKind::Shadowsocks => {
            p.method = cp.cipher;
            p.secret = cp.password;
        }
        ProtocolKind::Hysteria2 => {
            p.engine = EngineKind::Singbox;
            p.secret = if cp.password.is_empty() {
                cp.auth
            } else {
                cp.password
            };
            p.header_type = cp.obfs;
            p.path = cp.obfs_password;
            p.security = SecurityKind::Tls;
        }
        ProtocolKind::Tuic => {
            p.engine = EngineKind::Singbox;
            p.uuid = cp.uuid;
            p.secret = cp.password;
            p.header_type = cp.congestion_controller;
            p.path = cp.udp_relay_mode;
            p.security = SecurityKind::Tls;
        }
        ProtocolKind::Wireguard => {
            p.engine = EngineKind::Singbox;
            p.secret = cp.private_key;
            p.public_key = cp.public_key;
            p.transport = TransportKind::Wireguard;
            let mut addresses = Vec::new();
            if !cp.ip.is_empty() {
                addresses.push(cp.ip);
            }
            if !cp.ipv6.is_empty() {
                addresses.push(cp.ipv6);
            }
            p.host_header = addresses.join(",");
            if !cp.reserved.is_empty() {
                p.short_id = cp
                    .reserved
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
            }
            if cp.mtu > 0 {
                p.extra = cp.mtu.to_string();
            }
            // No transport/TLS layer beyond the tunnel itself.
            return Some(p);
        }
        ProtocolKind::Socks | ProtocolKind::Http => unreachable!(),
    }

    // Shared TLS fields.
    if cp.tls {
        p.security = SecurityKind::Tls;
    }
    p.allow_insecure = cp.skip_cert_verify;
    p.sni = if cp.sni.is_empty() {
        cp.servername
    } else {
        cp.sni
    };
    if !cp.alpn.is_empty() {
        p.alpn = cp.alpn.join(",");
    }
    p.fingerprint = cp.client_fingerprint;

    if let Some(reality) = cp.reality_opts {
        p.security = SecurityKind::Reality;
        p.public_key = reality.public_key;
        p.short_id = reality.short_id;
    }

    // Shared transport fields. Hysteria2/TUIC keep their QUIC framing.
    if kind != ProtocolKind::Hysteria2 && kind != ProtocolKind::Tuic {
        p.transport = TransportKind::parse(&cp.network);
        match p.transport {
            TransportKind::Ws => {
                if let Some(ws) = cp.ws_opts {
                    p.path = ws.path;
                    if let Some(host) = ws.headers.get("Host") {
                        p.host_header = host.clone();
                    }
                }
            }
            TransportKind::Grpc => {
                if let Some(grpc) = cp.grpc_opts {
                    p.path = grpc.grpc_service_name;
                }
            }
            TransportKind::Http2 => {
                if let Some(h2) = cp.h2_opts {
                    p.path = h2.path;
                    if let Some(host) = h2.host.into_iter().next() {
                        p.host_header = host;
                    }
                }
            }
            _ => {}
        }
    }

    Some(p)
}
