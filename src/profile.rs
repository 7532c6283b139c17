//! Canonical profile model.
//!
//! [`Profile`] is the single in-memory representation every decoder produces
//! and both config generators consume. Which fields carry meaning is decided
//! entirely by [`ProtocolKind`]; generators ignore fields that do not apply
//! to a protocol instead of rejecting them.
//!
//! A few fields are deliberately overloaded across protocols, following the
//! reference model, so decoders, encoders, and generators stay in lockstep:
//!
//! | Field | Base meaning | Also carries |
//! |---|---|---|
//! | `header_type` | obfuscation header type | Hysteria2 `obfs` mode, TUIC congestion control |
//! | `path` | ws/h2/httpupgrade path, grpc service name | Hysteria2 `obfs-password`, TUIC udp relay mode |
//! | `host_header` | ws/h2 Host header | WireGuard tunnel addresses (comma-joined) |
//! | `short_id` | Reality short id | WireGuard reserved bytes (comma-joined) |
//! | `extra` | engine-specific extras | WireGuard MTU |

use serde::{Deserialize, Serialize};

/// Proxy protocol family. Closed set; everything else is unsupported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    /// VMess
    Vmess,
    /// VLESS
    Vless,
    /// Trojan
    Trojan,
    /// Shadowsocks
    Shadowsocks,
    /// SOCKS5 (no share-link form)
    Socks,
    /// Plain HTTP proxy (no share-link form)
    Http,
    /// Hysteria2
    Hysteria2,
    /// TUIC
    Tuic,
    /// WireGuard
    Wireguard,
}

impl ProtocolKind {
    /// Lowercase wire name, as used in outbound `type`/`protocol` fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolKind::Vmess => "vmess",
            ProtocolKind::Vless => "vless",
            ProtocolKind::Trojan => "trojan",
            ProtocolKind::Shadowsocks => "shadowsocks",
            ProtocolKind::Socks => "socks",
            ProtocolKind::Http => "http",
            ProtocolKind::Hysteria2 => "hysteria2",
            ProtocolKind::Tuic => "tuic",
            ProtocolKind::Wireguard => "wireguard",
        }
    }
}

impl std::fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream transport. Closed set; unknown transport strings fall back to tcp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Plain TCP (default)
    #[default]
    Tcp,
    /// WebSocket
    Ws,
    /// gRPC
    Grpc,
    /// HTTP/2
    #[serde(rename = "h2")]
    Http2,
    /// HTTPUpgrade
    HttpUpgrade,
    /// mKCP
    Kcp,
    /// WireGuard's own tunnel framing
    Wireguard,
}

impl TransportKind {
    /// Parses a transport name as it appears in links and Clash configs.
    /// Unrecognized names map to `Tcp`.
    pub fn parse(s: &str) -> TransportKind {
        match s {
            "ws" => TransportKind::Ws,
            "grpc" => TransportKind::Grpc,
            "h2" | "http" => TransportKind::Http2,
            "httpupgrade" => TransportKind::HttpUpgrade,
            "kcp" => TransportKind::Kcp,
            "wireguard" => TransportKind::Wireguard,
            _ => TransportKind::Tcp,
        }
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Tcp => "tcp",
            TransportKind::Ws => "ws",
            TransportKind::Grpc => "grpc",
            TransportKind::Http2 => "h2",
            TransportKind::HttpUpgrade => "httpupgrade",
            TransportKind::Kcp => "kcp",
            TransportKind::Wireguard => "wireguard",
        }
    }
}

/// Stream security layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SecurityKind {
    /// No TLS (default)
    #[default]
    None,
    /// TLS
    Tls,
    /// Reality (TLS camouflage with public key / short id)
    Reality,
}

impl SecurityKind {
    /// Parses a security name; unrecognized names map to `None`.
    pub fn parse(s: &str) -> SecurityKind {
        match s {
            "tls" => SecurityKind::Tls,
            "reality" => SecurityKind::Reality,
            _ => SecurityKind::None,
        }
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            SecurityKind::None => "none",
            SecurityKind::Tls => "tls",
            SecurityKind::Reality => "reality",
        }
    }
}

/// Preferred backend engine for a profile; overrides the default
/// protocol→engine affinity when not `Auto`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Pick by protocol affinity
    #[default]
    Auto,
    /// xray-core
    Xray,
    /// sing-box
    Singbox,
}

/// Generates a fresh opaque id for profiles, rules, and routing sets.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// One proxy endpoint in canonical form.
///
/// Immutable value object: decoders construct a fresh `Profile`, encoders
/// and generators consume it read-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Opaque unique id.
    pub id: String,
    /// Protocol family.
    pub kind: ProtocolKind,
    /// Display name (share-link fragment / `ps` / `remarks`).
    #[serde(default)]
    pub name: String,
    /// Id of the subscription this profile came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
    /// Original share text, preserved for idempotent re-export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_uri: Option<String>,

    /// Server host.
    #[serde(default)]
    pub host: String,
    /// Server port. Lenient decoding tolerates 0 for absent/bad ports;
    /// [`Profile::validate`] is the check for user-constructed profiles.
    #[serde(default)]
    pub port: u16,

    /// Identifier: UUID (vmess/vless/tuic) or username.
    #[serde(default)]
    pub uuid: String,
    /// Secondary secret: password (trojan/shadowsocks/hysteria2/tuic) or
    /// private key (wireguard).
    #[serde(default)]
    pub secret: String,
    /// VMess alter id.
    #[serde(default)]
    pub alter_id: u16,
    /// Cipher / method: vmess `scy`, shadowsocks method, vless encryption.
    #[serde(default)]
    pub method: String,
    /// VLESS flow tag.
    #[serde(default)]
    pub flow: String,

    /// Stream transport.
    #[serde(default)]
    pub transport: TransportKind,
    /// Obfuscation header type (see module docs for overloads).
    #[serde(default)]
    pub header_type: String,
    /// Host header (see module docs for overloads).
    #[serde(default)]
    pub host_header: String,
    /// Path / service name (see module docs for overloads).
    #[serde(default)]
    pub path: String,

    /// Stream security layer.
    #[serde(default)]
    pub security: SecurityKind,
    /// Skip certificate verification.
    #[serde(default)]
    pub allow_insecure: bool,
    /// Server name indication.
    #[serde(default)]
    pub sni: String,
    /// ALPN list, comma-joined.
    #[serde(default)]
    pub alpn: String,
    /// uTLS client-hello fingerprint name.
    #[serde(default)]
    pub fingerprint: String,

    /// Reality public key.
    #[serde(default)]
    pub public_key: String,
    /// Reality short id (see module docs for overloads).
    #[serde(default)]
    pub short_id: String,
    /// Reality spider-x path.
    #[serde(default)]
    pub spider_x: String,

    /// Preferred backend engine.
    #[serde(default)]
    pub engine: EngineKind,
    /// Engine-specific extras (see module docs for overloads).
    #[serde(default)]
    pub extra: String,
}

impl Profile {
    /// Returns a profile of the given kind with a generated id and the
    /// canonical defaults (tcp transport, no TLS, `auto` cipher).
    pub fn new(kind: ProtocolKind) -> Profile {
        Profile {
            id: new_id(),
            kind,
            name: String::new(),
            sub_id: None,
            share_uri: None,
            host: String::new(),
            port: 0,
            uuid: String::new(),
            secret: String::new(),
            alter_id: 0,
            method: "auto".to_string(),
            flow: String::new(),
            transport: TransportKind::Tcp,
            header_type: String::new(),
            host_header: String::new(),
            path: String::new(),
            security: SecurityKind::None,
            allow_insecure: false,
            sni: String::new(),
            alpn: String::new(),
            fingerprint: String::new(),
            public_key: String::new(),
            short_id: String::new(),
            spider_x: String::new(),
            engine: EngineKind::Auto,
            extra: String::new(),
        }
    }

    /// Basic validation for profiles built from user input. Decoded
    /// profiles are intentionally not run through this (leniency rule).
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host is required".to_string());
        }
        if self.port == 0 {
            return Err("port must be between 1 and 65535".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_has_defaults() {
        let p = Profile::new(ProtocolKind::Vless);
        assert!(!p.id.is_empty());
        assert_eq!(p.transport, TransportKind::Tcp);
        assert_eq!(p.security, SecurityKind::None);
        assert_eq!(p.method, "auto");
    }

    #[test]
    fn validate_rejects_empty_host_and_zero_port() {
        let mut p = Profile::new(ProtocolKind::Trojan);
        assert!(p.validate().is_err());
        p.host = "example.com".to_string();
        assert!(p.validate().is_err());
        p.port = 443;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn transport_parse_falls_back_to_tcp() {
        assert_eq!(TransportKind::parse("ws"), TransportKind::Ws);
        assert_eq!(TransportKind::parse("h2"), TransportKind::Http2);
        assert_eq!(TransportKind::parse("quic"), TransportKind::Tcp);
        assert_eq!(TransportKind::parse(""), TransportKind::Tcp);
    }
}
