//! xray configuration document generation.
//!
//! Builds a strongly-typed document
//! (log / dns / inbounds / outbounds / routing / stats / api) instead of an
//! ad hoc JSON tree; serialization happens generically at the boundary via
//! serde. Key presence and nesting are the compatibility contract; key
//! order is not.
//!
//! A fixed dokodemo-door inbound on loopback plus a fixed routing rule
//! binding it to the `api` outbound tag are always injected so statistics
//! can be queried, regardless of the user-supplied routing set.

use serde::Serialize;

use crate::profile::{Profile, ProtocolKind, SecurityKind, TransportKind};
use crate::routing::RoutingSet;
use crate::settings::{DnsConfig, GlobalSettings};

const API_TAG: &str = "api";
const API_INBOUND_TAG: &str = "api-in";
const API_PORT: u16 = 10813;

/// Root of an xray configuration document.
#[derive(Debug, Serialize)]
pub struct XrayConfig {
    pub log: XrayLog,
    pub dns: XrayDns,
    pub inbounds: Vec<XrayInbound>,
    pub outbounds: Vec<XrayOutbound>,
    pub routing: XrayRouting,
    pub stats: XrayStats,
    pub api: XrayApi,
}

impl XrayConfig {
    /// Serializes the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `log` section.
#[derive(Debug, Serialize)]
pub struct XrayLog {
    pub loglevel: String,
}

/// `dns` section.
#[derive(Debug, Serialize)]
pub struct XrayDns {
    pub servers: Vec<XrayDnsServer>,
}

/// A DNS server entry: either a bare resolver address or a resolver scoped
/// to a domain set (remote resolver for foreign sites, direct for local).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum XrayDnsServer {
    Plain(String),
    Scoped { address: String, domains: Vec<String> },
}

/// One inbound listener.
#[derive(Debug, Serialize)]
pub struct XrayInbound {
    pub tag: String,
    pub protocol: String,
    pub listen: String,
    pub port: u16,
    pub settings: XrayInboundSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sniffing: Option<XraySniffing>,
}

/// Inbound `settings`; serializes as `{}` when nothing applies.
#[derive(Debug, Default, Serialize)]
pub struct XrayInboundSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,
}

/// Inbound `sniffing` block.
#[derive(Debug, Serialize)]
pub struct XraySniffing {
    pub enabled: bool,
    #[serde(rename = "destOverride")]
    pub dest_override: Vec<String>,
}

/// One outbound.
#[derive(Debug, Serialize)]
pub struct XrayOutbound {
    pub tag: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<XrayOutboundSettings>,
    #[serde(rename = "streamSettings", skip_serializing_if = "Option::is_none")]
    pub stream_settings: Option<XrayStreamSettings>,
}

/// Outbound `settings`, a union across the protocol families.
#[derive(Debug, Default, Serialize)]
pub struct XrayOutboundSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnext: Option<Vec<XrayVnext>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<XrayServer>>,
    // WireGuard
    #[serde(rename = "secretKey", skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peers: Option<Vec<XrayWireguardPeer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    // blackhole
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<XrayResponse>,
}

/// vmess/vless server entry.
#[derive(Debug, Serialize)]
pub struct XrayVnext {
    pub address: String,
    pub port: u16,
    pub users: Vec<XrayUser>,
}

/// vmess/vless user entry.
#[derive(Debug, Serialize)]
pub struct XrayUser {
    pub id: String,
    #[serde(rename = "alterId", skip_serializing_if = "Option::is_none")]
    pub alter_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
}

/// trojan/shadowsocks server entry.
#[derive(Debug, Serialize)]
pub struct XrayServer {
    pub address: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub password: String,
}

/// WireGuard peer entry.
#[derive(Debug, Serialize)]
pub struct XrayWireguardPeer {
    #[serde(rename = "publicKey")]
    pub public_key: String,
    pub endpoint: String,
}

/// blackhole response block.
#[derive(Debug, Serialize)]
pub struct XrayResponse {
    #[serde(rename = "type")]
    pub kind: String,
}

/// `streamSettings` block shared by the standard protocols.
#[derive(Debug, Serialize)]
pub struct XrayStreamSettings {
    pub network: String,
    pub security: String,
    #[serde(rename = "wsSettings", skip_serializing_if = "Option::is_none")]
    pub ws_settings: Option<XrayWsSettings>,
    #[serde(rename = "httpSettings", skip_serializing_if = "Option::is_none")]
    pub http_settings: Option<XrayHttpSettings>,
    #[serde(rename = "grpcSettings", skip_serializing_if = "Option::is_none")]
    pub grpc_settings: Option<XrayGrpcSettings>,
    #[serde(rename = "kcpSettings", skip_serializing_if = "Option::is_none")]
    pub kcp_settings: Option<XrayKcpSettings>,
    #[serde(rename = "tcpSettings", skip_serializing_if = "Option::is_none")]
    pub tcp_settings: Option<XrayTcpSettings>,
    #[serde(
        rename = "httpupgradeSettings",
        skip_serializing_if = "Option::is_none"
    )]
    pub httpupgrade_settings: Option<XrayHttpUpgradeSettings>,
    #[serde(rename = "tlsSettings", skip_serializing_if = "Option::is_none")]
    pub tls_settings: Option<XrayTlsSettings>,
    #[serde(rename = "realitySettings", skip_serializing_if = "Option::is_none")]
    pub reality_settings: Option<XrayRealitySettings>,
}

/// WebSocket transport settings.
#[derive(Debug, Default, Serialize)]
pub struct XrayWsSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<XrayHostHeader>,
}

/// `headers: {Host: ...}` helper.
#[derive(Debug, Serialize)]
pub struct XrayHostHeader {
    #[serde(rename = "Host")]
    pub host: String,
}

/// HTTP/2 transport settings.
#[derive(Debug, Default, Serialize)]
pub struct XrayHttpSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// gRPC transport settings.
#[derive(Debug, Default, Serialize)]
pub struct XrayGrpcSettings {
    #[serde(rename = "serviceName", skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

/// mKCP transport settings.
#[derive(Debug, Default, Serialize)]
pub struct XrayKcpSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<XrayHeader>,
}

/// Obfuscation header block.
#[derive(Debug, Serialize)]
pub struct XrayHeader {
    #[serde(rename = "type")]
    pub kind: String,
}

/// TCP transport settings (HTTP camouflage only).
#[derive(Debug, Serialize)]
pub struct XrayTcpSettings {
    pub header: XrayTcpHeader,
}

/// TCP HTTP-camouflage header.
#[derive(Debug, Serialize)]
pub struct XrayTcpHeader {
    #[serde(rename = "type")]
    pub kind: String,
    pub request: XrayTcpRequest,
}

/// Faked HTTP request for TCP camouflage.
#[derive(Debug, Serialize)]
pub struct XrayTcpRequest {
    pub path: Vec<String>,
    pub headers: XrayTcpRequestHeaders,
}

/// Faked HTTP request headers.
#[derive(Debug, Serialize)]
pub struct XrayTcpRequestHeaders {
    #[serde(rename = "Host")]
    pub host: Vec<String>,
}

/// HTTPUpgrade transport settings.
#[derive(Debug, Default, Serialize)]
pub struct XrayHttpUpgradeSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// TLS settings.
#[derive(Debug, Default, Serialize)]
pub struct XrayTlsSettings {
    #[serde(rename = "serverName", skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(rename = "allowInsecure", skip_serializing_if = "Option::is_none")]
    pub allow_insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Reality settings.
#[derive(Debug, Default, Serialize)]
pub struct XrayRealitySettings {
    #[serde(rename = "serverName", skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(rename = "publicKey", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(rename = "shortId", skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    #[serde(rename = "spiderX", skip_serializing_if = "Option::is_none")]
    pub spider_x: Option<String>,
}

/// `routing` section.
#[derive(Debug, Serialize)]
pub struct XrayRouting {
    #[serde(rename = "domainStrategy")]
    pub domain_strategy: String,
    pub rules: Vec<XrayRule>,
}

/// One routing rule with collapsed domain/ip predicate arrays.
#[derive(Debug, Default, Serialize)]
pub struct XrayRule {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "inboundTag", skip_serializing_if = "Option::is_none")]
    pub inbound_tag: Option<Vec<String>>,
    #[serde(rename = "outboundTag")]
    pub outbound_tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocol: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(rename = "ruleSet", skip_serializing_if = "Vec::is_empty")]
    pub rule_set: Vec<String>,
}

/// `stats` section (presence enables the stats service).
#[derive(Debug, Serialize)]
pub struct XrayStats {}

/// `api` section.
#[derive(Debug, Serialize)]
pub struct XrayApi {
    pub tag: String,
    pub services: Vec<String>,
}

/// Compiles one profile plus routing/DNS/global settings into an xray
/// document. Total for well-formed input; fields that do not apply to the
/// profile's protocol are ignored.
pub fn generate(
    profile: &Profile,
    routing: &RoutingSet,
    dns: &DnsConfig,
    settings: &GlobalSettings,
) -> XrayConfig {
    XrayConfig {
        log: XrayLog {
            loglevel: non_empty(&settings.log_level, "info"),
        },
        dns: build_dns(dns),
        inbounds: build_inbounds(settings),
        outbounds: build_outbounds(profile),
        routing: build_routing(routing),
        stats: XrayStats {},
        api: XrayApi {
            tag: API_TAG.to_string(),
            services: vec!["StatsService".to_string()],
        },
    }
}

fn build_dns(dns: &DnsConfig) -> XrayDns {
    let mut servers = Vec::new();
    if !dns.remote.is_empty() {
        servers.push(XrayDnsServer::Scoped {
            address: dns.remote.clone(),
            domains: vec!["geosite:geolocation-!cn".to_string()],
        });
    }
    if !dns.direct.is_empty() {
        servers.push(XrayDnsServer::Scoped {
            address: dns.direct.clone(),
            domains: vec!["geosite:cn".to_string()],
        });
    }
    if !dns.bootstrap.is_empty() {
        servers.push(XrayDnsServer::Plain(dns.bootstrap.clone()));
    }
    XrayDns { servers }
}

fn build_inbounds(settings: &GlobalSettings) -> Vec<XrayInbound> {
    let mut inbounds = vec![XrayInbound {
        tag: API_INBOUND_TAG.to_string(),
        protocol: "dokodemo-door".to_string(),
        listen: "127.0.0.1".to_string(),
        port: API_PORT,
        settings: XrayInboundSettings {
            address: Some("127.0.0.1".to_string()),
            udp: None,
        },
        sniffing: None,
    }];

    for ib in &settings.inbounds {
        let listen = if ib.allow_lan {
            "0.0.0.0".to_string()
        } else {
            non_empty(&ib.listen, "127.0.0.1")
        };
        inbounds.push(XrayInbound {
            tag: format!("{}-in", ib.protocol),
            protocol: ib.protocol.clone(),
            listen,
            port: ib.port,
            settings: XrayInboundSettings {
                address: None,
                udp: (ib.protocol == "socks").then_some(ib.udp_enabled),
            },
            sniffing: ib.sniffing_enabled.then(|| XraySniffing {
                enabled: true,
                dest_override: vec!["http".to_string(), "tls".to_string()],
            }),
        });
    }

    inbounds
}

fn build_outbounds(profile: &Profile) -> Vec<XrayOutbound> {
    vec![
        build_proxy_outbound(profile),
        XrayOutbound {
            tag: "direct".to_string(),
            protocol: "freedom".to_string(),
            settings: None,
            stream_settings: None,
        },
        XrayOutbound {
            tag: "block".to_string(),
            protocol: "blackhole".to_string(),
            settings: Some(XrayOutboundSettings {
                response: Some(XrayResponse {
                    kind: "none".to_string(),
                }),
                ..XrayOutboundSettings::default()
            }),
            stream_settings: None,
        },
    ]
}

fn build_proxy_outbound(profile: &Profile) -> XrayOutbound {
    let mut settings = XrayOutboundSettings::default();

    match profile.kind {
        ProtocolKind::Vmess => {
            settings.vnext = Some(vec![XrayVnext {
                address: profile.host.clone(),
                port: profile.port,
                users: vec![XrayUser {
                    id: profile.uuid.clone(),
                    alter_id: Some(profile.alter_id),
                    security: Some(non_empty(&profile.method, "auto")),
                    encryption: None,
                    flow: None,
                }],
            }]);
        }
        ProtocolKind::Vless => {
            settings.vnext = Some(vec![XrayVnext {
                address: profile.host.clone(),
                port: profile.port,
                users: vec![XrayUser {
                    id: profile.uuid.clone(),
                    alter_id: None,
                    security: None,
                    encryption: Some("none".to_string()),
                    flow: (!profile.flow.is_empty()).then(|| profile.flow.clone()),
                }],
            }]);
        }
        ProtocolKind::Trojan => {
            settings.servers = Some(vec![XrayServer {
                address: profile.host.clone(),
                port: profile.port,
                method: None,
                password: profile.secret.clone(),
            }]);
        }
        ProtocolKind::Shadowsocks => {
            settings.servers = Some(vec![XrayServer {
                address: profile.host.clone(),
                port: profile.port,
                method: Some(profile.method.clone()),
                password: profile.secret.clone(),
            }]);
        }
        ProtocolKind::Wireguard => {
            // No stream transport or TLS layer: the outbound is complete
            // once key material and addressing are set.
            settings.secret_key = Some(profile.secret.clone());
            let addresses: Vec<String> = profile
                .host_header
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
            if !addresses.is_empty() {
                settings.address = Some(addresses);
            }
            if !profile.public_key.is_empty() {
                settings.peers = Some(vec![XrayWireguardPeer {
                    public_key: profile.public_key.clone(),
                    endpoint: format!("{}:{}", profile.host, profile.port),
                }]);
            }
            let reserved: Vec<i64> = profile
                .short_id
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if !reserved.is_empty() {
                settings.reserved = Some(reserved);
            }
            if let Ok(mtu) = profile.extra.parse() {
                settings.mtu = Some(mtu);
            }
            return XrayOutbound {
                tag: "proxy".to_string(),
                protocol: "wireguard".to_string(),
                settings: Some(settings),
                stream_settings: None,
            };
        }
        // No xray outbound exists for these; the engine affinity routes
        // them to sing-box, but the generator stays total.
        ProtocolKind::Hysteria2
        | ProtocolKind::Tuic
        | ProtocolKind::Socks
        | ProtocolKind::Http => {}
    }

    XrayOutbound {
        tag: "proxy".to_string(),
        protocol: profile.kind.as_str().to_string(),
        settings: Some(settings),
        stream_settings: Some(build_stream_settings(profile)),
    }
}

fn build_stream_settings(profile: &Profile) -> XrayStreamSettings {
    let mut ss = XrayStreamSettings {
        network: profile.transport.as_str().to_string(),
        security: profile.security.as_str().to_string(),
        ws_settings: None,
        http_settings: None,
        grpc_settings: None,
        kcp_settings: None,
        tcp_settings: None,
        httpupgrade_settings: None,
        tls_settings: None,
        reality_settings: None,
    };

    match profile.transport {
        TransportKind::Ws => {
            ss.ws_settings = Some(XrayWsSettings {
                path: (!profile.path.is_empty()).then(|| profile.path.clone()),
                headers: (!profile.host_header.is_empty()).then(|| XrayHostHeader {
                    host: profile.host_header.clone(),
                }),
            });
        }
        TransportKind::Http2 => {
            ss.http_settings = Some(XrayHttpSettings {
                host: (!profile.host_header.is_empty())
                    .then(|| profile.host_header.split(',').map(str::to_string).collect()),
                path: (!profile.path.is_empty()).then(|| profile.path.clone()),
            });
        }
        TransportKind::Grpc => {
            ss.grpc_settings = Some(XrayGrpcSettings {
                service_name: (!profile.path.is_empty()).then(|| profile.path.clone()),
            });
        }
        TransportKind::Kcp => {
            ss.kcp_settings = Some(XrayKcpSettings {
                header: (!profile.header_type.is_empty()).then(|| XrayHeader {
                    kind: profile.header_type.clone(),
                }),
            });
        }
        TransportKind::Tcp => {
            if profile.header_type == "http" {
                ss.tcp_settings = Some(XrayTcpSettings {
                    header: XrayTcpHeader {
                        kind: "http".to_string(),
                        request: XrayTcpRequest {
                            path: vec![non_empty(&profile.path, "/")],
                            headers: XrayTcpRequestHeaders {
                                host: profile
                                    .host_header
                                    .split(',')
                                    .map(str::to_string)
                                    .collect(),
                            },
                        },
                    },
                });
            }
        }
        TransportKind::HttpUpgrade => {
            ss.httpupgrade_settings = Some(XrayHttpUpgradeSettings {
                host: (!profile.host_header.is_empty()).then(|| profile.host_header.clone()),
                path: (!profile.path.is_empty()).then(|| profile.path.clone()),
            });
        }
        TransportKind::Wireguard => {}
    }

    match profile.security {
        SecurityKind::Tls => {
            ss.tls_settings = Some(XrayTlsSettings {
                server_name: (!profile.sni.is_empty()).then(|| profile.sni.clone()),
                allow_insecure: profile.allow_insecure.then_some(true),
                alpn: (!profile.alpn.is_empty())
                    .then(|| profile.alpn.split(',').map(str::to_string).collect()),
                fingerprint: (!profile.fingerprint.is_empty())
                    .then(|| profile.fingerprint.clone()),
            });
        }
        SecurityKind::Reality => {
            ss.reality_settings = Some(XrayRealitySettings {
                server_name: (!profile.sni.is_empty()).then(|| profile.sni.clone()),
                fingerprint: (!profile.fingerprint.is_empty())
                    .then(|| profile.fingerprint.clone()),
                public_key: (!profile.public_key.is_empty())
                    .then(|| profile.public_key.clone()),
                short_id: (!profile.short_id.is_empty()).then(|| profile.short_id.clone()),
                spider_x: (!profile.spider_x.is_empty()).then(|| profile.spider_x.clone()),
            });
        }
        SecurityKind::None => {}
    }

    ss
}

fn build_routing(routing: &RoutingSet) -> XrayRouting {
    let mut rules = vec![XrayRule {
        kind: "field".to_string(),
        inbound_tag: Some(vec![API_INBOUND_TAG.to_string()]),
        outbound_tag: API_TAG.to_string(),
        ..XrayRule::default()
    }];

    for rule in routing.rules.iter().filter(|r| r.enabled) {
        let mut domain = rule.domain.clone();
        domain.extend(rule.domain_suffix.iter().map(|d| format!("domain:{}", d)));
        domain.extend(rule.domain_keyword.iter().map(|k| format!("keyword:{}", k)));
        domain.extend(rule.domain_regex.iter().map(|r| format!("regexp:{}", r)));
        domain.extend(rule.geosite.iter().map(|g| format!("geosite:{}", g)));

        let mut ip: Vec<String> = rule.geoip.iter().map(|g| format!("geoip:{}", g)).collect();
        ip.extend(rule.ip_cidr.iter().cloned());

        rules.push(XrayRule {
            kind: "field".to_string(),
            inbound_tag: None,
            outbound_tag: rule.outbound_tag.clone(),
            domain,
            ip,
            port: (!rule.port.is_empty()).then(|| rule.port.clone()),
            protocol: rule.protocol.clone(),
            network: (!rule.network.is_empty()).then(|| rule.network.clone()),
            rule_set: rule.rule_set.clone(),
        });
    }

    XrayRouting {
        domain_strategy: non_empty(&routing.domain_strategy, "AsIs"),
        rules,
    }
}

fn non_empty(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
