//! sing-box configuration document generation.
//!
//! Mirrors the xray generator in shape: a strongly-typed document
//! (log / dns / inbounds / outbounds / route / experimental) serialized
//! generically at the boundary. sing-box spells predicates with snake_case
//! keys and keeps them as separate named arrays, so rules translate
//! field-for-field rather than collapsing into prefix strings.

use serde::Serialize;

use crate::constants::defaults;
use crate::profile::{Profile, ProtocolKind, SecurityKind, TransportKind};
use crate::routing::{Rule, RoutingSet};
use crate::settings::{DnsConfig, GlobalSettings};

/// Root of a sing-box configuration document.
#[derive(Debug, Serialize)]
pub struct SingboxConfig {
    pub log: SingboxLog,
    pub dns: SingboxDns,
    pub inbounds: Vec<SingboxInbound>,
    pub outbounds: Vec<SingboxOutbound>,
    pub route: SingboxRoute,
    pub experimental: SingboxExperimental,
}

impl SingboxConfig {
    /// Serializes the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `log` section.
#[derive(Debug, Serialize)]
pub struct SingboxLog {
    pub level: String,
    pub timestamp: bool,
}

/// `dns` section.
#[derive(Debug, Serialize)]
pub struct SingboxDns {
    pub servers: Vec<SingboxDnsServer>,
    pub rules: Vec<SingboxDnsRule>,
    #[serde(rename = "final")]
    pub final_server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fakeip: Option<SingboxFakeIp>,
}

/// One DNS server with its outbound detour.
#[derive(Debug, Serialize)]
pub struct SingboxDnsServer {
    pub tag: String,
    pub address: String,
    pub detour: String,
}

/// One DNS routing rule.
#[derive(Debug, Serialize)]
pub struct SingboxDnsRule {
    pub outbound: String,
    pub server: String,
}

/// Fake-IP pool configuration.
#[derive(Debug, Serialize)]
pub struct SingboxFakeIp {
    pub enabled: bool,
    pub inet4_range: String,
    pub inet6_range: String,
}

/// One inbound listener; the flat union covers tun and socket listeners.
#[derive(Debug, Default, Serialize)]
pub struct SingboxInbound {
    #[serde(rename = "type")]
    pub kind: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_port: Option<u16>,
    pub sniff: bool,
    pub sniff_override_destination: bool,
    // tun
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inet4_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inet6_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_route: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_route: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
}

/// One outbound, a union across the protocol families.
#[derive(Debug, Default, Serialize)]
pub struct SingboxOutbound {
    #[serde(rename = "type")]
    pub kind: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_port: Option<u16>,

    // vmess / vless / tuic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alter_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,

    // shadowsocks / trojan / hysteria2 / tuic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    // hysteria2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfs: Option<SingboxObfs>,

    // tuic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub congestion_control: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp_relay_mode: Option<String>,

    // wireguard
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_address: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<SingboxTls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<SingboxTransport>,
}

/// Hysteria2 salamander obfuscation.
#[derive(Debug, Serialize)]
pub struct SingboxObfs {
    #[serde(rename = "type")]
    pub kind: String,
    pub password: String,
}

/// Outbound TLS block.
#[derive(Debug, Default, Serialize)]
pub struct SingboxTls {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpn: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utls: Option<SingboxUtls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reality: Option<SingboxReality>,
}

/// uTLS fingerprint block.
#[derive(Debug, Serialize)]
pub struct SingboxUtls {
    pub enabled: bool,
    pub fingerprint: String,
}

/// Reality block.
#[derive(Debug, Serialize)]
pub struct SingboxReality {
    pub enabled: bool,
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
}

/// V2Ray-style transport block.
#[derive(Debug, Default, Serialize)]
pub struct SingboxTransport {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<SingboxHostHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

/// `headers: {Host: ...}` helper.
#[derive(Debug, Serialize)]
pub struct SingboxHostHeader {
    #[serde(rename = "Host")]
    pub host: String,
}

/// `route` section.
#[derive(Debug, Serialize)]
pub struct SingboxRoute {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<SingboxRule>,
    #[serde(rename = "final")]
    pub final_outbound: String,
    pub auto_detect_interface: bool,
}

/// One route rule; predicates stay as separate named arrays.
#[derive(Debug, Default, Serialize)]
pub struct SingboxRule {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain_suffix: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain_keyword: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domain_regex: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geosite: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub geoip: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_cidr: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub port: Vec<u16>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub port_range: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocol: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub process_name: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub network: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rule_set: Vec<String>,
    pub outbound: String,
}

/// `experimental` section.
#[derive(Debug, Serialize)]
pub struct SingboxExperimental {
    pub clash_api: SingboxClashApi,
    pub cache_file: SingboxCacheFile,
}

/// Clash-compatible control API.
#[derive(Debug, Serialize)]
pub struct SingboxClashApi {
    pub external_controller: String,
    pub secret: String,
}

/// On-disk cache (fake-IP persistence, selector state).
#[derive(Debug, Serialize)]
pub struct SingboxCacheFile {
    pub enabled: bool,
}

/// Compiles one profile plus routing/DNS/global settings into a sing-box
/// document. Total for well-formed input; fields that do not apply to the
/// profile's protocol are ignored.
pub fn generate(
    profile: &Profile,
    routing: &RoutingSet,
    dns: &DnsConfig,
    settings: &GlobalSettings,
) -> SingboxConfig {
    SingboxConfig {
        log: SingboxLog {
            level: if settings.log_level.is_empty() {
                "info".to_string()
            } else {
                settings.log_level.clone()
            },
            timestamp: true,
        },
        dns: build_dns(dns),
        inbounds: build_inbounds(settings),
        outbounds: build_outbounds(profile),
        route: build_route(routing),
        experimental: SingboxExperimental {
            clash_api: SingboxClashApi {
                external_controller: "127.0.0.1:9090".to_string(),
                secret: String::new(),
            },
            cache_file: SingboxCacheFile { enabled: true },
        },
    }
}

fn build_dns(dns: &DnsConfig) -> SingboxDns {
    let mut servers = vec![
        SingboxDnsServer {
            tag: "remote-dns".to_string(),
            address: dns.remote.clone(),
            detour: "proxy".to_string(),
        },
        SingboxDnsServer {
            tag: "direct-dns".to_string(),
            address: dns.direct.clone(),
            detour: "direct".to_string(),
        },
    ];
    if !dns.bootstrap.is_empty() {
        servers.push(SingboxDnsServer {
            tag: "bootstrap-dns".to_string(),
            address: dns.bootstrap.clone(),
            detour: "direct".to_string(),
        });
    }
    SingboxDns {
        servers,
        // Resolver hostnames themselves resolve directly, else the remote
        // resolver deadlocks on its own bootstrap.
        rules: vec![SingboxDnsRule {
            outbound: "any".to_string(),
            server: "direct-dns".to_string(),
        }],
        final_server: "remote-dns".to_string(),
        strategy: (!dns.domain_strategy.is_empty()).then(|| dns.domain_strategy.clone()),
        fakeip: dns.fake_ip.then(|| SingboxFakeIp {
            enabled: true,
            inet4_range: "198.18.0.0/15".to_string(),
            inet6_range: "fc00::/18".to_string(),
        }),
    }
}

fn build_inbounds(settings: &GlobalSettings) -> Vec<SingboxInbound> {
    let mut inbounds = Vec::new();

    if settings.tun.enabled {
        inbounds.push(SingboxInbound {
            kind: "tun".to_string(),
            tag: "tun-in".to_string(),
            sniff: true,
            sniff_override_destination: false,
            inet4_address: Some("172.19.0.1/30".to_string()),
            inet6_address: settings
                .tun
                .enable_ipv6
                .then(|| "fdfe:dcba:9876::1/126".to_string()),
            auto_route: Some(settings.tun.auto_route),
            strict_route: Some(settings.tun.strict_route),
            stack: Some(settings.tun.stack.clone()),
            mtu: Some(settings.tun.mtu),
            ..SingboxInbound::default()
        });
    }

    for ib in &settings.inbounds {
        let listen = if ib.allow_lan {
            "0.0.0.0".to_string()
        } else if ib.listen.is_empty() {
            "127.0.0.1".to_string()
        } else {
            ib.listen.clone()
        };
        // Socket listeners are always mixed; the tag keeps the configured
        // protocol so rules can still tell them apart.
        inbounds.push(SingboxInbound {
            kind: "mixed".to_string(),
            tag: format!("{}-in", ib.protocol),
            listen: Some(listen),
            listen_port: Some(ib.port),
            sniff: ib.sniffing_enabled,
            sniff_override_destination: false,
            ..SingboxInbound::default()
        });
    }

    inbounds
}

fn build_outbounds(profile: &Profile) -> Vec<SingboxOutbound> {
    vec![
        build_proxy_outbound(profile),
        SingboxOutbound {
            kind: "direct".to_string(),
            tag: "direct".to_string(),
            ..SingboxOutbound::default()
        },
        SingboxOutbound {
            kind: "block".to_string(),
            tag: "block".to_string(),
            ..SingboxOutbound::default()
        },
        SingboxOutbound {
            kind: "dns".to_string(),
            tag: "dns-out".to_string(),
            ..SingboxOutbound::default()
        },
    ]
}

fn build_proxy_outbound(profile: &Profile) -> SingboxOutbound {
    let mut ob = SingboxOutbound {
        kind: profile.kind.as_str().to_string(),
        tag: "proxy".to_string(),
        server: Some(profile.host.clone()),
        server_port: Some(profile.port),
        ..SingboxOutbound::default()
    };

    match profile.kind {
        ProtocolKind::Vmess => {
            ob.uuid = Some(profile.uuid.clone());
            ob.alter_id = Some(profile.alter_id);
            ob.security = Some(if profile.method.is_empty() {
                defaults::VMESS_SECURITY.to_string()
            } else {
                profile.method.clone()
            });
        }
        ProtocolKind::Vless => {
            ob.uuid = Some(profile.uuid.clone());
            ob.flow = (!profile.flow.is_empty()).then(|| profile.flow.clone());
        }
        ProtocolKind::Trojan => {
            ob.password = Some(profile.secret.clone());
        }
        ProtocolKind::Shadowsocks => {
            ob.method = Some(profile.method.clone());
            ob.password = Some(profile.secret.clone());
        }
        ProtocolKind::Socks | ProtocolKind::Http => {
            // Chained local proxies; credentials are optional.
            if !profile.uuid.is_empty() {
                ob.uuid = Some(profile.uuid.clone());
            }
            if !profile.secret.is_empty() {
                ob.password = Some(profile.secret.clone());
            }
        }
        ProtocolKind::Hysteria2 => {
            ob.password = Some(profile.secret.clone());
            if !profile.header_type.is_empty() {
                ob.obfs = Some(SingboxObfs {
                    kind: profile.header_type.clone(),
                    password: profile.path.clone(),
                });
            }
        }
        ProtocolKind::Tuic => {
            ob.uuid = Some(profile.uuid.clone());
            ob.password = Some(profile.secret.clone());
            ob.congestion_control =
                (!profile.header_type.is_empty()).then(|| profile.header_type.clone());
            ob.udp_relay_mode = Some(if profile.path.is_empty() {
                defaults::TUIC_UDP_RELAY.to_string()
            } else {
                profile.path.clone()
            });
        }
        ProtocolKind::Wireguard => {
            ob.private_key = Some(profile.secret.clone());
            ob.peer_public_key = Some(profile.public_key.clone());
            let addresses: Vec<String> = profile
                .host_header
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
            if !addresses.is_empty() {
                ob.local_address = Some(addresses);
            }
            let reserved: Vec<i64> = profile
                .short_id
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if !reserved.is_empty() {
                ob.reserved = Some(reserved);
            }
            if let Ok(mtu) = profile.extra.parse() {
                ob.mtu = Some(mtu);
            }
            // The tunnel is its own framing: no tls or transport block.
            return ob;
        }
    }

    match profile.security {
        SecurityKind::Tls | SecurityKind::Reality => {
            ob.tls = Some(build_tls(profile));
        }
        SecurityKind::None => {}
    }

    // Hysteria2/TUIC keep their own QUIC framing.
    if profile.kind != ProtocolKind::Hysteria2 && profile.kind != ProtocolKind::Tuic {
        ob.transport = build_transport(profile);
    }

    ob
}

fn build_tls(profile: &Profile) -> SingboxTls {
    SingboxTls {
        enabled: true,
        server_name: (!profile.sni.is_empty()).then(|| profile.sni.clone()),
        insecure: profile.allow_insecure.then_some(true),
        alpn: (!profile.alpn.is_empty())
            .then(|| profile.alpn.split(',').map(str::to_string).collect()),
        utls: (!profile.fingerprint.is_empty()).then(|| SingboxUtls {
            enabled: true,
            fingerprint: profile.fingerprint.clone(),
        }),
        reality: (profile.security == SecurityKind::Reality).then(|| SingboxReality {
            enabled: true,
            public_key: profile.public_key.clone(),
            short_id: (!profile.short_id.is_empty()).then(|| profile.short_id.clone()),
        }),
    }
}

fn build_transport(profile: &Profile) -> Option<SingboxTransport> {
    match profile.transport {
        TransportKind::Ws => Some(SingboxTransport {
            kind: "ws".to_string(),
            path: (!profile.path.is_empty()).then(|| profile.path.clone()),
            headers: (!profile.host_header.is_empty()).then(|| SingboxHostHeader {
                host: profile.host_header.clone(),
            }),
            ..SingboxTransport::default()
        }),
        TransportKind::Http2 => Some(SingboxTransport {
            kind: "http".to_string(),
            host: (!profile.host_header.is_empty())
                .then(|| profile.host_header.split(',').map(str::to_string).collect()),
            path: (!profile.path.is_empty()).then(|| profile.path.clone()),
            ..SingboxTransport::default()
        }),
        TransportKind::Grpc => Some(SingboxTransport {
            kind: "grpc".to_string(),
            service_name: (!profile.path.is_empty()).then(|| profile.path.clone()),
            ..SingboxTransport::default()
        }),
        TransportKind::HttpUpgrade => Some(SingboxTransport {
            kind: "httpupgrade".to_string(),
            host: (!profile.host_header.is_empty()).then(|| vec![profile.host_header.clone()]),
            path: (!profile.path.is_empty()).then(|| profile.path.clone()),
            ..SingboxTransport::default()
        }),
        // mKCP has no sing-box transport; tcp needs no block.
        TransportKind::Tcp | TransportKind::Kcp | TransportKind::Wireguard => None,
    }
}

fn build_route(routing: &RoutingSet) -> SingboxRoute {
    SingboxRoute {
        rules: routing
            .rules
            .iter()
            .filter(|r| r.enabled)
            .map(rule_to_singbox)
            .collect(),
        final_outbound: "proxy".to_string(),
        auto_detect_interface: true,
    }
}

fn rule_to_singbox(rule: &Rule) -> SingboxRule {
    let mut port = Vec::new();
    let mut port_range = Vec::new();
    for spec in rule.port.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Some((lo, hi)) = spec.split_once('-') {
            port_range.push(format!("{}:{}", lo.trim(), hi.trim()));
        } else if let Ok(n) = spec.parse() {
            port.push(n);
        }
    }

    SingboxRule {
        domain: rule.domain.clone(),
        domain_suffix: rule.domain_suffix.clone(),
        domain_keyword: rule.domain_keyword.clone(),
        domain_regex: rule.domain_regex.clone(),
        geosite: rule.geosite.clone(),
        geoip: rule.geoip.clone(),
        ip_cidr: rule.ip_cidr.clone(),
        port,
        port_range,
        protocol: rule.protocol.clone(),
        process_name: rule.process_name.clone(),
        network: rule
            .network
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        rule_set: rule.rule_set.clone(),
        outbound: rule.outbound_tag.clone(),
    }
}
