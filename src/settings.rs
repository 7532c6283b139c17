//! DNS configuration and global generator settings.

use serde::{Deserialize, Serialize};

/// DNS configuration consumed by both generators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DnsConfig {
    /// Resolver used for proxied destinations.
    pub remote: String,
    /// Resolver used for direct destinations.
    pub direct: String,
    /// Plain resolver used to bootstrap the DoH resolvers.
    #[serde(default)]
    pub bootstrap: String,
    /// Honor the system hosts file. Preserved for the stores; neither
    /// generator consumes it currently.
    #[serde(default)]
    pub use_system_hosts: bool,
    /// Enable fake-IP resolution (sing-box only).
    #[serde(default)]
    pub fake_ip: bool,
    /// Resolution strategy (`prefer_ipv4`, ...).
    #[serde(default)]
    pub domain_strategy: String,
}

impl Default for DnsConfig {
    fn default() -> DnsConfig {
        DnsConfig {
            remote: "https://dns.google/dns-query".to_string(),
            direct: "https://dns.alidns.com/dns-query".to_string(),
            bootstrap: "1.1.1.1".to_string(),
            use_system_hosts: false,
            fake_ip: false,
            domain_strategy: "prefer_ipv4".to_string(),
        }
    }
}

/// One local inbound listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InboundSettings {
    /// Listener protocol (`socks`, `http`).
    pub protocol: String,
    /// Listen address; empty means loopback, `allow_lan` overrides to
    /// all interfaces.
    #[serde(default)]
    pub listen: String,
    /// Listen port.
    pub port: u16,
    /// Enable UDP relay (socks only).
    #[serde(default)]
    pub udp_enabled: bool,
    /// Enable destination sniffing.
    #[serde(default)]
    pub sniffing_enabled: bool,
    /// Expose the listener on all interfaces.
    #[serde(default)]
    pub allow_lan: bool,
}

/// TUN-mode settings (sing-box only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TunSettings {
    /// Emit a TUN inbound.
    #[serde(default)]
    pub enabled: bool,
    /// Auto-configure routes.
    pub auto_route: bool,
    /// Drop packets that bypass the tunnel.
    pub strict_route: bool,
    /// Network stack (`gvisor`, `system`, `mixed`).
    pub stack: String,
    /// Tunnel MTU.
    pub mtu: u32,
    /// Also assign an IPv6 tunnel address.
    #[serde(default)]
    pub enable_ipv6: bool,
}

/// Global settings handed to the generators alongside profile/routing/DNS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Engine log level.
    pub log_level: String,
    /// Local inbound listeners.
    pub inbounds: Vec<InboundSettings>,
    /// TUN mode.
    pub tun: TunSettings,
}

impl Default for GlobalSettings {
    fn default() -> GlobalSettings {
        GlobalSettings {
            log_level: "info".to_string(),
            inbounds: vec![
                InboundSettings {
                    protocol: "socks".to_string(),
                    listen: "127.0.0.1".to_string(),
                    port: 10808,
                    udp_enabled: true,
                    sniffing_enabled: true,
                    allow_lan: false,
                },
                InboundSettings {
                    protocol: "http".to_string(),
                    listen: "127.0.0.1".to_string(),
                    port: 10809,
                    udp_enabled: false,
                    sniffing_enabled: true,
                    allow_lan: false,
                },
            ],
            tun: TunSettings {
                enabled: false,
                auto_route: true,
                strict_route: true,
                stack: "gvisor".to_string(),
                mtu: 9000,
                enable_ipv6: false,
            },
        }
    }
}
