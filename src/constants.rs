//! Shared constants for URI schemes and protocol defaults.

/// Share-link URI scheme prefixes (lowercase, with `://`).
pub mod scheme {
    /// VMess: `vmess://`
    pub const VMESS: &str = "vmess://";
    /// VLESS: `vless://`
    pub const VLESS: &str = "vless://";
    /// Trojan: `trojan://`
    pub const TROJAN: &str = "trojan://";
    /// Shadowsocks: `ss://`
    pub const SHADOWSOCKS: &str = "ss://";
    /// Hysteria2: `hysteria2://`
    pub const HYSTERIA2: &str = "hysteria2://";
    /// Hysteria2 short alias: `hy2://`
    pub const HYSTERIA2_SHORT: &str = "hy2://";
    /// TUIC: `tuic://`
    pub const TUIC: &str = "tuic://";
    /// WireGuard: `wireguard://`
    pub const WIREGUARD: &str = "wireguard://";
    /// WireGuard short alias: `wg://`
    pub const WIREGUARD_SHORT: &str = "wg://";

    /// All recognized prefixes, used by format detection.
    pub const ALL: &[&str] = &[
        VMESS,
        VLESS,
        TROJAN,
        SHADOWSOCKS,
        HYSTERIA2,
        HYSTERIA2_SHORT,
        TUIC,
        WIREGUARD,
        WIREGUARD_SHORT,
    ];
}

/// Protocol-level default values, omitted from generated share links.
pub mod defaults {
    /// Default VMess cipher when `scy` is absent.
    pub const VMESS_SECURITY: &str = "auto";
    /// Default VLESS encryption.
    pub const VLESS_ENCRYPTION: &str = "none";
    /// Default TUIC UDP relay mode.
    pub const TUIC_UDP_RELAY: &str = "native";
}
