//! # Proxy Codec
//!
//! A Rust library for decoding proxy share links and subscription payloads
//! into a canonical profile model, and compiling profiles into runnable
//! xray-core and sing-box configuration documents.
//!
//! ## Features
//!
//! - Decode share links for VMess, VLESS, Trojan, Shadowsocks, Hysteria2,
//!   TUIC, and WireGuard into one [`Profile`] type
//! - Re-encode profiles back into share links
//! - Decode whole subscription payloads: newline-delimited links, base64
//!   blobs, sing-box config dumps, SIP008 JSON, Clash YAML
//! - Compile a profile plus routing rules, DNS, and listener settings into
//!   an xray or sing-box JSON document
//!
//! ## Decoding rules (unified)
//!
//! - **Scheme prefix**: case-insensitive; `hy2://` and `wg://` are accepted
//!   aliases for `hysteria2://` and `wireguard://`.
//! - **Leniency**: a structurally valid link with missing pieces still
//!   decodes (empty host, port 0). Only an unsupported scheme, broken
//!   percent-encoding, or an undecodable base64/JSON body is an error.
//!   [`Profile::validate`] exists for user-constructed profiles.
//! - **Batches**: inside a valid container, entries that fail to decode are
//!   dropped; only a container that fails to parse at all is an error.
//!
//! ## Example
//!
//! ```rust
//! use proxy_codec::{DnsConfig, GlobalSettings, RoutingSet, decode_uri, xray_config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let profile = decode_uri("vless://uuid-123@example.com:443?security=tls&sni=example.com#node")?;
//! assert_eq!(profile.host, "example.com");
//!
//! let routing = RoutingSet::presets().into_iter().find(|r| r.enabled).unwrap();
//! let config = xray_config::generate(
//!     &profile,
//!     &routing,
//!     &DnsConfig::default(),
//!     &GlobalSettings::default(),
//! );
//! let json = config.to_json_pretty()?;
//! # let _ = json;
//! # Ok(())
//! # }
//! ```

mod batch;
mod clash;
mod constants;
mod detect;
mod error;
mod hysteria2;
mod profile;
mod routing;
mod settings;
mod shadowsocks;
pub mod singbox_config;
mod singbox_import;
mod sip008;
mod trojan;
mod tuic;
mod uri;
mod vless;
mod vmess;
mod wireguard;
pub mod xray_config;

#[cfg(test)]
mod generator_tests;

pub use batch::decode_batch;
pub use detect::{SourceFormat, detect_format};
pub use error::{DecodeError, EncodeError, Result};
pub use profile::{EngineKind, Profile, ProtocolKind, SecurityKind, TransportKind};
pub use routing::{Rule, RoutingSet};
pub use settings::{DnsConfig, GlobalSettings, InboundSettings, TunSettings};
pub use uri::{decode_uri, encode_uri};
