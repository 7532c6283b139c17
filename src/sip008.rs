//! SIP008 JSON subscription decoding.
//!
//! A SIP008 document is `{"servers": [...]}` where each entry describes one
//! Shadowsocks server (`id`, `remarks`, `server`, `server_port`,
//! `password`, `method`).

use serde::Deserialize;

use crate::error::Result;
use crate::profile::{Profile, ProtocolKind};

#[derive(Debug, Deserialize)]
struct Sip008Document {
    #[serde(default)]
    servers: Vec<Sip008Server>,
}

#[derive(Debug, Deserialize)]
struct Sip008Server {
    #[serde(default)]
    remarks: String,
    #[serde(default)]
    server: String,
    #[serde(default)]
    server_port: u16,
    #[serde(default)]
    password: String,
    #[serde(default)]
    method: String,
}

/// Decodes a SIP008 document into one Shadowsocks profile per server.
/// A malformed outer document is the only fatal error.
pub(crate) fn decode(content: &str) -> Result<Vec<Profile>> {
    let doc: Sip008Document = serde_json::from_str(content)?;
    Ok(doc
        .servers
        .into_iter()
        .map(|s| {
            let mut p = Profile::new(ProtocolKind::Shadowsocks);
            p.name = s.remarks;
            p.host = s.server;
            p.port = s.server_port;
            p.secret = s.password;
            p.method = s.method;
            p
        })
        .collect())
}
