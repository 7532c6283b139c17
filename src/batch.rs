//! Subscription batch decoding.
//!
//! [`decode_batch`] accepts whatever a subscription endpoint returned,
//! classifies it with [`detect_format`], and produces zero or more
//! profiles. Individual malformed entries inside a valid container are
//! dropped (subscription sources routinely mix supported and unsupported
//! entries); only a container that fails to parse at all is an error.

use tracing::debug;

use crate::clash;
use crate::detect::{SourceFormat, decode_base64_permissive, detect_format};
use crate::error::Result;
use crate::profile::Profile;
use crate::sip008;
use crate::singbox_import;
use crate::uri::decode_uri;

/// Decodes a subscription payload into profiles.
///
/// Dispatches on the detected format. Base64 payloads are decoded once and
/// then line-split directly; detection is not re-run on the decoded text,
/// so nested base64 cannot recurse.
pub fn decode_batch(text: &str) -> Result<Vec<Profile>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    match detect_format(text) {
        SourceFormat::JsonOutbounds => singbox_import::decode(text),
        SourceFormat::JsonSip008 => sip008::decode(text),
        SourceFormat::ClashYaml => clash::decode(text),
        SourceFormat::Base64 => {
            let decoded = decode_base64_permissive(text)?;
            Ok(decode_lines(&decoded))
        }
        SourceFormat::UriLines | SourceFormat::Unknown => Ok(decode_lines(text)),
    }
}

/// Decodes newline-delimited share links, dropping lines that fail. The
/// skip policy is a visible filter over per-line results, not silent
/// accumulation.
fn decode_lines(text: &str) -> Vec<Profile> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match decode_uri(line) {
            Ok(profile) => Some(profile),
            Err(err) => {
                debug!(%err, line, "dropping unparsable subscription line");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProtocolKind;
    use base64::Engine;

    #[test]
    fn empty_input_yields_no_profiles() {
        assert!(decode_batch("").unwrap().is_empty());
        assert!(decode_batch("  \n \n").unwrap().is_empty());
    }

    #[test]
    fn bad_lines_are_dropped_not_fatal() {
        let text = "vless://u@h:443#ok\nnot a uri at all\ntrojan://p@h:443#also-ok";
        let profiles = decode_batch(text).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].kind, ProtocolKind::Vless);
        assert_eq!(profiles[1].kind, ProtocolKind::Trojan);
    }

    #[test]
    fn base64_payload_is_unwrapped_then_line_split() {
        let list = "vless://u@h:443#a\ntrojan://p@h:443#b\n";
        let blob = base64::engine::general_purpose::STANDARD.encode(list);
        let profiles = decode_batch(&blob).unwrap();
        assert_eq!(profiles.len(), 2);
        // Result order matches input line order.
        assert_eq!(profiles[0].name, "a");
        assert_eq!(profiles[1].name, "b");
    }

    #[test]
    fn sip008_servers_become_shadowsocks_profiles() {
        let doc = r#"{
            "version": 1,
            "servers": [
                {"id": "x", "remarks": "jp-1", "server": "1.2.3.4",
                 "server_port": 8388, "password": "pw", "method": "aes-256-gcm"}
            ]
        }"#;
        let profiles = decode_batch(doc).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].kind, ProtocolKind::Shadowsocks);
        assert_eq!(profiles[0].method, "aes-256-gcm");
        assert_eq!(profiles[0].secret, "pw");
        assert_eq!(profiles[0].port, 8388);
    }

    #[test]
    fn singbox_dump_maps_recognized_outbounds_only() {
        let doc = r#"{
            "outbounds": [
                {"type": "selector", "tag": "select", "outbounds": ["a"]},
                {"type": "vmess", "tag": "a", "server": "v.example", "server_port": 443,
                 "uuid": "uuid-1", "alter_id": 0, "security": "auto",
                 "transport": {"type": "ws", "path": "/ws", "host": "v.example"},
                 "tls": {"enabled": true, "server_name": "v.example"}},
                {"type": "direct", "tag": "direct"}
            ]
        }"#;
        let profiles = decode_batch(doc).unwrap();
        assert_eq!(profiles.len(), 1);
        let p = &profiles[0];
        assert_eq!(p.kind, ProtocolKind::Vmess);
        assert_eq!(p.transport, crate::profile::TransportKind::Ws);
        assert_eq!(p.path, "/ws");
        assert_eq!(p.security, crate::profile::SecurityKind::Tls);
        assert_eq!(p.sni, "v.example");
    }

    #[test]
    fn clash_proxies_translate_option_blocks() {
        let doc = r#"
proxies:
  - name: tokyo
    type: vmess
    server: jp.example
    port: 443
    uuid: uuid-2
    alterId: 0
    cipher: auto
    tls: true
    servername: jp.example
    network: ws
    ws-opts:
      path: /ws
      headers:
        Host: jp.example
  - name: mystery
    type: snell
    server: x
    port: 1
"#;
        let profiles = decode_batch(doc).unwrap();
        assert_eq!(profiles.len(), 1);
        let p = &profiles[0];
        assert_eq!(p.kind, ProtocolKind::Vmess);
        assert_eq!(p.transport, crate::profile::TransportKind::Ws);
        assert_eq!(p.path, "/ws");
        assert_eq!(p.host_header, "jp.example");
        assert_eq!(p.sni, "jp.example");
    }

    #[test]
    fn broken_container_is_fatal() {
        // Clash markers present but the document itself cannot parse
        // (unclosed flow mapping): the whole batch fails.
        let yaml = "proxies:\n  - {name: x, type: ss";
        assert!(decode_batch(yaml).is_err());
    }

    #[test]
    fn unparsable_json_falls_through_to_empty_batch() {
        // Broken JSON never passes the detection probe, carries no scheme,
        // and is not base64, so it lands in the unknown bucket and yields
        // an empty batch rather than an error.
        let text = "{\"outbounds\": [broken";
        assert!(decode_batch(text).unwrap().is_empty());
    }
}
