//! Subscription payload format detection.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};

use crate::constants::scheme;
use crate::error::Result;

/// The recognized shapes of a subscription payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Newline-delimited share links.
    UriLines,
    /// A single base64 blob wrapping share links.
    Base64,
    /// JSON object with an `outbounds` array (sing-box config dump).
    JsonOutbounds,
    /// JSON object with a `servers` array (SIP008).
    JsonSip008,
    /// YAML document with a `proxies` list (Clash).
    ClashYaml,
    /// None of the above.
    Unknown,
}

/// Classifies a payload. Pure and deterministic: identical input always
/// yields the same format.
///
/// Priority order: structured JSON (keyed on `outbounds` / `servers`),
/// Clash YAML marker, recognized scheme on the first line, permissive
/// base64, unknown.
pub fn detect_format(content: &str) -> SourceFormat {
    let trimmed = content.trim();

    if trimmed.starts_with('{') {
        if let Ok(obj) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(trimmed)
        {
            if obj.contains_key("outbounds") {
                return SourceFormat::JsonOutbounds;
            }
            if obj.contains_key("servers") {
                return SourceFormat::JsonSip008;
            }
        }
    }

    if looks_like_clash_yaml(trimmed) {
        return SourceFormat::ClashYaml;
    }

    if looks_like_uri_lines(trimmed) {
        return SourceFormat::UriLines;
    }

    if decode_base64_permissive(trimmed).is_ok() {
        return SourceFormat::Base64;
    }

    SourceFormat::Unknown
}

/// Base64-decodes with whitespace stripped, trying the standard, raw,
/// URL-safe, and raw-URL-safe alphabets in that order, then requiring
/// valid UTF-8.
pub(crate) fn decode_base64_permissive(s: &str) -> Result<String> {
    let cleaned: String = s.split_whitespace().collect();
    let bytes = STANDARD
        .decode(&cleaned)
        .or_else(|_| STANDARD_NO_PAD.decode(&cleaned))
        .or_else(|_| URL_SAFE.decode(&cleaned))
        .or_else(|_| URL_SAFE_NO_PAD.decode(&cleaned))?;
    Ok(String::from_utf8(bytes)?)
}

fn looks_like_clash_yaml(s: &str) -> bool {
    s.contains("proxies:") && (s.contains("- name:") || s.contains("- {name:"))
}

fn looks_like_uri_lines(s: &str) -> bool {
    let first = match s.lines().next() {
        Some(line) => line.trim(),
        None => return false,
    };
    scheme::ALL.iter().any(|prefix| first.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_is_deterministic() {
        let inputs = [
            "vless://u@h:443",
            "{\"outbounds\": []}",
            "random words that mean nothing!",
        ];
        for input in inputs {
            assert_eq!(detect_format(input), detect_format(input));
        }
    }

    #[test]
    fn detect_uri_lines() {
        let text = "vless://u@h:443#a\ntrojan://p@h:443#b";
        assert_eq!(detect_format(text), SourceFormat::UriLines);
    }

    #[test]
    fn detect_json_outbounds_and_sip008() {
        assert_eq!(
            detect_format(r#"{"outbounds": []}"#),
            SourceFormat::JsonOutbounds
        );
        assert_eq!(
            detect_format(r#"{"servers": []}"#),
            SourceFormat::JsonSip008
        );
    }

    #[test]
    fn detect_base64_wrapped_uri_list() {
        let list = "vless://u@h:443#a\ntrojan://p@h:443#b";
        let blob = base64::engine::general_purpose::STANDARD.encode(list);
        assert_eq!(detect_format(&blob), SourceFormat::Base64);
    }

    #[test]
    fn detect_clash_yaml() {
        let text = "proxies:\n  - name: test\n    type: ss\n";
        assert_eq!(detect_format(text), SourceFormat::ClashYaml);
    }

    #[test]
    fn detect_unknown_for_plain_text() {
        assert_eq!(
            detect_format("random words that mean nothing!"),
            SourceFormat::Unknown
        );
    }

    #[test]
    fn permissive_base64_accepts_url_safe() {
        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("a?b>c");
        assert_eq!(decode_base64_permissive(&encoded).unwrap(), "a?b>c");
    }
}
