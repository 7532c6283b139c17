//! Routing rule sets.
//!
//! A [`RoutingSet`] is an ordered list of [`Rule`]s; order is significant
//! because the downstream engine evaluates rules first-match-wins. The codec
//! only translates rule predicates into engine field names; it never
//! evaluates them.

use serde::{Deserialize, Serialize};

use crate::profile::new_id;

/// An ordered, named set of routing rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutingSet {
    /// Opaque unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Domain resolution strategy (`AsIs`, `IPIfNonMatch`, ...).
    #[serde(default)]
    pub domain_strategy: String,
    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Whether this set is the active one.
    #[serde(default)]
    pub enabled: bool,
    /// Built-in presets may not be deleted by the store. The codec only
    /// preserves and re-emits this flag.
    #[serde(default)]
    pub locked: bool,
}

/// A single routing rule: an outbound tag plus match predicates. Empty
/// predicate lists are omitted from generated documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Opaque unique id.
    pub id: String,
    /// Target outbound tag (`proxy`, `direct`, `block`, ...).
    pub outbound_tag: String,
    /// Disabled rules are omitted entirely from generated documents.
    pub enabled: bool,
    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Exact domain matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<String>,
    /// Domain suffix matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_suffix: Vec<String>,
    /// Domain keyword matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_keyword: Vec<String>,
    /// Domain regex matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub domain_regex: Vec<String>,
    /// Geosite tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geosite: Vec<String>,
    /// IP CIDR matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_cidr: Vec<String>,
    /// GeoIP tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub geoip: Vec<String>,
    /// Port spec (`443`, `1000-2000`, comma-joined).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub port: String,
    /// L4/application protocol list (`http`, `tls`, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocol: Vec<String>,
    /// Process name matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub process_name: Vec<String>,
    /// Network spec (`tcp`, `udp`, `tcp,udp`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network: String,
    /// Externally-defined rule-set references, passed through verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_set: Vec<String>,
}

impl Rule {
    /// Returns an enabled rule targeting `outbound_tag`, with no predicates.
    pub fn new(outbound_tag: &str, name: &str) -> Rule {
        Rule {
            id: new_id(),
            outbound_tag: outbound_tag.to_string(),
            enabled: true,
            name: name.to_string(),
            ..Rule::default()
        }
    }
}

impl RoutingSet {
    /// Returns the four built-in presets: Global, BypassLAN, BypassCN,
    /// BypassLAN+CN (the last enabled by default).
    pub fn presets() -> Vec<RoutingSet> {
        vec![
            RoutingSet {
                id: new_id(),
                name: "Global".to_string(),
                domain_strategy: "AsIs".to_string(),
                locked: true,
                enabled: false,
                rules: vec![{
                    let mut r = Rule::new("proxy", "All traffic");
                    r.network = "tcp,udp".to_string();
                    r
                }],
            },
            RoutingSet {
                id: new_id(),
                name: "BypassLAN".to_string(),
                domain_strategy: "AsIs".to_string(),
                locked: true,
                enabled: false,
                rules: vec![
                    {
                        let mut r = Rule::new("direct", "Private IPs");
                        r.geoip = vec!["private".to_string()];
                        r
                    },
                    {
                        let mut r = Rule::new("proxy", "Remaining");
                        r.network = "tcp,udp".to_string();
                        r
                    },
                ],
            },
            RoutingSet {
                id: new_id(),
                name: "BypassCN".to_string(),
                domain_strategy: "IPIfNonMatch".to_string(),
                locked: true,
                enabled: false,
                rules: vec![
                    {
                        let mut r = Rule::new("direct", "CN sites");
                        r.geosite = vec!["cn".to_string()];
                        r
                    },
                    {
                        let mut r = Rule::new("direct", "CN IPs");
                        r.geoip = vec!["cn".to_string()];
                        r
                    },
                    {
                        let mut r = Rule::new("proxy", "Remaining");
                        r.network = "tcp,udp".to_string();
                        r
                    },
                ],
            },
            RoutingSet {
                id: new_id(),
                name: "BypassLAN+CN".to_string(),
                domain_strategy: "IPIfNonMatch".to_string(),
                locked: true,
                enabled: true,
                rules: vec![
                    {
                        let mut r = Rule::new("block", "Ads");
                        r.geosite = vec!["category-ads-all".to_string()];
                        r
                    },
                    {
                        let mut r = Rule::new("direct", "Private IPs");
                        r.geoip = vec!["private".to_string()];
                        r
                    },
                    {
                        let mut r = Rule::new("direct", "CN sites");
                        r.geosite = vec!["cn".to_string()];
                        r
                    },
                    {
                        let mut r = Rule::new("direct", "CN IPs");
                        r.geoip = vec!["cn".to_string()];
                        r
                    },
                    {
                        let mut r = Rule::new("proxy", "Remaining");
                        r.network = "tcp,udp".to_string();
                        r
                    },
                ],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_locked_and_ordered() {
        let presets = RoutingSet::presets();
        assert_eq!(presets.len(), 4);
        assert!(presets.iter().all(|p| p.locked));
        assert_eq!(presets[3].name, "BypassLAN+CN");
        assert!(presets[3].enabled);
        // Block-ads rule comes first in the default preset.
        assert_eq!(presets[3].rules[0].outbound_tag, "block");
    }
}
