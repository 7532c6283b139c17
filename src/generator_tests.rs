//! Generated-document shape tests for both engines: rule counts and
//! ordering, predicate translation, transport/TLS blocks, and the
//! WireGuard no-transport/no-TLS rule. Assertions go through
//! `serde_json::to_value` so they check the serialized shape, not the
//! Rust structs.

#![cfg(test)]

use serde_json::{Value, json};

use crate::profile::{EngineKind, Profile, ProtocolKind, SecurityKind, TransportKind};
use crate::routing::{Rule, RoutingSet};
use crate::settings::{DnsConfig, GlobalSettings};
use crate::{singbox_config, xray_config};

fn routing_with(rules: Vec<Rule>) -> RoutingSet {
    RoutingSet {
        id: "rs-1".to_string(),
        name: "test".to_string(),
        domain_strategy: "IPIfNonMatch".to_string(),
        rules,
        enabled: true,
        locked: false,
    }
}

fn vless_reality_profile() -> Profile {
    let mut p = Profile::new(ProtocolKind::Vless);
    p.name = "reality-node".to_string();
    p.host = "h.example".to_string();
    p.port = 443;
    p.uuid = "test-uuid".to_string();
    p.security = SecurityKind::Reality;
    p.sni = "cam.example".to_string();
    p.fingerprint = "chrome".to_string();
    p.public_key = "pubkey123".to_string();
    p.short_id = "ab12".to_string();
    p
}

fn wireguard_profile() -> Profile {
    let mut p = Profile::new(ProtocolKind::Wireguard);
    p.engine = EngineKind::Singbox;
    p.host = "wg.example".to_string();
    p.port = 51820;
    p.secret = "privkey".to_string();
    p.public_key = "pubkey".to_string();
    p.host_header = "10.0.0.2/32,fd00::2/128".to_string();
    p.short_id = "1,2,3".to_string();
    p.extra = "1380".to_string();
    p.transport = TransportKind::Wireguard;
    p.security = SecurityKind::None;
    p
}

fn xray_json(profile: &Profile, routing: &RoutingSet) -> Value {
    let cfg = xray_config::generate(profile, routing, &DnsConfig::default(), &GlobalSettings::default());
    serde_json::to_value(&cfg).unwrap()
}

fn singbox_json(profile: &Profile, routing: &RoutingSet) -> Value {
    let cfg =
        singbox_config::generate(profile, routing, &DnsConfig::default(), &GlobalSettings::default());
    serde_json::to_value(&cfg).unwrap()
}

// =============================================================================
// Rule counts and ordering
// =============================================================================

#[test]
fn xray_rule_count_is_enabled_plus_api_rule() {
    let mut disabled = Rule::new("direct", "off");
    disabled.enabled = false;
    let routing = routing_with(vec![
        Rule::new("proxy", "a"),
        Rule::new("block", "b"),
        disabled,
    ]);
    let v = xray_json(&vless_reality_profile(), &routing);

    let rules = v["routing"]["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 3);
    assert_eq!(rules[0]["type"], "field");
    assert_eq!(rules[0]["inboundTag"], json!(["api-in"]));
    assert_eq!(rules[0]["outboundTag"], "api");
    assert_eq!(rules[1]["outboundTag"], "proxy");
    assert_eq!(rules[2]["outboundTag"], "block");
    assert_eq!(v["routing"]["domainStrategy"], "IPIfNonMatch");
}

#[test]
fn singbox_rule_count_is_enabled_only() {
    let mut disabled = Rule::new("direct", "off");
    disabled.enabled = false;
    let routing = routing_with(vec![
        Rule::new("proxy", "a"),
        Rule::new("block", "b"),
        disabled,
    ]);
    let v = singbox_json(&vless_reality_profile(), &routing);

    let rules = v["route"]["rules"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["outbound"], "proxy");
    assert_eq!(rules[1]["outbound"], "block");
    assert_eq!(v["route"]["final"], "proxy");
    assert_eq!(v["route"]["auto_detect_interface"], true);
}

#[test]
fn singbox_omits_empty_rule_list() {
    let routing = routing_with(Vec::new());
    let v = singbox_json(&vless_reality_profile(), &routing);
    assert!(v["route"].get("rules").is_none());
}

// =============================================================================
// Predicate translation
// =============================================================================

#[test]
fn xray_collapses_domain_predicates_into_prefixes() {
    let mut rule = Rule::new("direct", "cn");
    rule.domain = vec!["exact.example".to_string()];
    rule.domain_suffix = vec!["x.com".to_string()];
    rule.domain_keyword = vec!["google".to_string()];
    rule.domain_regex = vec![r".*\.cn$".to_string()];
    rule.geosite = vec!["cn".to_string()];
    rule.geoip = vec!["cn".to_string()];
    rule.ip_cidr = vec!["10.0.0.0/8".to_string()];
    rule.port = "443".to_string();
    rule.network = "tcp,udp".to_string();
    let v = xray_json(&vless_reality_profile(), &routing_with(vec![rule]));

    let r = &v["routing"]["rules"][1];
    assert_eq!(
        r["domain"],
        json!([
            "exact.example",
            "domain:x.com",
            "keyword:google",
            r"regexp:.*\.cn$",
            "geosite:cn"
        ])
    );
    assert_eq!(r["ip"], json!(["geoip:cn", "10.0.0.0/8"]));
    assert_eq!(r["port"], "443");
    assert_eq!(r["network"], "tcp,udp");
}

#[test]
fn singbox_keeps_predicates_as_named_arrays() {
    let mut rule = Rule::new("direct", "cn");
    rule.domain_suffix = vec!["x.com".to_string()];
    rule.domain_keyword = vec!["google".to_string()];
    rule.geosite = vec!["cn".to_string()];
    rule.geoip = vec!["cn".to_string()];
    rule.ip_cidr = vec!["10.0.0.0/8".to_string()];
    rule.port = "443,1000-2000".to_string();
    rule.network = "tcp,udp".to_string();
    let v = singbox_json(&vless_reality_profile(), &routing_with(vec![rule]));

    let r = &v["route"]["rules"][0];
    assert_eq!(r["domain_suffix"], json!(["x.com"]));
    assert_eq!(r["domain_keyword"], json!(["google"]));
    assert_eq!(r["geosite"], json!(["cn"]));
    assert_eq!(r["geoip"], json!(["cn"]));
    assert_eq!(r["ip_cidr"], json!(["10.0.0.0/8"]));
    assert_eq!(r["port"], json!([443]));
    assert_eq!(r["port_range"], json!(["1000:2000"]));
    assert_eq!(r["network"], json!(["tcp", "udp"]));
}

#[test]
fn rule_set_references_pass_through_in_both_engines() {
    let mut rule = Rule::new("proxy", "external");
    rule.rule_set = vec!["geosite-netflix".to_string()];
    let routing = routing_with(vec![rule]);

    let x = xray_json(&vless_reality_profile(), &routing);
    assert_eq!(x["routing"]["rules"][1]["ruleSet"], json!(["geosite-netflix"]));

    let s = singbox_json(&vless_reality_profile(), &routing);
    assert_eq!(s["route"]["rules"][0]["rule_set"], json!(["geosite-netflix"]));
}

// =============================================================================
// Outbounds
// =============================================================================

#[test]
fn vless_reality_appears_in_both_documents() {
    let profile = vless_reality_profile();
    let routing = routing_with(vec![Rule::new("proxy", "all")]);

    let x = xray_json(&profile, &routing);
    let ob = &x["outbounds"][0];
    assert_eq!(ob["tag"], "proxy");
    assert_eq!(ob["protocol"], "vless");
    assert_eq!(ob["settings"]["vnext"][0]["users"][0]["id"], "test-uuid");
    assert_eq!(ob["settings"]["vnext"][0]["users"][0]["encryption"], "none");
    let reality = &ob["streamSettings"]["realitySettings"];
    assert_eq!(reality["publicKey"], "pubkey123");
    assert_eq!(reality["shortId"], "ab12");
    assert_eq!(reality["serverName"], "cam.example");
    assert_eq!(ob["streamSettings"]["security"], "reality");

    let s = singbox_json(&profile, &routing);
    let ob = &s["outbounds"][0];
    assert_eq!(ob["type"], "vless");
    assert_eq!(ob["tag"], "proxy");
    assert_eq!(ob["uuid"], "test-uuid");
    assert_eq!(ob["tls"]["enabled"], true);
    assert_eq!(ob["tls"]["reality"]["public_key"], "pubkey123");
    assert_eq!(ob["tls"]["reality"]["short_id"], "ab12");
    assert_eq!(ob["tls"]["utls"]["fingerprint"], "chrome");
}

#[test]
fn wireguard_outbound_has_no_transport_or_tls_in_either_engine() {
    let profile = wireguard_profile();
    let routing = routing_with(vec![Rule::new("proxy", "all")]);

    let x = xray_json(&profile, &routing);
    let ob = &x["outbounds"][0];
    assert_eq!(ob["protocol"], "wireguard");
    assert!(ob.get("streamSettings").is_none());
    assert_eq!(ob["settings"]["secretKey"], "privkey");
    assert_eq!(ob["settings"]["address"], json!(["10.0.0.2/32", "fd00::2/128"]));
    assert_eq!(ob["settings"]["peers"][0]["publicKey"], "pubkey");
    assert_eq!(ob["settings"]["peers"][0]["endpoint"], "wg.example:51820");
    assert_eq!(ob["settings"]["reserved"], json!([1, 2, 3]));
    assert_eq!(ob["settings"]["mtu"], 1380);

    let s = singbox_json(&profile, &routing);
    let ob = &s["outbounds"][0];
    assert_eq!(ob["type"], "wireguard");
    assert!(ob.get("tls").is_none());
    assert!(ob.get("transport").is_none());
    assert_eq!(ob["private_key"], "privkey");
    assert_eq!(ob["peer_public_key"], "pubkey");
    assert_eq!(ob["local_address"], json!(["10.0.0.2/32", "fd00::2/128"]));
    // Reserved entry count matches the comma-joined source.
    let reserved = ob["reserved"].as_array().unwrap();
    assert_eq!(reserved.len(), profile.short_id.split(',').count());
    assert_eq!(ob["mtu"], 1380);
}

#[test]
fn fixed_outbounds_follow_the_proxy() {
    let routing = routing_with(Vec::new());

    let x = xray_json(&vless_reality_profile(), &routing);
    let tags: Vec<&str> = x["outbounds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["tag"].as_str().unwrap())
        .collect();
    assert_eq!(tags, ["proxy", "direct", "block"]);
    assert_eq!(x["outbounds"][2]["settings"]["response"]["type"], "none");

    let s = singbox_json(&vless_reality_profile(), &routing);
    let tags: Vec<&str> = s["outbounds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["tag"].as_str().unwrap())
        .collect();
    assert_eq!(tags, ["proxy", "direct", "block", "dns-out"]);
}

#[test]
fn singbox_hysteria2_obfs_and_tuic_relay_defaults() {
    let routing = routing_with(Vec::new());

    let mut hy2 = Profile::new(ProtocolKind::Hysteria2);
    hy2.host = "h".to_string();
    hy2.port = 443;
    hy2.secret = "pw".to_string();
    hy2.header_type = "salamander".to_string();
    hy2.path = "op".to_string();
    hy2.security = SecurityKind::Tls;
    let v = singbox_json(&hy2, &routing);
    assert_eq!(v["outbounds"][0]["obfs"]["type"], "salamander");
    assert_eq!(v["outbounds"][0]["obfs"]["password"], "op");
    // QUIC-native protocols never get a v2ray transport block.
    assert!(v["outbounds"][0].get("transport").is_none());

    hy2.header_type = String::new();
    let v = singbox_json(&hy2, &routing);
    assert!(v["outbounds"][0].get("obfs").is_none());

    let mut tuic = Profile::new(ProtocolKind::Tuic);
    tuic.host = "t".to_string();
    tuic.port = 443;
    tuic.uuid = "u".to_string();
    tuic.secret = "pw".to_string();
    tuic.security = SecurityKind::Tls;
    let v = singbox_json(&tuic, &routing);
    assert_eq!(v["outbounds"][0]["udp_relay_mode"], "native");
    assert!(v["outbounds"][0].get("congestion_control").is_none());
}

#[test]
fn xray_ws_transport_block() {
    let mut p = Profile::new(ProtocolKind::Vmess);
    p.host = "h".to_string();
    p.port = 443;
    p.uuid = "u".to_string();
    p.transport = TransportKind::Ws;
    p.path = "/ws".to_string();
    p.host_header = "cdn.example".to_string();
    p.security = SecurityKind::Tls;
    p.sni = "h".to_string();
    let v = xray_json(&p, &routing_with(Vec::new()));

    let ss = &v["outbounds"][0]["streamSettings"];
    assert_eq!(ss["network"], "ws");
    assert_eq!(ss["wsSettings"]["path"], "/ws");
    assert_eq!(ss["wsSettings"]["headers"]["Host"], "cdn.example");
    assert_eq!(ss["tlsSettings"]["serverName"], "h");
    assert_eq!(v["outbounds"][0]["settings"]["vnext"][0]["users"][0]["alterId"], 0);
}

// =============================================================================
// Inbounds, DNS, and ambient sections
// =============================================================================

#[test]
fn xray_injects_api_inbound_before_listeners() {
    let v = xray_json(&vless_reality_profile(), &routing_with(Vec::new()));
    let inbounds = v["inbounds"].as_array().unwrap();
    assert_eq!(inbounds.len(), 3);
    assert_eq!(inbounds[0]["tag"], "api-in");
    assert_eq!(inbounds[0]["protocol"], "dokodemo-door");
    assert_eq!(inbounds[0]["port"], 10813);
    assert_eq!(inbounds[1]["tag"], "socks-in");
    assert_eq!(inbounds[1]["settings"]["udp"], true);
    assert_eq!(inbounds[1]["sniffing"]["enabled"], true);
    assert_eq!(inbounds[2]["tag"], "http-in");
    assert!(inbounds[2]["settings"].get("udp").is_none());

    assert_eq!(v["api"]["tag"], "api");
    assert_eq!(v["api"]["services"], json!(["StatsService"]));
    assert_eq!(v["stats"], json!({}));
}

#[test]
fn allow_lan_widens_the_listen_address() {
    let mut settings = GlobalSettings::default();
    settings.inbounds[0].allow_lan = true;
    let cfg = xray_config::generate(
        &vless_reality_profile(),
        &routing_with(Vec::new()),
        &DnsConfig::default(),
        &settings,
    );
    let v = serde_json::to_value(&cfg).unwrap();
    assert_eq!(v["inbounds"][1]["listen"], "0.0.0.0");
    assert_eq!(v["inbounds"][2]["listen"], "127.0.0.1");
}

#[test]
fn singbox_tun_inbound_when_enabled() {
    let mut settings = GlobalSettings::default();
    settings.tun.enabled = true;
    settings.tun.enable_ipv6 = true;
    let cfg = singbox_config::generate(
        &vless_reality_profile(),
        &routing_with(Vec::new()),
        &DnsConfig::default(),
        &settings,
    );
    let v = serde_json::to_value(&cfg).unwrap();

    let tun = &v["inbounds"][0];
    assert_eq!(tun["type"], "tun");
    assert_eq!(tun["inet4_address"], "172.19.0.1/30");
    assert_eq!(tun["inet6_address"], "fdfe:dcba:9876::1/126");
    assert_eq!(tun["auto_route"], true);
    assert_eq!(tun["strict_route"], true);
    assert_eq!(tun["stack"], "gvisor");
    assert_eq!(tun["mtu"], 9000);
    assert_eq!(tun["sniff"], true);
    assert_eq!(tun["sniff_override_destination"], false);
    // Socket listeners follow, always mixed, tagged by configured protocol.
    assert_eq!(v["inbounds"][1]["type"], "mixed");
    assert_eq!(v["inbounds"][1]["tag"], "socks-in");
    assert_eq!(v["inbounds"][2]["type"], "mixed");
    assert_eq!(v["inbounds"][2]["tag"], "http-in");
}

#[test]
fn singbox_omits_bootstrap_server_without_resolver() {
    let mut dns = DnsConfig::default();
    dns.bootstrap = String::new();
    let cfg = singbox_config::generate(
        &vless_reality_profile(),
        &routing_with(Vec::new()),
        &dns,
        &GlobalSettings::default(),
    );
    let v = serde_json::to_value(&cfg).unwrap();
    let servers = v["dns"]["servers"].as_array().unwrap();
    assert_eq!(servers.len(), 2);
    assert!(servers.iter().all(|s| s["tag"] != "bootstrap-dns"));
}

#[test]
fn dns_sections_route_remote_and_direct_resolvers() {
    let routing = routing_with(Vec::new());

    let x = xray_json(&vless_reality_profile(), &routing);
    let servers = x["dns"]["servers"].as_array().unwrap();
    assert_eq!(servers.len(), 3);
    assert_eq!(servers[0]["address"], "https://dns.google/dns-query");
    assert_eq!(servers[0]["domains"], json!(["geosite:geolocation-!cn"]));
    assert_eq!(servers[1]["domains"], json!(["geosite:cn"]));
    assert_eq!(servers[2], "1.1.1.1");

    let s = singbox_json(&vless_reality_profile(), &routing);
    let servers = s["dns"]["servers"].as_array().unwrap();
    assert_eq!(servers.len(), 3);
    assert_eq!(servers[0]["tag"], "remote-dns");
    assert_eq!(servers[0]["detour"], "proxy");
    assert_eq!(servers[1]["tag"], "direct-dns");
    assert_eq!(servers[1]["detour"], "direct");
    assert_eq!(servers[2]["tag"], "bootstrap-dns");
    assert_eq!(servers[2]["address"], "1.1.1.1");
    assert_eq!(servers[2]["detour"], "direct");
    assert_eq!(s["dns"]["final"], "remote-dns");
    assert_eq!(s["dns"]["rules"][0]["outbound"], "any");
    assert_eq!(s["dns"]["strategy"], "prefer_ipv4");
    assert!(s["dns"].get("fakeip").is_none());
}

#[test]
fn singbox_fakeip_ranges_when_enabled() {
    let mut dns = DnsConfig::default();
    dns.fake_ip = true;
    let cfg = singbox_config::generate(
        &vless_reality_profile(),
        &routing_with(Vec::new()),
        &dns,
        &GlobalSettings::default(),
    );
    let v = serde_json::to_value(&cfg).unwrap();
    assert_eq!(v["dns"]["fakeip"]["enabled"], true);
    assert_eq!(v["dns"]["fakeip"]["inet4_range"], "198.18.0.0/15");
    assert_eq!(v["dns"]["fakeip"]["inet6_range"], "fc00::/18");
}

#[test]
fn log_level_falls_back_to_info() {
    let mut settings = GlobalSettings::default();
    settings.log_level = String::new();

    let x = xray_config::generate(
        &vless_reality_profile(),
        &routing_with(Vec::new()),
        &DnsConfig::default(),
        &settings,
    );
    assert_eq!(x.log.loglevel, "info");

    let s = singbox_config::generate(
        &vless_reality_profile(),
        &routing_with(Vec::new()),
        &DnsConfig::default(),
        &settings,
    );
    assert_eq!(s.log.level, "info");
    assert!(s.log.timestamp);
}

#[test]
fn singbox_experimental_block_is_fixed() {
    let v = singbox_json(&vless_reality_profile(), &routing_with(Vec::new()));
    assert_eq!(
        v["experimental"]["clash_api"]["external_controller"],
        "127.0.0.1:9090"
    );
    assert_eq!(v["experimental"]["clash_api"]["secret"], "");
    assert_eq!(v["experimental"]["cache_file"]["enabled"], true);
}

#[test]
fn documents_render_as_pretty_json() {
    let routing = routing_with(vec![Rule::new("proxy", "all")]);
    let x = xray_config::generate(
        &vless_reality_profile(),
        &routing,
        &DnsConfig::default(),
        &GlobalSettings::default(),
    );
    let text = x.to_json_pretty().unwrap();
    assert!(text.contains("\"outbounds\""));

    let s = singbox_config::generate(
        &wireguard_profile(),
        &routing,
        &DnsConfig::default(),
        &GlobalSettings::default(),
    );
    let text = s.to_json_pretty().unwrap();
    assert!(text.contains("\"wireguard\""));
}
