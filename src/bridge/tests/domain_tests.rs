//! Unit tests for bridge domain types and pure derivation rules.

use crate::bridge::domain::{
    BridgeDomainError, ContainerId, ContainerInspect, ContainerRef, ContainerState, DeadContainer,
    OwnedServiceId, PortSpec, Protocol, ServiceId, ServiceMetadata, collect_service_ports,
    combine_tags,
};
use rstest::rstest;
use std::collections::HashMap;

// ── Identifiers ────────────────────────────────────────────────────

#[rstest]
fn container_id_short_truncates_to_twelve_characters() {
    let id = ContainerId::new("0123456789abcdef0123456789abcdef");
    assert_eq!(id.short(), "0123456789ab");
}

#[rstest]
fn container_id_short_keeps_short_ids_whole() {
    let id = ContainerId::new("abc");
    assert_eq!(id.short(), "abc");
}

#[rstest]
fn container_ref_strips_leading_slash() {
    let reference = ContainerRef::new(ContainerId::new("abc"), "/web");
    assert_eq!(reference.name, "web");
}

#[rstest]
fn container_ref_keeps_clean_names() {
    let reference = ContainerRef::new(ContainerId::new("abc"), "web");
    assert_eq!(reference.name, "web");
}

// ── Port specifications ────────────────────────────────────────────

#[rstest]
#[case("80/tcp", 80, Protocol::Tcp)]
#[case("53/udp", 53, Protocol::Udp)]
#[case("8080", 8080, Protocol::Tcp)]
fn port_spec_parses(#[case] input: &str, #[case] port: u16, #[case] protocol: Protocol) {
    let spec: PortSpec = input.parse().expect("spec should parse");
    assert_eq!(spec.port, port);
    assert_eq!(spec.protocol, protocol);
}

#[rstest]
fn port_spec_rejects_unknown_protocol() {
    let result: Result<PortSpec, _> = "80/sctp".parse();
    assert!(matches!(result, Err(BridgeDomainError::InvalidProtocol(_))));
}

#[rstest]
#[case("http/tcp")]
#[case("")]
#[case("70000")]
fn port_spec_rejects_bad_port_numbers(#[case] input: &str) {
    let result: Result<PortSpec, _> = input.parse();
    assert!(matches!(result, Err(BridgeDomainError::InvalidPortSpec(_))));
}

#[rstest]
fn port_spec_displays_runtime_form() {
    assert_eq!(PortSpec::udp(53).to_string(), "53/udp");
    assert_eq!(PortSpec::tcp(80).to_string(), "80/tcp");
}

// ── Service identifier wire format ─────────────────────────────────

#[rstest]
fn service_id_round_trips_tcp() {
    let id = ServiceId::for_port("myhost", "web", 80, Protocol::Tcp);
    assert_eq!(id.as_str(), "myhost:web:80");

    let owned = OwnedServiceId::parse(id.as_str()).expect("own format should parse");
    assert_eq!(owned.hostname, "myhost");
    assert_eq!(owned.container_name, "web");
    assert_eq!(owned.exposed_port, 80);
    assert_eq!(owned.protocol(), Protocol::Tcp);
}

#[rstest]
fn service_id_round_trips_udp() {
    let id = ServiceId::for_port("myhost", "dns", 53, Protocol::Udp);
    assert_eq!(id.as_str(), "myhost:dns:53:udp");

    let owned = OwnedServiceId::parse(id.as_str()).expect("own format should parse");
    assert_eq!(owned.exposed_port, 53);
    assert!(owned.udp);
    assert_eq!(owned.protocol(), Protocol::Udp);
}

#[rstest]
fn service_id_parse_accepts_qualified_hostnames() {
    let owned = OwnedServiceId::parse("ip-10-0-0-1.ec2.internal:api:9000")
        .expect("fully qualified hostname should parse");
    assert_eq!(owned.hostname, "ip-10-0-0-1.ec2.internal");
    assert_eq!(owned.container_name, "api");
}

#[rstest]
#[case("redis")]
#[case("myhost:web")]
#[case("myhost:web:http")]
#[case("myhost:_web:80")]
#[case("custom-override-id")]
fn service_id_parse_rejects_foreign_formats(#[case] input: &str) {
    assert_eq!(OwnedServiceId::parse(input), None);
}

// ── Metadata extraction ────────────────────────────────────────────

fn labels(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

#[rstest]
fn metadata_reads_global_env_keys() {
    let env = vec!["SERVICE_NAME=web".to_string(), "PATH=/bin".to_string()];
    let metadata = ServiceMetadata::extract(&env, &HashMap::new(), 80);
    assert_eq!(metadata.get("name"), Some("web"));
    assert_eq!(metadata.get("path"), None);
}

#[rstest]
fn metadata_port_scoped_env_overrides_global() {
    let env = vec![
        "SERVICE_NAME=web".to_string(),
        "SERVICE_80_NAME=frontend".to_string(),
    ];
    let metadata = ServiceMetadata::extract(&env, &HashMap::new(), 80);
    assert_eq!(metadata.get("name"), Some("frontend"));
    assert!(metadata.is_port_scoped("name"));
}

#[rstest]
fn metadata_port_scoped_shadows_later_global() {
    let env = vec![
        "SERVICE_80_NAME=frontend".to_string(),
        "SERVICE_NAME=web".to_string(),
    ];
    let metadata = ServiceMetadata::extract(&env, &HashMap::new(), 80);
    assert_eq!(metadata.get("name"), Some("frontend"));
}

#[rstest]
fn metadata_skips_other_ports() {
    let env = vec!["SERVICE_443_NAME=tls".to_string()];
    let metadata = ServiceMetadata::extract(&env, &HashMap::new(), 80);
    assert_eq!(metadata.get("name"), None);
    assert!(!metadata.is_port_scoped("name"));
}

#[rstest]
fn metadata_reads_labels() {
    let labels = labels(&[("service.tags", "db,primary"), ("service.80.name", "pg")]);
    let metadata = ServiceMetadata::extract(&[], &labels, 80);
    assert_eq!(metadata.get("tags"), Some("db,primary"));
    assert_eq!(metadata.get("name"), Some("pg"));
    assert!(metadata.is_port_scoped("name"));
}

#[rstest]
fn metadata_lowercases_keys() {
    let env = vec!["SERVICE_REGION=eu-west-1".to_string()];
    let metadata = ServiceMetadata::extract(&env, &HashMap::new(), 80);
    assert_eq!(metadata.get("region"), Some("eu-west-1"));
}

#[rstest]
fn metadata_keeps_numeric_keys_without_suffix_global() {
    let env = vec!["SERVICE_8080=value".to_string()];
    let metadata = ServiceMetadata::extract(&env, &HashMap::new(), 8080);
    assert_eq!(metadata.get("8080"), Some("value"));
}

#[rstest]
fn metadata_attrs_exclude_reserved_keys() {
    let env = vec![
        "SERVICE_NAME=web".to_string(),
        "SERVICE_ID=custom".to_string(),
        "SERVICE_TAGS=a,b".to_string(),
        "SERVICE_PROXYPORT=9999".to_string(),
        "SERVICE_IGNORE=".to_string(),
        "SERVICE_REGION=eu".to_string(),
    ];
    let metadata = ServiceMetadata::extract(&env, &HashMap::new(), 80);
    let attrs = metadata.into_attrs();
    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs.get("region").map(String::as_str), Some("eu"));
}

#[rstest]
fn metadata_treats_empty_values_as_absent_via_get_non_empty() {
    let env = vec!["SERVICE_IGNORE=".to_string()];
    let metadata = ServiceMetadata::extract(&env, &HashMap::new(), 80);
    assert_eq!(metadata.get("ignore"), Some(""));
    assert_eq!(metadata.get_non_empty("ignore"), None);
}

// ── Tag composition ────────────────────────────────────────────────

#[rstest]
fn combine_tags_splits_trims_and_drops_empties() {
    let tags = combine_tags(&["a, b,,c ", "", "d"]);
    assert_eq!(tags, vec!["a", "b", "c", "d"]);
}

#[rstest]
fn combine_tags_preserves_order_across_parts() {
    let tags = combine_tags(&["dns", "prod,eu", "udp"]);
    assert_eq!(tags, vec!["dns", "prod", "eu", "udp"]);
}

// ── Container snapshot helpers ─────────────────────────────────────

#[rstest]
#[case("nginx:1.2", "nginx")]
#[case("registry.local:5000/team/app:v3", "app")]
#[case("redis", "redis")]
fn image_base_name_drops_path_and_tag(#[case] image: &str, #[case] expected: &str) {
    let container = ContainerInspect::new(ContainerId::new("abc"), "/abc", image);
    assert_eq!(container.image_base_name(), expected);
}

#[rstest]
fn container_state_detects_signal_bit() {
    let signaled = ContainerState {
        running: false,
        exit_code: 137,
    };
    assert!(signaled.is_signaled());

    let failed = ContainerState {
        running: false,
        exit_code: 1,
    };
    assert!(!failed.is_signaled());
    assert!(!failed.is_clean_exit());
}

// ── Port merging ───────────────────────────────────────────────────

#[rstest]
fn exposed_ports_synthesize_host_networking_publication() {
    let container = ContainerInspect::new(ContainerId::new("abc"), "/abc", "nginx")
        .with_exposed_port(PortSpec::tcp(80));
    let ports = collect_service_ports(&container);

    let port = ports.get(&PortSpec::tcp(80)).expect("port should be kept");
    assert_eq!(port.host_ip, "0.0.0.0");
    assert_eq!(port.host_port, Some(80));
    assert_eq!(port.exposed_port, 80);
}

#[rstest]
fn runtime_bindings_override_exposed_synthesis() {
    let container = ContainerInspect::new(ContainerId::new("abc"), "/abc", "nginx")
        .with_exposed_port(PortSpec::tcp(80))
        .with_port_binding(PortSpec::tcp(80), "10.0.0.1", "8080");
    let ports = collect_service_ports(&container);

    let port = ports.get(&PortSpec::tcp(80)).expect("port should be kept");
    assert_eq!(port.host_ip, "10.0.0.1");
    assert_eq!(port.host_port, Some(8080));
}

#[rstest]
fn unpublished_binding_yields_no_host_port() {
    let container = ContainerInspect::new(ContainerId::new("abc"), "/abc", "nginx")
        .with_port_binding(PortSpec::tcp(80), "", "");
    let ports = collect_service_ports(&container);

    let port = ports.get(&PortSpec::tcp(80)).expect("port should be kept");
    assert_eq!(port.host_ip, "0.0.0.0");
    assert_eq!(port.host_port, None);
}

#[rstest]
fn port_merge_is_deterministic() {
    let container = ContainerInspect::new(ContainerId::new("abc"), "/abc", "web")
        .with_port_binding(PortSpec::tcp(443), "10.0.0.1", "8443")
        .with_port_binding(PortSpec::tcp(80), "10.0.0.1", "8080");
    let ports: Vec<_> = collect_service_ports(&container).into_keys().collect();
    assert_eq!(ports, vec![PortSpec::tcp(80), PortSpec::tcp(443)]);
}

// ── Dead containers ────────────────────────────────────────────────

#[rstest]
fn dead_container_expires_after_countdown() {
    let mut dead = DeadContainer::new(30, Vec::new());
    assert!(!dead.tick(10));
    assert!(!dead.tick(10));
    assert!(dead.tick(10));
}

#[rstest]
fn dead_container_expires_when_step_overshoots() {
    let mut dead = DeadContainer::new(5, Vec::new());
    assert!(dead.tick(10));
}
