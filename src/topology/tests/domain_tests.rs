//! Unit tests for topology domain types.

use crate::topology::domain::{
    BindMount, ContainerImage, Endpoint, EndpointAllocation, EndpointScheme, EnvironmentValue,
    Resource, ResourceKind, ResourceName, TopologyDomainError,
};
use rstest::rstest;

fn name(value: &str) -> ResourceName {
    ResourceName::new(value).expect("valid resource name")
}

#[rstest]
#[case("postgres")]
#[case("postgres-pgadmin")]
#[case("UniverseDb")]
#[case("db2")]
fn accepts_valid_resource_names(#[case] value: &str) {
    assert_eq!(name(value).as_str(), value);
}

#[rstest]
#[case("2db")]
#[case("db_2")]
#[case("db-")]
#[case("db--two")]
#[case("db two")]
fn rejects_invalid_resource_names(#[case] value: &str) {
    assert!(matches!(
        ResourceName::new(value),
        Err(TopologyDomainError::InvalidResourceName(_))
    ));
}

#[test]
fn rejects_blank_and_oversized_names() {
    assert_eq!(
        ResourceName::new("   "),
        Err(TopologyDomainError::EmptyResourceName)
    );
    assert!(matches!(
        ResourceName::new("a".repeat(65)),
        Err(TopologyDomainError::ResourceNameTooLong(_))
    ));
}

#[test]
fn names_match_ignoring_case() {
    assert!(name("UniverseDb").matches(&name("universedb")));
    assert!(!name("postgres").matches(&name("postgres2")));
}

#[test]
fn endpoint_reports_allocation_and_url() {
    let mut endpoint = Endpoint::new("http", EndpointScheme::Http)
        .expect("valid endpoint")
        .with_target_port(80)
        .with_port(Some(9002));
    assert!(!endpoint.is_allocated());
    assert_eq!(endpoint.url(), None);

    endpoint.allocate(EndpointAllocation::new("localhost", 9002));

    assert!(endpoint.is_allocated());
    assert_eq!(endpoint.target_port(), Some(80));
    assert_eq!(endpoint.url().as_deref(), Some("http://localhost:9002"));
}

#[test]
fn bind_mount_requires_absolute_target() {
    assert!(matches!(
        BindMount::new("./Properties/pgadmin.tmp.json", "pgadmin4/servers.json"),
        Err(TopologyDomainError::RelativeMountTarget(_))
    ));
}

#[test]
fn container_image_renders_registry_prefix() {
    let image = ContainerImage::new("dpage/pgadmin4", "8.12").with_registry("docker.io");
    assert_eq!(image.to_string(), "docker.io/dpage/pgadmin4:8.12");
    assert_eq!(
        ContainerImage::new("ghcr.io/dexidp/dex", "v2.37.0").to_string(),
        "ghcr.io/dexidp/dex:v2.37.0"
    );
}

#[test]
fn duplicate_endpoint_names_are_rejected() {
    let mut resource = Resource::new(name("web"), ResourceKind::Project);
    let endpoint = Endpoint::new("http", EndpointScheme::Http).expect("valid endpoint");
    resource
        .add_endpoint(endpoint.clone())
        .expect("first endpoint is accepted");

    assert!(matches!(
        resource.add_endpoint(endpoint),
        Err(TopologyDomainError::DuplicateEndpoint { .. })
    ));
}

#[test]
fn environment_values_replace_in_place() {
    let mut resource = Resource::new(name("web"), ResourceKind::Project);
    resource
        .set_environment("A", EnvironmentValue::literal("1"))
        .expect("valid variable");
    resource
        .set_environment("B", EnvironmentValue::literal("2"))
        .expect("valid variable");
    resource
        .set_environment("A", EnvironmentValue::literal("3"))
        .expect("valid variable");

    assert_eq!(
        resource.environment(),
        [
            ("A".to_owned(), EnvironmentValue::literal("3")),
            ("B".to_owned(), EnvironmentValue::literal("2")),
        ]
    );
}

#[test]
fn bind_mounts_replace_same_target() {
    let mut resource = Resource::new(name("admin"), ResourceKind::PgAdmin);
    resource.add_bind_mount(BindMount::new("/a.json", "/pgadmin4/servers.json").expect("mount"));
    resource.add_bind_mount(BindMount::new("/b.json", "/pgadmin4/servers.json").expect("mount"));

    assert_eq!(resource.bind_mounts().len(), 1);
    assert_eq!(resource.bind_mounts()[0].source().as_str(), "/b.json");
}
