//! Unit tests for adding pgAdmin to an app host.

use std::sync::Arc;

use crate::config::AppHostConfig;
use crate::pgadmin::services::{
    PGADMIN_PORT_KEY, PgAdminOptions, PgAdminResourceBuilderExt, REGISTRY_MOUNT_TARGET,
};
use crate::topology::{
    adapters::LocalhostEndpointAllocator,
    domain::{
        ContainerLifetime, EnvironmentValue, HealthCheck, LifecycleEventKind, Relationship,
        ResourceKind, ResourceName, TopologyDomainError,
    },
    ports::ResourceRegistry,
    services::{AppHostBuilder, AppHostError, PostgresServerOptions},
};
use camino::Utf8PathBuf;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

fn name(value: &str) -> ResourceName {
    ResourceName::new(value).expect("valid resource name")
}

#[fixture]
fn builder() -> AppHostBuilder {
    let builder =
        AppHostBuilder::new(AppHostConfig::new().with_value("AppHost:Directory", "/srv/anvil"));
    builder
        .add_parameter("pgPassword", Some("111111"), true)
        .expect("password parameter");
    builder
        .add_postgres(
            "postgres",
            PostgresServerOptions::new(name("pgPassword")).with_port(5432),
        )
        .expect("postgres server");
    builder
}

#[rstest]
fn pgadmin_container_is_registered_with_defaults(builder: AppHostBuilder) {
    builder
        .resource(&name("postgres"))
        .and_then(|server| server.with_pgadmin(PgAdminOptions::new().with_host_port(9002)))
        .expect("pgAdmin added");

    let admin = builder
        .resource(&name("postgres-pgadmin"))
        .and_then(|handle| handle.resource())
        .expect("pgAdmin registered");
    assert!(matches!(admin.kind(), ResourceKind::PgAdmin));
    assert_eq!(
        admin.image().map(ToString::to_string).as_deref(),
        Some("docker.io/dpage/pgadmin4:8.12")
    );

    let http = admin.endpoint("http").expect("http endpoint");
    assert_eq!(http.target_port(), Some(80));
    assert_eq!(http.port(), Some(9002));

    let environment: Vec<(&str, &EnvironmentValue)> = admin
        .environment()
        .iter()
        .map(|(key, value)| (key.as_str(), value))
        .collect();
    assert_eq!(
        environment,
        [
            (
                "PGADMIN_CONFIG_MASTER_PASSWORD_REQUIRED",
                &EnvironmentValue::literal("False")
            ),
            ("PGADMIN_CONFIG_SERVER_MODE", &EnvironmentValue::literal("False")),
            (
                "PGADMIN_DEFAULT_EMAIL",
                &EnvironmentValue::literal("admin@domain.com")
            ),
            ("PGADMIN_DEFAULT_PASSWORD", &EnvironmentValue::literal("admin")),
        ]
    );

    let mount = admin.bind_mounts().first().expect("registry mount");
    assert_eq!(mount.target(), REGISTRY_MOUNT_TARGET);
    assert_eq!(mount.source().as_str(), "/srv/anvil/Properties/pgadmin.tmp.json");
    assert_eq!(
        admin.health_checks(),
        [HealthCheck::HttpGet {
            endpoint: "http".to_owned(),
            path: "/browser".to_owned(),
        }]
    );
    assert!(admin.is_excluded_from_manifest());
    assert!(admin.relationships().contains(&Relationship {
        resource: name("postgres"),
        label: "PgAdmin".to_owned(),
    }));
    assert_eq!(
        builder
            .eventing()
            .subscription_count(LifecycleEventKind::AfterEndpointsAllocated)
            .expect("bus readable"),
        1
    );
}

#[rstest]
fn second_server_reuses_existing_pgadmin(builder: AppHostBuilder) {
    builder
        .add_postgres("reporting", PostgresServerOptions::new(name("pgPassword")))
        .expect("second server");
    builder
        .resource(&name("postgres"))
        .and_then(|server| server.with_pgadmin(PgAdminOptions::new()))
        .expect("pgAdmin added");
    builder
        .resource(&name("reporting"))
        .and_then(|server| {
            server.with_pgadmin(PgAdminOptions::new().with_lifetime(ContainerLifetime::Persistent))
        })
        .expect("pgAdmin reused");

    let admins = builder
        .registry()
        .resources()
        .expect("registry readable")
        .into_iter()
        .filter(|resource| matches!(resource.kind(), ResourceKind::PgAdmin))
        .count();
    assert_eq!(admins, 1);
    assert_eq!(
        builder
            .eventing()
            .subscription_count(LifecycleEventKind::AfterEndpointsAllocated)
            .expect("bus readable"),
        1
    );
    let admin = builder
        .resource(&name("postgres-pgadmin"))
        .and_then(|handle| handle.resource())
        .expect("pgAdmin registered");
    assert_eq!(admin.lifetime(), ContainerLifetime::Persistent);
}

#[rstest]
fn custom_name_is_used(builder: AppHostBuilder) {
    builder
        .resource(&name("postgres"))
        .and_then(|server| server.with_pgadmin(PgAdminOptions::new().with_name("admin-ui")))
        .expect("pgAdmin added");

    assert!(builder.resource(&name("admin-ui")).is_ok());
}

#[rstest]
fn pgadmin_requires_postgres_server(builder: AppHostBuilder) {
    let err = builder
        .add_project("universe")
        .and_then(|project| project.with_pgadmin(PgAdminOptions::new()))
        .expect_err("projects cannot host pgAdmin");

    assert!(matches!(
        err,
        AppHostError::Domain(TopologyDomainError::UnexpectedResourceKind { .. })
    ));
}

#[rstest]
#[case(None, None)]
#[case(Some("9002"), Some(9002))]
fn host_port_is_read_from_configuration(
    #[case] configured: Option<&str>,
    #[case] expected: Option<u16>,
) {
    let config = configured.map_or_else(AppHostConfig::new, |port| {
        AppHostConfig::new().with_value(PGADMIN_PORT_KEY, port)
    });

    let options = PgAdminOptions::from_config(&config).expect("valid configuration");

    assert_eq!(options.host_port(), expected);
}

#[test]
fn invalid_configured_port_is_rejected() {
    let config = AppHostConfig::new().with_value(PGADMIN_PORT_KEY, "not-a-port");

    assert!(PgAdminOptions::from_config(&config).is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn run_writes_registry_into_app_host_directory() {
    let temp = tempfile::tempdir().expect("temp dir");
    let directory =
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp path");
    std::fs::create_dir(directory.join("Properties")).expect("properties dir");

    let builder = AppHostBuilder::new(
        AppHostConfig::new().with_value("AppHost:Directory", directory.as_str()),
    );
    builder
        .add_parameter("pgPassword", Some("111111"), true)
        .expect("password parameter");
    builder
        .add_postgres(
            "postgres",
            PostgresServerOptions::new(name("pgPassword")).with_port(5432),
        )
        .and_then(|server| server.with_pgadmin(PgAdminOptions::new()))
        .expect("pgAdmin added");
    let host = builder.build_with(
        Arc::new(LocalhostEndpointAllocator::starting_at(52000)),
        Arc::new(DefaultClock),
    );

    let summary = host.run().await.expect("run succeeds");

    assert_eq!(summary.allocation_handlers, 1);
    let written = std::fs::read(directory.join("Properties/pgadmin.tmp.json"))
        .expect("registry written");
    let value: serde_json::Value = serde_json::from_slice(&written).expect("valid JSON");
    assert_eq!(value["Servers"]["1"]["Host"], "postgres");
    assert_eq!(value["Servers"]["1"]["Port"], 5432);
    assert_eq!(value["Servers"]["1"]["PasswordExecCommand"], "echo '111111'");
    assert_eq!(
        host.eventing()
            .subscription_count(LifecycleEventKind::AfterEndpointsAllocated)
            .expect("bus readable"),
        0
    );
}
