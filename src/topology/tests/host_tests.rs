//! Unit tests for the app host run and environment resolution.

use std::sync::Arc;

use crate::config::AppHostConfig;
use crate::topology::{
    adapters::LocalhostEndpointAllocator,
    domain::{
        Endpoint, EndpointScheme, EnvironmentValue, PRIMARY_ENDPOINT_NAME, Resource, ResourceKind,
        ResourceName,
    },
    ports::{AllocationError, ResourceRegistry},
    services::{AppHostBuilder, AppHostError, LocalAppHost, PostgresServerOptions, REDACTED_VALUE},
};
use mockable::DefaultClock;

fn name(value: &str) -> ResourceName {
    ResourceName::new(value).expect("valid resource name")
}

fn build_host(config: AppHostConfig) -> LocalAppHost {
    let builder = AppHostBuilder::new(config);
    builder
        .add_parameter("pgUsername", Some("admin"), false)
        .expect("user parameter");
    builder
        .add_parameter("pgPassword", Some("111111"), true)
        .expect("password parameter");
    let server = builder
        .add_postgres(
            "postgres",
            PostgresServerOptions::new(name("pgPassword"))
                .with_user_name(name("pgUsername"))
                .with_port(5432),
        )
        .expect("postgres server");
    let database = server
        .add_database("UniverseDb", None)
        .expect("database");
    builder
        .add_project("universe")
        .and_then(|project| project.with_reference(&database))
        .and_then(|project| project.with_http_endpoint("http", None, Some(40000)))
        .and_then(|project| project.with_environment("ASPNETCORE_ENVIRONMENT", "Development"))
        .expect("project");

    builder.build_with(
        Arc::new(LocalhostEndpointAllocator::starting_at(50000)),
        Arc::new(DefaultClock),
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn run_allocates_every_endpoint() {
    let host = build_host(AppHostConfig::new());

    let summary = host.run().await.expect("run succeeds");

    let ports: Vec<(String, u16)> = summary
        .allocations
        .iter()
        .map(|allocated| (allocated.resource.to_string(), allocated.allocation.port()))
        .collect();
    assert_eq!(
        ports,
        [("postgres".to_owned(), 5432), ("universe".to_owned(), 40000)]
    );
    assert_eq!(summary.allocation_handlers, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn second_run_keeps_existing_allocations() {
    let host = build_host(AppHostConfig::new());
    host.run().await.expect("first run succeeds");

    let summary = host.run().await.expect("second run succeeds");
    assert!(summary.allocations.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn environment_resolves_connection_strings_after_allocation() {
    let host = build_host(AppHostConfig::new().with_value("Parameters:pgPassword", "s3cret"));
    host.run().await.expect("run succeeds");

    let environment = host
        .environment_for(&name("universe"))
        .expect("environment resolves");

    assert_eq!(
        environment,
        [
            (
                "ConnectionStrings__UniverseDb".to_owned(),
                "Host=localhost;Port=5432;Username=admin;Password=s3cret;Database=UniverseDb"
                    .to_owned()
            ),
            (
                "ASPNETCORE_ENVIRONMENT".to_owned(),
                "Development".to_owned()
            ),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn redacted_environment_masks_values_carrying_secrets() {
    let host = build_host(AppHostConfig::new().with_value("Parameters:pgPassword", "s3cret"));
    host.registry()
        .register(Resource::new(
            name("apiKey"),
            ResourceKind::Parameter {
                default: Some("k3y".to_owned()),
                secret: true,
            },
        ))
        .expect("register secret parameter");
    host.registry()
        .update(&name("universe"), |resource| {
            resource.set_environment("API_KEY", EnvironmentValue::Parameter(name("apiKey")))
        })
        .expect("add secret variable");
    host.run().await.expect("run succeeds");

    let environment = host
        .redacted_environment_for(&name("universe"))
        .expect("environment resolves");

    assert_eq!(
        environment,
        [
            ("ConnectionStrings__UniverseDb".to_owned(), REDACTED_VALUE.to_owned()),
            (
                "ASPNETCORE_ENVIRONMENT".to_owned(),
                "Development".to_owned()
            ),
            ("API_KEY".to_owned(), REDACTED_VALUE.to_owned()),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn redacted_environment_keeps_non_secret_connection_strings() {
    let builder = AppHostBuilder::new(AppHostConfig::new());
    builder
        .add_parameter("pgPassword", Some("111111"), false)
        .expect("password parameter");
    let database = builder
        .add_postgres(
            "postgres",
            PostgresServerOptions::new(name("pgPassword")).with_port(5432),
        )
        .and_then(|server| server.add_database("UniverseDb", None))
        .expect("database");
    builder
        .add_project("universe")
        .and_then(|project| project.with_reference(&database))
        .expect("project");
    let host = builder.build_with(
        Arc::new(LocalhostEndpointAllocator::starting_at(50000)),
        Arc::new(DefaultClock),
    );
    host.run().await.expect("run succeeds");

    let environment = host
        .redacted_environment_for(&name("universe"))
        .expect("environment resolves");

    assert_eq!(
        environment,
        host.environment_for(&name("universe")).expect("environment resolves")
    );
}

#[test]
fn connection_string_requires_allocated_endpoint() {
    let host = build_host(AppHostConfig::new());

    let result = host.connection_string(&name("postgres"));
    assert!(matches!(
        result,
        Err(AppHostError::EndpointNotAllocated { .. })
    ));
}

#[test]
fn parameters_are_not_connection_targets() {
    let host = build_host(AppHostConfig::new());

    let result = host.connection_string(&name("pgPassword"));
    assert!(matches!(result, Err(AppHostError::NoConnectionString(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn allocation_failure_aborts_the_run() {
    let host = build_host(AppHostConfig::new());
    host.registry()
        .register(Resource::new(name("clash"), ResourceKind::Container))
        .expect("register clash");
    host.registry()
        .update(&name("clash"), |resource| {
            resource.add_endpoint(
                Endpoint::new(PRIMARY_ENDPOINT_NAME, EndpointScheme::Tcp)?
                    .with_target_port(5432)
                    .with_port(Some(5432)),
            )
        })
        .expect("endpoint added");

    let result = host.run().await;
    assert!(matches!(
        result,
        Err(AppHostError::Allocation(AllocationError::PortInUse { port: 5432, .. }))
    ));
}
