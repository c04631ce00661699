//! The development topology: PostgreSQL with pgAdmin, Dex and Universe.

use crate::pgadmin::services::{PgAdminOptions, PgAdminResourceBuilderExt};
use crate::topology::{
    domain::{ContainerImage, ContainerLifetime, Endpoint, EndpointScheme},
    services::{AppHostBuilder, AppHostResult, PostgresServerOptions, ResourceBuilder},
};

/// Configuration key selecting persistent containers.
pub const PERSISTENT_CONTAINERS_KEY: &str = "PERSISTENT_CONTAINERS";

const POSTGRES_HOST_PORT: u16 = 5432;
const PGADMIN_HOST_PORT: u16 = 9002;
const UNIVERSE_HTTP_PORT: u16 = 40000;
const DEX_HTTPS_PORT: u16 = 5556;

/// Registers every resource of the development topology on `builder`.
///
/// # Errors
///
/// Returns configuration errors for malformed `PERSISTENT_CONTAINERS` or
/// `PgAdmin:Port` values, and topology errors from registration.
pub fn configure(builder: &AppHostBuilder) -> AppHostResult<()> {
    let lifetime = if builder
        .configuration()
        .get_bool(PERSISTENT_CONTAINERS_KEY)?
        .unwrap_or(false)
    {
        ContainerLifetime::Persistent
    } else {
        ContainerLifetime::Session
    };

    let user_name = builder.add_parameter("pgUsername", Some("admin"), false)?;
    let password = builder.add_parameter("pgPassword", Some("111111"), false)?;
    let configured_pgadmin =
        PgAdminOptions::from_config(builder.configuration())?.with_lifetime(lifetime);
    let pgadmin = match configured_pgadmin.host_port() {
        Some(_) => configured_pgadmin,
        None => configured_pgadmin.with_host_port(PGADMIN_HOST_PORT),
    };
    let postgres = builder
        .add_postgres(
            "postgres",
            PostgresServerOptions::new(password.name().clone())
                .with_user_name(user_name.name().clone())
                .with_port(POSTGRES_HOST_PORT),
        )?
        .with_data_volume()?
        .with_pgadmin(pgadmin)?
        .with_lifetime(lifetime)?;

    builder
        .add_container(
            "dex",
            ContainerImage::new("dexidp/dex", "v2.37.0").with_registry("ghcr.io"),
        )?
        .with_args(["dex", "serve", "/etc/dex/config.yaml"])?
        .with_bind_mount("./DockerThings/dex-config.yaml", "/etc/dex/config.yaml")?
        .with_endpoint(
            Endpoint::new("main", EndpointScheme::Https)?
                .with_target_port(DEX_HTTPS_PORT)
                .with_proxy(false),
        )?
        .with_lifetime(lifetime)?;

    let database = postgres.add_database("UniverseDb", None)?;
    let universe = builder
        .add_project("universe")?
        .with_reference(&database)?
        .with_http_endpoint("http", None, Some(UNIVERSE_HTTP_PORT))?;
    with_common_environment(universe)?.wait_for(&postgres)?;

    Ok(())
}

fn with_common_environment(project: ResourceBuilder<'_>) -> AppHostResult<ResourceBuilder<'_>> {
    project.with_environment("ASPNETCORE_ENVIRONMENT", "Development")
}
