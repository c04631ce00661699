//! Given steps for server registry scenarios.

use super::world::RegistryWorld;
use anvil::pgadmin::services::REGISTRY_MOUNT_TARGET;
use anvil::topology::{
    domain::{
        BindMount, Endpoint, EndpointAllocation, EndpointScheme, PRIMARY_ENDPOINT_NAME, Resource,
        ResourceKind, ResourceName,
    },
    ports::ResourceRegistry,
};
use eyre::WrapErr;
use rstest_bdd_macros::given;

fn register_server(
    world: &RegistryWorld,
    server: &str,
    target_port: u16,
    allocation: Option<(u16, String)>,
) -> Result<(), eyre::Report> {
    let password_name = ResourceName::new(format!("{server}-password"))?;
    world.registry.register(Resource::new(
        password_name.clone(),
        ResourceKind::Parameter {
            default: allocation.as_ref().map(|(_, password)| password.clone()),
            secret: true,
        },
    ))?;

    let server_name = ResourceName::new(server)?;
    let mut resource = Resource::new(
        server_name.clone(),
        ResourceKind::PostgresServer {
            user_name: None,
            password: password_name,
        },
    );
    resource.add_endpoint(
        Endpoint::new(PRIMARY_ENDPOINT_NAME, EndpointScheme::Tcp)?.with_target_port(target_port),
    )?;
    world
        .registry
        .register(resource)
        .wrap_err("register database server")?;

    if let Some((host_port, _)) = allocation {
        world.registry.record_allocation(
            &server_name,
            PRIMARY_ENDPOINT_NAME,
            EndpointAllocation::new("localhost", host_port),
        )?;
    }
    Ok(())
}

#[given("a pgAdmin resource whose registry mount points into a scratch directory")]
fn admin_with_mount(world: &mut RegistryWorld) -> Result<(), eyre::Report> {
    let mut admin = Resource::new(ResourceName::new("pgadmin")?, ResourceKind::PgAdmin);
    admin.add_bind_mount(BindMount::new(
        world.registry_file.clone(),
        REGISTRY_MOUNT_TARGET,
    )?);
    world
        .registry
        .register(admin)
        .wrap_err("register pgAdmin resource")?;
    Ok(())
}

#[given("a pgAdmin resource without a registry mount")]
fn admin_without_mount(world: &mut RegistryWorld) -> Result<(), eyre::Report> {
    world
        .registry
        .register(Resource::new(
            ResourceName::new("pgadmin")?,
            ResourceKind::PgAdmin,
        ))
        .wrap_err("register pgAdmin resource")?;
    Ok(())
}

#[given(r#"the registry file already contains "{contents}""#)]
fn existing_registry_file(world: &mut RegistryWorld, contents: String) -> Result<(), eyre::Report> {
    std::fs::write(&world.registry_file, contents).wrap_err("seed registry file")?;
    Ok(())
}

#[given(
    r#"a database server "{server}" on target port {target_port:u16} allocated at host port {host_port:u16} with password "{password}""#
)]
fn allocated_server(
    world: &mut RegistryWorld,
    server: String,
    target_port: u16,
    host_port: u16,
    password: String,
) -> Result<(), eyre::Report> {
    register_server(world, &server, target_port, Some((host_port, password)))
}

#[given(r#"a database server "{server}" on target port {target_port:u16} that is not allocated"#)]
fn unallocated_server(
    world: &mut RegistryWorld,
    server: String,
    target_port: u16,
) -> Result<(), eyre::Report> {
    register_server(world, &server, target_port, None)
}
