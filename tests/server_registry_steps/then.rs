//! Then steps for server registry scenarios.

use super::world::RegistryWorld;
use anvil::pgadmin::{
    domain::{ServerCredential, ServerKey, ServerRegistryDocument, TopologyConfigurationError},
    services::ServerRegistryError,
};
use eyre::{WrapErr, eyre};
use rstest_bdd_macros::then;

fn read_document(world: &RegistryWorld) -> Result<ServerRegistryDocument, eyre::Report> {
    let bytes = std::fs::read(&world.registry_file).wrap_err("read registry file")?;
    serde_json::from_slice(&bytes).wrap_err("parse registry file")
}

fn parse_key(key: &str) -> Result<ServerKey, eyre::Report> {
    key.parse().wrap_err("parse server key")
}

#[then("generation succeeds")]
fn generation_succeeds(world: &RegistryWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre!("generation failed: {err}")),
        None => Err(eyre!("generation has not run")),
    }
}

#[then("generation fails with a topology configuration error")]
fn generation_fails_with_topology_error(world: &RegistryWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(ServerRegistryError::TopologyConfiguration(
            TopologyConfigurationError::RegistryMountMissing { .. },
        ))) => Ok(()),
        Some(other) => Err(eyre!("expected missing mount error, found {other:?}")),
        None => Err(eyre!("generation has not run")),
    }
}

#[then("the registry file lists {count:usize} servers")]
fn registry_lists_servers(world: &RegistryWorld, count: usize) -> Result<(), eyre::Report> {
    let document = read_document(world)?;
    if document.len() != count {
        return Err(eyre!(
            "expected {count} servers, found {}",
            document.len()
        ));
    }
    Ok(())
}

#[then(r#"server key "{key}" is absent"#)]
fn server_key_absent(world: &RegistryWorld, key: String) -> Result<(), eyre::Report> {
    let document = read_document(world)?;
    if document.get(parse_key(&key)?).is_some() {
        return Err(eyre!("expected key {key} to be absent"));
    }
    Ok(())
}

#[then(r#"server key "{key}" has host "{host}" and port {port:u16}"#)]
fn server_has_host_and_port(
    world: &RegistryWorld,
    key: String,
    host: String,
    port: u16,
) -> Result<(), eyre::Report> {
    let document = read_document(world)?;
    let connection = document
        .get(parse_key(&key)?)
        .ok_or_else(|| eyre!("missing server key {key}"))?;
    if connection.host() != host || connection.port() != port {
        return Err(eyre!(
            "expected {host}:{port}, found {}:{}",
            connection.host(),
            connection.port()
        ));
    }
    Ok(())
}

#[then(r#"server key "{key}" has username "{username}""#)]
fn server_has_username(
    world: &RegistryWorld,
    key: String,
    username: String,
) -> Result<(), eyre::Report> {
    let document = read_document(world)?;
    let connection = document
        .get(parse_key(&key)?)
        .ok_or_else(|| eyre!("missing server key {key}"))?;
    if connection.username() != username {
        return Err(eyre!(
            "expected username {username}, found {}",
            connection.username()
        ));
    }
    Ok(())
}

#[then(r#"server key "{key}" runs password command "{command}""#)]
fn server_runs_password_command(
    world: &RegistryWorld,
    key: String,
    command: String,
) -> Result<(), eyre::Report> {
    let document = read_document(world)?;
    let connection = document
        .get(parse_key(&key)?)
        .ok_or_else(|| eyre!("missing server key {key}"))?;
    match connection.credential() {
        ServerCredential::ExecCommand(actual) if *actual == command => Ok(()),
        other => Err(eyre!("expected password command {command}, found {other:?}")),
    }
}

#[then(r#"the registry file still contains "{contents}""#)]
fn registry_file_unchanged(world: &RegistryWorld, contents: String) -> Result<(), eyre::Report> {
    let actual = std::fs::read_to_string(&world.registry_file).wrap_err("read registry file")?;
    if actual != contents {
        return Err(eyre!("expected {contents:?}, found {actual:?}"));
    }
    Ok(())
}
