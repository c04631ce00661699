//! When steps for server registry scenarios.

use super::world::RegistryWorld;
use rstest_bdd_macros::when;

#[when("the server registry is generated")]
fn generate_registry(world: &mut RegistryWorld) {
    world.last_result = Some(world.generator().generate());
}
