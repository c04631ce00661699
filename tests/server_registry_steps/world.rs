//! Shared world state for server registry BDD scenarios.

use std::sync::Arc;

use anvil::pgadmin::{
    adapters::CapStdRegistryFileSink,
    services::{GenerationReport, ServerRegistryGenerator, ServerRegistryResult},
};
use anvil::topology::{adapters::memory::InMemoryResourceRegistry, domain::ResourceName};
use camino::Utf8PathBuf;
use rstest::fixture;
use tempfile::TempDir;

/// Generator type used by the BDD world.
pub type TestGenerator = ServerRegistryGenerator<InMemoryResourceRegistry, CapStdRegistryFileSink>;

/// Scenario world for server registry behaviour tests.
pub struct RegistryWorld {
    pub scratch: TempDir,
    pub registry: Arc<InMemoryResourceRegistry>,
    pub registry_file: Utf8PathBuf,
    pub last_result: Option<ServerRegistryResult<GenerationReport>>,
}

impl RegistryWorld {
    /// Creates a world with an empty registry and a fresh scratch directory.
    ///
    /// # Panics
    ///
    /// Panics when the scratch directory cannot be created or is not UTF-8.
    #[must_use]
    pub fn new() -> Self {
        let scratch = tempfile::tempdir().expect("scratch directory");
        let registry_file = Utf8PathBuf::from_path_buf(scratch.path().join("pgadmin.tmp.json"))
            .expect("utf-8 scratch path");
        Self {
            scratch,
            registry: Arc::new(InMemoryResourceRegistry::new()),
            registry_file,
            last_result: None,
        }
    }

    /// Returns a generator for the `pgadmin` resource.
    ///
    /// # Panics
    ///
    /// Panics if the fixed resource name is rejected.
    #[must_use]
    pub fn generator(&self) -> TestGenerator {
        ServerRegistryGenerator::new(
            Arc::clone(&self.registry),
            Arc::new(CapStdRegistryFileSink::new()),
            ResourceName::new("pgadmin").expect("valid resource name"),
        )
    }
}

impl Default for RegistryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RegistryWorld {
    RegistryWorld::default()
}
