//! Runs the Anvil development app host.
//!
//! Usage:
//!
//! ```text
//! ANVIL_SETTINGS=appsettings.json anvil-apphost
//! ```
//!
//! Settings are read from the JSON file named by `ANVIL_SETTINGS`, when set,
//! and overlaid with environment variables (`Parameters__pgPassword`,
//! `PERSISTENT_CONTAINERS`, `PgAdmin__Port`). `ANVIL_LOG` controls log
//! filtering.
//!
//! The app host directory (`AppHost__Directory`, default `.`) must contain a
//! `Properties/` directory; the pgAdmin server registry is written to
//! `Properties/pgadmin.tmp.json` there. Running from the repository root
//! satisfies this.

use anvil::apphost::configure;
use anvil::config::AppHostConfig;
use anvil::telemetry::init_tracing;
use anvil::topology::{ports::ResourceRegistry, services::AppHostBuilder};
use camino::Utf8PathBuf;
use std::path::PathBuf;
use tracing::{debug, info};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const SETTINGS_ENV: &str = "ANVIL_SETTINGS";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing()?;

    let settings = std::env::var_os(SETTINGS_ENV)
        .map(|path| {
            Utf8PathBuf::from_path_buf(PathBuf::from(path))
                .map_err(|raw| format!("{SETTINGS_ENV} is not valid UTF-8: {}", raw.display()))
        })
        .transpose()?;
    let config = AppHostConfig::load(settings.as_deref())?;

    let builder = AppHostBuilder::new(config);
    configure(&builder)?;
    let host = builder.build();

    let summary = host.run().await?;
    for allocated in &summary.allocations {
        info!(
            resource = %allocated.resource,
            endpoint = %allocated.endpoint,
            address = allocated.allocation.address(),
            port = allocated.allocation.port(),
            "endpoint ready"
        );
    }
    for resource in host.registry().resources()? {
        for (variable, value) in host.redacted_environment_for(resource.name())? {
            debug!(resource = %resource.name(), %variable, %value, "resolved environment");
        }
    }
    info!(
        endpoints = summary.allocations.len(),
        handlers = summary.allocation_handlers,
        "app host started"
    );
    Ok(())
}
