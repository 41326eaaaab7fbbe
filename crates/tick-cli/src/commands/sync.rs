use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::Config;

/// Reports the configured sync target. Synchronisation itself is not
/// implemented.
pub fn sync_status(config: &Config) -> Result<()> {
    let masked = config.masked();
    let sync = &masked.sync;
    let Some(provider) = sync.provider.as_deref() else {
        println!("No sync provider configured.");
        println!("Set one with: tick config set sync.provider <name>");
        return Ok(());
    };

    println!("Sync provider: {}", provider.cyan());
    if let Some(endpoint) = &sync.endpoint {
        println!("Endpoint: {endpoint}");
    }
    println!(
        "Token: {}",
        sync.token.as_deref().unwrap_or("not set")
    );
    println!("{}", "Syncing is not available in this version.".yellow());
    Ok(())
}
