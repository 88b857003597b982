//! Server configuration for `oscline listen`

use anyhow::{Context, Result};
use oscline_router::OscServerConfig;
use std::path::Path;

/// Read an `OscServerConfig` from a TOML file
pub fn load(path: &Path) -> Result<OscServerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

pub fn parse(text: &str) -> Result<OscServerConfig> {
    let config: OscServerConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Replace host and/or port of `bind_addr`, keeping whichever part is not given
pub fn override_bind(config: &mut OscServerConfig, host: Option<&str>, port: Option<u16>) {
    if host.is_none() && port.is_none() {
        return;
    }

    let (current_host, current_port) = match config.bind_addr.rsplit_once(':') {
        Some((h, p)) => (h, p.parse().unwrap_or(oscline_core::DEFAULT_PORT)),
        None => (config.bind_addr.as_str(), oscline_core::DEFAULT_PORT),
    };

    config.bind_addr = format!(
        "{}:{}",
        host.unwrap_or(current_host),
        port.unwrap_or(current_port)
    );
}
