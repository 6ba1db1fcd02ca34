//! Enviro - PMS5003 reader
//!
//! Usage: `enviro [CONFIG]`
//!
//! Reads `CONFIG` (or `enviro.toml` in the working directory, if present)
//! and prints every particulate reading until the sensor channel fails.
//! `RUST_LOG` overrides the configured `log_level`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use enviro_host::config::HostConfig;
use enviro_host::session;

const DEFAULT_CONFIG: &str = "enviro.toml";

fn main() -> Result<()> {
    let config = load_config()?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config.env_filter()?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let host = enviro_host::init();
    info!(chips = host.gpio_chips.len(), "enviro starting");

    let session = session::open(&config.pms5003).context("cannot start the PMS5003")?;
    let handle = session::spawn(session)?;

    for reading in handle.readings() {
        let [pm1, pm2_5, pm10] = reading.mass_concentrations();
        let [n0_3, n0_5, n1_0, n2_5, n5_0, n10] = reading.particle_counts();
        println!(
            "PM1.0 {} ({}) | PM2.5 {} ({}) | PM10 {} ({}) ug/m3 | >0.3um {} >0.5um {} >1.0um {} >2.5um {} >5.0um {} >10um {} /0.1L",
            pm1.0, pm1.1, pm2_5.0, pm2_5.1, pm10.0, pm10.1, n0_3, n0_5, n1_0, n2_5, n5_0, n10
        );
    }

    let stats = handle.join()?;
    info!(frames = stats.frames, "enviro exiting");
    Ok(())
}

fn load_config() -> Result<HostConfig> {
    match std::env::args_os().nth(1) {
        Some(path) => HostConfig::load(&path)
            .with_context(|| format!("loading {}", Path::new(&path).display())),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            HostConfig::load(DEFAULT_CONFIG).with_context(|| format!("loading {}", DEFAULT_CONFIG))
        }
        None => Ok(HostConfig::default()),
    }
}
