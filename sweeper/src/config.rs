use sweep_config::load_config;
use sweep_config::shared::SweeperConfig;

/// Loads the [`SweeperConfig`] and validates it.
pub fn load_sweeper_config() -> anyhow::Result<SweeperConfig> {
    let config = load_config::<SweeperConfig>()?;
    config.validate()?;

    Ok(config)
}
