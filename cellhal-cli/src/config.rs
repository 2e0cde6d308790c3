//! Agent configuration, read from a TOML file.
//!
//! The file lives at `$XDG_CONFIG_HOME/cellhal/modem.toml` unless `--config`
//! names another one. A missing default file is not an error; every section
//! falls back to its defaults.
//!
//! ```toml
//! [modem]
//! interface_name = "wwan0"
//! network_available = true
//!
//! [options]
//! network_start_timeout_secs = 60
//! ```

use anyhow::{Context, Result};
use cellhal::{InitConfig, ModemOptions, ProfileDescriptor, SimulatedModemConfig};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Behavior of the modem backend
    pub modem: SimulatedModemConfig,
    pub options: OptionsConfig,
    /// Applied once at startup when present
    pub init: Option<InitConfig>,
    /// Profiles created at startup, after `init`
    pub profiles: Vec<ProfileDescriptor>,
}

/// File form of [`ModemOptions`], with timeouts in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    pub event_capacity: usize,
    pub profile_timeout_secs: u64,
    pub network_start_timeout_secs: u64,
    pub check_outputs: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        let options = ModemOptions::default();
        Self {
            event_capacity: options.event_capacity,
            profile_timeout_secs: options.profile_timeout.as_secs(),
            network_start_timeout_secs: options.network_start_timeout.as_secs(),
            check_outputs: options.check_outputs,
        }
    }
}

impl OptionsConfig {
    pub fn to_options(&self) -> ModemOptions {
        ModemOptions::new()
            .with_event_capacity(self.event_capacity.max(1))
            .with_profile_timeout(Duration::from_secs(self.profile_timeout_secs))
            .with_network_start_timeout(Duration::from_secs(self.network_start_timeout_secs))
            .with_check_outputs(self.check_outputs)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("cellhal");
    path.push("modem.toml");
    Some(path)
}

/// Loads the configuration.
///
/// An explicit path must exist. Without one, the default location is used
/// if a file is there.
pub fn load(path: Option<&Path>) -> Result<AgentConfig> {
    if let Some(path) = path {
        return read(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => read(&path),
        _ => {
            debug!("No configuration file, using defaults");
            Ok(AgentConfig::default())
        }
    }
}

pub fn parse(text: &str) -> Result<AgentConfig> {
    Ok(toml::from_str(text)?)
}

fn read(path: &Path) -> Result<AgentConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = parse(&text)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellhal::{IpFamily, PdpType, RadioTechPreference};

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse("").unwrap(), AgentConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse(
            r#"
            [modem]
            interface_name = "wwan1"
            network_available = false

            [options]
            network_start_timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.modem.interface_name, "wwan1");
        assert!(!config.modem.network_available);
        assert!(config.modem.present);
        assert_eq!(config.options.network_start_timeout_secs, 5);

        let options = config.options.to_options();
        assert_eq!(options.network_start_timeout, Duration::from_secs(5));
        assert_eq!(
            options.profile_timeout,
            ModemOptions::default().profile_timeout
        );
        assert!(config.init.is_none());
    }

    #[test]
    fn test_init_and_profiles() {
        let config = parse(
            r#"
            [init]
            ip_family = "Ipv4v6"
            preferred_technology = "Lte"

            [init.default_profile]
            profile_id = 1
            profile_type = "ThreeGpp"
            pdp_context_number = 1
            pdp_type = "Ipv4v6"
            authentication = "None"
            network_config = "Nas"
            profile_name = "internet"
            apn = "internet.example"
            username = ""
            password = ""
            proxy = ""
            proxy_port = 0
            no_roaming = false
            apn_disabled = false
            is_default = true

            [[profiles]]
            profile_id = 2
            profile_type = "ThreeGpp"
            pdp_context_number = 2
            pdp_type = "Ipv4"
            authentication = "Pap"
            network_config = "Dhcp"
            profile_name = "iot"
            apn = "iot.example"
            username = "device"
            password = "secret"
            proxy = ""
            proxy_port = 0
            no_roaming = true
            apn_disabled = false
            is_default = false
            "#,
        )
        .unwrap();

        let init = config.init.unwrap();
        assert_eq!(init.ip_family, IpFamily::Ipv4v6);
        assert_eq!(init.preferred_technology, RadioTechPreference::Lte);
        assert!(init.default_profile.is_default);
        assert_eq!(config.profiles.len(), 1);
        assert_eq!(config.profiles[0].pdp_type, PdpType::Ipv4);
        assert!(config.profiles[0].no_roaming);
    }

    #[test]
    fn test_unknown_radio_technology_rejected() {
        let err = parse(
            r#"
            [modem]
            supported_rat = "GSM,WIMAX"
            "#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("WIMAX"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let path = std::env::temp_dir().join("cellhal-no-such-config.toml");
        assert!(load(Some(&path)).is_err());
    }
}
