//! Modem state kept between agent runs.
//!
//! Each run opens a fresh backend, so whatever the commands changed is
//! written to `$XDG_DATA_HOME/cellhal/state.toml` (or `--state`) afterwards
//! and applied again when the next run opens the modem. Data sessions end
//! with the process; `cellhal shell` keeps one agent alive for them.

use anyhow::{Context, Result};
use cellhal::{CellularModem, OperatingMode, ProfileDescriptor, RadioTechSet};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedState {
    /// `init` has run and no factory reset followed
    pub initialized: bool,
    pub mode: OperatingMode,
    pub preferred_rat: Option<RadioTechSet>,
    /// Card power, one entry per slot
    pub card_power: Vec<bool>,
    pub profiles: Vec<ProfileDescriptor>,
}

impl SavedState {
    /// Reads everything worth keeping from a present modem.
    pub async fn capture(modem: &CellularModem) -> Result<Self> {
        let mut card_power = Vec::new();
        for index in 0..modem.total_uicc_slots().await? {
            card_power.push(modem.uicc_slot_info(index).await?.card_enabled);
        }

        Ok(Self {
            initialized: modem.is_initialized().await,
            mode: modem.operating_mode().await,
            preferred_rat: Some(modem.preferred_radio_technology().await?),
            card_power,
            profiles: modem.profile_list().await?,
        })
    }
}

pub fn default_state_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(std::env::temp_dir);
    path.push("cellhal");
    path.push("state.toml");
    path
}

/// Loads the saved state, `None` when nothing was saved yet.
pub fn load(path: &Path) -> Result<Option<SavedState>> {
    if !path.exists() {
        debug!("No saved state at {}", path.display());
        return Ok(None);
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let state = toml::from_str(&text)
        .with_context(|| format!("Invalid saved state in {}", path.display()))?;
    Ok(Some(state))
}

pub fn save(path: &Path, state: &SavedState) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    fs::write(path, toml::to_string_pretty(state)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    debug!("Saved modem state to {}", path.display());
    Ok(())
}

/// Captures and saves the modem state. An absent modem leaves the file
/// alone.
pub async fn persist(modem: &CellularModem, path: &Path) -> Result<()> {
    if !modem.is_modem_present().await {
        return Ok(());
    }
    save(path, &SavedState::capture(modem).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellhal::{ModemOptions, ProfileBuilder, SimulatedModem};
    use std::sync::Arc;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("cellhal-state-{}-{name}", std::process::id()))
            .join("state.toml")
    }

    #[test]
    fn test_missing_file_is_none() {
        assert!(load(&temp_path("missing")).unwrap().is_none());
    }

    #[test]
    fn test_saved_state_survives_the_file() {
        let path = temp_path("file");
        let state = SavedState {
            initialized: true,
            mode: OperatingMode::LowPower,
            preferred_rat: Some(RadioTechSet::UMTS | RadioTechSet::LTE),
            card_power: vec![true, false],
            profiles: vec![
                ProfileBuilder::new(4, "iot")
                    .apn("iot.example")
                    .build()
                    .unwrap(),
            ],
        };

        save(&path, &state).unwrap();
        assert_eq!(load(&path).unwrap(), Some(state));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_capture_reads_the_modem() {
        let sim = Arc::new(SimulatedModem::default());
        let modem = CellularModem::new(sim, ModemOptions::default());
        modem.sim_power_enable(0, false).await.unwrap();

        let state = SavedState::capture(&modem).await.unwrap();
        assert!(!state.initialized);
        assert_eq!(state.mode, OperatingMode::Online);
        assert_eq!(state.card_power, vec![false, false]);
        assert!(state.profiles.is_empty());
    }
}
