//! A deterministic, in-memory modem.
//!
//! Behaves like a well-formed modem: it registers when the radio is on, a
//! usable card is inserted and the network is reachable, keeps written
//! profiles, and grows its traffic counters while contexts are active.
//! Tests use the `set_*` methods to inject faults.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::Result;
use crate::api::models::{
    HalError, IpReadyInfo, ModemIdentity, NetworkIpType, NetworkScanResult, OperatingMode,
    PacketStats, PlmnInfo, ProfileDescriptor, RadioTechSet, RegisteredService,
    RegistrationStatus, SignalInfo, UiccApplication, UiccFormFactor, UiccSlotInfo, UiccStatus,
};
use crate::backend::{LinkState, ModemBackend};

/// Bytes added to the send counter per active context on each stats read.
const SIM_BYTES_PER_READ: u64 = 1_200;
/// Payload size used to derive packet counts.
const SIM_PACKET_SIZE: u64 = 600;

/// Configuration of a [`SimulatedModem`].
///
/// Every field has a default, so a configuration file only needs the
/// values it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedModemConfig {
    /// Modem hardware detected
    pub present: bool,
    /// The packet network can be reached
    pub network_available: bool,
    pub identity: ModemIdentity,
    /// One entry per physical slot
    pub slots: Vec<UiccSlotInfo>,
    pub signal: SignalInfo,
    /// Network reported while registered
    pub plmn: PlmnInfo,
    /// Scan results
    pub networks: Vec<NetworkScanResult>,
    pub supported_rat: RadioTechSet,
    /// Technologies reported while attached
    pub current_rat: RadioTechSet,
    /// WAN interface carrying data sessions
    pub interface_name: String,
    pub mtu: u32,
}

impl Default for SimulatedModemConfig {
    fn default() -> Self {
        Self {
            present: true,
            network_available: true,
            identity: ModemIdentity {
                imei: "356938035643809".into(),
                imeisv: "356938035643801".into(),
                firmware_version: "SIM-LTE-1.4.2".into(),
            },
            slots: vec![
                UiccSlotInfo {
                    slot_enabled: true,
                    card_present: true,
                    card_enabled: true,
                    form_factor: UiccFormFactor::FourFf,
                    application: UiccApplication::Usim,
                    status: UiccStatus::Valid,
                    operator_name: "Example Mobile".into(),
                    iccid: "8901260000000000017".into(),
                    msisdn: "15555550100".into(),
                },
                UiccSlotInfo {
                    slot_enabled: true,
                    card_present: false,
                    card_enabled: false,
                    form_factor: UiccFormFactor::ThreeFf,
                    application: UiccApplication::Usim,
                    status: UiccStatus::Empty,
                    operator_name: String::new(),
                    iccid: String::new(),
                    msisdn: String::new(),
                },
            ],
            signal: SignalInfo {
                rssi: -67,
                rsrq: -10.5,
                rsrp: -95,
                snr: 12,
                tx_power: 18,
            },
            plmn: PlmnInfo {
                network_name: "Example Mobile".into(),
                mcc: 310,
                mnc: 260,
                roaming_enabled: false,
                area_code: 12_345,
                cell_id: 0x01A2_B3C4,
                registration_status: RegistrationStatus::Home,
                registered_service: RegisteredService::CsPs,
            },
            networks: vec![
                NetworkScanResult {
                    network_name: "Example Mobile".into(),
                    mcc: 310,
                    mnc: 260,
                    allowed: true,
                },
                NetworkScanResult {
                    network_name: "Other Carrier".into(),
                    mcc: 310,
                    mnc: 410,
                    allowed: false,
                },
            ],
            supported_rat: RadioTechSet::GSM | RadioTechSet::UMTS | RadioTechSet::LTE,
            current_rat: RadioTechSet::LTE,
            interface_name: "wwan0".into(),
            mtu: 1500,
        }
    }
}

#[derive(Debug)]
struct SimState {
    config: SimulatedModemConfig,
    mode: OperatingMode,
    attached: bool,
    preferred: RadioTechSet,
    profiles: BTreeMap<u32, ProfileDescriptor>,
    contexts: Vec<NetworkIpType>,
    stats: PacketStats,
}

impl SimState {
    fn registered(&self) -> bool {
        self.config.present
            && self.mode == OperatingMode::Online
            && self.config.network_available
            && self
                .config
                .slots
                .iter()
                .any(|s| s.card_present && s.card_enabled && s.status == UiccStatus::Valid)
    }

    fn drop_link(&mut self) {
        self.attached = false;
        self.contexts.clear();
    }
}

/// In-memory [`ModemBackend`] used as the reference implementation.
///
/// # Example
///
/// ```rust
/// use cellhal::{CellularModem, ModemOptions, SimulatedModem};
/// use std::sync::Arc;
///
/// # async fn example() -> cellhal::Result<()> {
/// let sim = Arc::new(SimulatedModem::default());
/// let modem = CellularModem::new(sim.clone(), ModemOptions::default());
///
/// sim.set_network_available(false);
/// assert!(modem.attach().await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SimulatedModem {
    state: Mutex<SimState>,
}

impl Default for SimulatedModem {
    fn default() -> Self {
        Self::new(SimulatedModemConfig::default())
    }
}

impl SimulatedModem {
    /// Creates a simulated modem from a configuration.
    pub fn new(config: SimulatedModemConfig) -> Self {
        Self {
            state: Mutex::new(SimState {
                config,
                mode: OperatingMode::Online,
                attached: false,
                preferred: RadioTechSet::AUTO,
                profiles: BTreeMap::new(),
                contexts: Vec::new(),
                stats: PacketStats::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulates the modem appearing or disappearing.
    pub fn set_present(&self, present: bool) {
        let mut state = self.lock();
        state.config.present = present;
        if !present {
            state.drop_link();
        }
    }

    /// Simulates coverage being gained or lost.
    pub fn set_network_available(&self, available: bool) {
        let mut state = self.lock();
        state.config.network_available = available;
        if !available {
            state.drop_link();
        }
    }

    /// Replaces the reported signal, including out-of-range readings.
    pub fn set_signal(&self, signal: SignalInfo) {
        self.lock().config.signal = signal;
    }

    /// Replaces the reported PLMN.
    pub fn set_plmn(&self, plmn: PlmnInfo) {
        self.lock().config.plmn = plmn;
    }

    /// Replaces the hardware view of one slot. Out-of-range indexes are
    /// ignored.
    pub fn set_slot(&self, index: u32, slot: UiccSlotInfo) {
        let mut state = self.lock();
        if let Some(entry) = state.config.slots.get_mut(index as usize) {
            *entry = slot;
        }
    }

    /// Overwrites the traffic counters.
    pub fn set_packet_stats(&self, stats: PacketStats) {
        self.lock().stats = stats;
    }

    /// Profiles currently held in modem storage.
    pub fn stored_profiles(&self) -> Vec<ProfileDescriptor> {
        self.lock().profiles.values().cloned().collect()
    }

    /// Current radio power mode.
    pub fn operating_mode(&self) -> OperatingMode {
        self.lock().mode
    }

    /// Whether the packet domain is attached.
    pub fn is_attached(&self) -> bool {
        self.lock().attached
    }

    /// Technology preference last applied.
    pub fn preferred_radio_technology(&self) -> RadioTechSet {
        self.lock().preferred
    }

    fn ip_config(config: &SimulatedModemConfig, ip_type: NetworkIpType) -> IpReadyInfo {
        let (ip_address, subnet_mask, default_gateway, dns_primary, dns_secondary) = match ip_type
        {
            NetworkIpType::Ipv6 => (
                "2001:db8:10::20",
                "ffff:ffff:ffff:ffff::",
                "fe80::1",
                "2001:4860:4860::8888",
                "2001:4860:4860::8844",
            ),
            NetworkIpType::Ipv4 | NetworkIpType::Unknown => (
                "10.64.12.34",
                "255.255.255.252",
                "10.64.12.33",
                "8.8.8.8",
                "8.8.4.4",
            ),
        };

        IpReadyInfo {
            interface_name: config.interface_name.clone(),
            ip_type,
            ip_address: ip_address.into(),
            subnet_mask: subnet_mask.into(),
            default_gateway: default_gateway.into(),
            dns_primary: dns_primary.into(),
            dns_secondary: dns_secondary.into(),
            domains: "mobile.example".into(),
            mtu: config.mtu,
        }
    }
}

#[async_trait]
impl ModemBackend for SimulatedModem {
    async fn is_present(&self) -> bool {
        self.lock().config.present
    }

    async fn identity(&self) -> Result<ModemIdentity> {
        let state = self.lock();
        if !state.config.present {
            return Err(HalError::ModemNotPresent);
        }
        Ok(state.config.identity.clone())
    }

    async fn uicc_slot_count(&self) -> Result<u32> {
        Ok(self.lock().config.slots.len() as u32)
    }

    async fn uicc_slot(&self, index: u32) -> Result<UiccSlotInfo> {
        self.lock()
            .config
            .slots
            .get(index as usize)
            .cloned()
            .ok_or(HalError::InvalidSlot(index))
    }

    async fn set_sim_power(&self, index: u32, enable: bool) -> Result<()> {
        let mut state = self.lock();
        let slot = state
            .config
            .slots
            .get_mut(index as usize)
            .ok_or(HalError::InvalidSlot(index))?;
        slot.card_enabled = enable && slot.card_present;
        debug!("sim: slot {index} card power -> {}", slot.card_enabled);
        if !state.registered() {
            state.drop_link();
        }
        Ok(())
    }

    async fn signal_info(&self) -> Result<SignalInfo> {
        Ok(self.lock().config.signal)
    }

    async fn plmn_info(&self) -> Result<Option<PlmnInfo>> {
        let state = self.lock();
        Ok(state.registered().then(|| state.config.plmn.clone()))
    }

    async fn scan_networks(&self) -> Result<Vec<NetworkScanResult>> {
        let state = self.lock();
        if state.mode != OperatingMode::Online {
            return Err(HalError::ModemOffline(state.mode));
        }
        Ok(state.config.networks.clone())
    }

    async fn packet_statistics(&self) -> Result<PacketStats> {
        let mut state = self.lock();
        let active = state.contexts.len() as u64;
        if active > 0 {
            let stats = &mut state.stats;
            stats.bytes_sent += SIM_BYTES_PER_READ * active;
            stats.bytes_received += SIM_BYTES_PER_READ * 4 * active;
            stats.packets_sent += SIM_BYTES_PER_READ * active / SIM_PACKET_SIZE;
            stats.packets_received += SIM_BYTES_PER_READ * 4 * active / SIM_PACKET_SIZE;
            stats.upstream_max_bit_rate = 50_000_000;
            stats.downstream_max_bit_rate = 150_000_000;
        }
        Ok(state.stats)
    }

    async fn current_radio_technology(&self) -> Result<RadioTechSet> {
        Ok(self.lock().config.current_rat)
    }

    async fn supported_radio_technology(&self) -> Result<RadioTechSet> {
        Ok(self.lock().config.supported_rat)
    }

    async fn set_preferred_radio_technology(&self, rat: RadioTechSet) -> Result<()> {
        self.lock().preferred = rat;
        Ok(())
    }

    async fn write_profile(&self, profile: &ProfileDescriptor) -> Result<()> {
        self.lock()
            .profiles
            .insert(profile.profile_id, profile.clone());
        Ok(())
    }

    async fn erase_profile(&self, profile_id: u32) -> Result<()> {
        self.lock().profiles.remove(&profile_id);
        Ok(())
    }

    async fn attach(&self) -> Result<()> {
        let mut state = self.lock();
        if !state.registered() {
            return Err(HalError::NetworkUnavailable);
        }
        state.attached = true;
        Ok(())
    }

    async fn detach(&self) -> Result<()> {
        self.lock().drop_link();
        Ok(())
    }

    async fn activate_context(
        &self,
        _profile: &ProfileDescriptor,
        ip_type: NetworkIpType,
    ) -> Result<IpReadyInfo> {
        let mut state = self.lock();
        if !state.attached || !state.registered() {
            return Err(HalError::NetworkUnavailable);
        }
        if !state.contexts.contains(&ip_type) {
            state.contexts.push(ip_type);
        }
        Ok(Self::ip_config(&state.config, ip_type))
    }

    async fn deactivate_context(&self, ip_type: NetworkIpType) -> Result<()> {
        let mut state = self.lock();
        match ip_type {
            NetworkIpType::Unknown => state.contexts.clear(),
            other => state.contexts.retain(|t| *t != other),
        }
        Ok(())
    }

    async fn link_state(&self) -> Result<LinkState> {
        let state = self.lock();
        Ok(LinkState {
            attached: state.attached,
            contexts: state.contexts.clone(),
        })
    }

    async fn set_operating_mode(&self, mode: OperatingMode) -> Result<()> {
        let mut state = self.lock();
        if !state.config.present {
            return Err(HalError::ModemNotPresent);
        }
        state.mode = mode;
        if mode != OperatingMode::Online {
            state.drop_link();
        }
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.lock();
        state.drop_link();
        state.mode = OperatingMode::Online;
        state.stats = PacketStats::default();
        Ok(())
    }

    async fn factory_reset(&self) -> Result<()> {
        let mut state = self.lock();
        state.drop_link();
        state.mode = OperatingMode::Online;
        state.stats = PacketStats::default();
        state.profiles.clear();
        state.preferred = RadioTechSet::AUTO;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn attach_requires_coverage() {
        let sim = SimulatedModem::default();
        sim.attach().await.unwrap();
        assert!(sim.is_attached());

        sim.set_network_available(false);
        assert!(!sim.is_attached());
        assert_eq!(sim.link_state().await.unwrap(), LinkState::default());
        assert!(matches!(
            sim.attach().await,
            Err(HalError::NetworkUnavailable)
        ));
    }

    #[tokio::test]
    async fn counters_grow_only_with_active_context() {
        let sim = SimulatedModem::default();
        let idle = sim.packet_statistics().await.unwrap();
        assert_eq!(idle, PacketStats::default());

        let profile = crate::ProfileBuilder::new(1, "internet").build().unwrap();
        sim.attach().await.unwrap();
        sim.activate_context(&profile, NetworkIpType::Ipv4)
            .await
            .unwrap();
        let first = sim.packet_statistics().await.unwrap();
        let second = sim.packet_statistics().await.unwrap();
        assert!(second.bytes_sent > first.bytes_sent);
    }

    #[tokio::test]
    async fn powering_off_the_only_card_unregisters() {
        let sim = SimulatedModem::default();
        sim.attach().await.unwrap();
        sim.set_sim_power(0, false).await.unwrap();
        assert!(sim.plmn_info().await.unwrap().is_none());
        assert!(!sim.is_attached());
    }
}
