//! The vendor seam of the HAL.
//!
//! [`ModemBackend`] is the boundary between the contract and whatever talks
//! to the modem (AT commands, QMI, MBIM, a vendor SDK). Every method is one
//! hardware interaction; validation, state tracking and conformance checks
//! live above it in [`CellularModem`](crate::CellularModem), so a backend
//! only has to report what the hardware says.
//!
//! [`SimulatedModem`] is the reference implementation used by the tests and
//! the command-line agent.

mod simulated;

pub use simulated::{SimulatedModem, SimulatedModemConfig};

use async_trait::async_trait;

use crate::Result;
use crate::api::models::{
    IpReadyInfo, ModemIdentity, NetworkIpType, NetworkScanResult, OperatingMode, PacketStats,
    PlmnInfo, ProfileDescriptor, RadioTechSet, SignalInfo, UiccSlotInfo,
};

/// Packet domain state as the modem reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkState {
    /// Attached to the packet domain
    pub attached: bool,
    /// IP types with an active PDP context
    pub contexts: Vec<NetworkIpType>,
}

/// Hardware interactions a modem implementation provides.
///
/// Implementations must be cheap to share: the HAL holds one behind an
/// `Arc` and calls it while holding its own state lock, so a backend never
/// sees two calls at once from the same [`CellularModem`](crate::CellularModem).
#[async_trait]
pub trait ModemBackend: Send + Sync {
    /// Whether modem hardware is detected.
    async fn is_present(&self) -> bool;

    /// IMEI, IMEISV and firmware version.
    async fn identity(&self) -> Result<ModemIdentity>;

    /// Number of physical UICC slots.
    async fn uicc_slot_count(&self) -> Result<u32>;

    /// Snapshot of one slot. `index` is always below `uicc_slot_count`.
    async fn uicc_slot(&self, index: u32) -> Result<UiccSlotInfo>;

    /// Powers the card in a slot on or off.
    async fn set_sim_power(&self, index: u32, enable: bool) -> Result<()>;

    /// Current signal quality.
    async fn signal_info(&self) -> Result<SignalInfo>;

    /// Current registration, `None` while unregistered.
    async fn plmn_info(&self) -> Result<Option<PlmnInfo>>;

    /// Networks visible to the modem.
    async fn scan_networks(&self) -> Result<Vec<NetworkScanResult>>;

    /// Cumulative traffic counters.
    async fn packet_statistics(&self) -> Result<PacketStats>;

    /// Technologies the modem is attached on right now.
    async fn current_radio_technology(&self) -> Result<RadioTechSet>;

    /// Technologies the modem hardware supports.
    async fn supported_radio_technology(&self) -> Result<RadioTechSet>;

    /// Applies a technology preference.
    async fn set_preferred_radio_technology(&self, rat: RadioTechSet) -> Result<()>;

    /// Writes (creates or replaces) a profile in modem storage.
    async fn write_profile(&self, profile: &ProfileDescriptor) -> Result<()>;

    /// Removes a profile from modem storage.
    async fn erase_profile(&self, profile_id: u32) -> Result<()>;

    /// Attaches to the packet domain.
    ///
    /// Fails with [`HalError::NetworkUnavailable`](crate::HalError::NetworkUnavailable)
    /// when the network cannot be reached.
    async fn attach(&self) -> Result<()>;

    /// Detaches from the packet domain.
    async fn detach(&self) -> Result<()>;

    /// Activates a PDP context and returns its IP configuration.
    async fn activate_context(
        &self,
        profile: &ProfileDescriptor,
        ip_type: NetworkIpType,
    ) -> Result<IpReadyInfo>;

    /// Deactivates the PDP context of the given IP type.
    async fn deactivate_context(&self, ip_type: NetworkIpType) -> Result<()>;

    /// Current attach and PDP context state.
    ///
    /// The network may drop either on its own, so this is read before the
    /// HAL relies on what it last set up.
    async fn link_state(&self) -> Result<LinkState>;

    /// Switches the radio power mode.
    async fn set_operating_mode(&self, mode: OperatingMode) -> Result<()>;

    /// Restarts the modem.
    async fn reset(&self) -> Result<()>;

    /// Restores modem storage to factory defaults and restarts.
    async fn factory_reset(&self) -> Result<()>;
}
