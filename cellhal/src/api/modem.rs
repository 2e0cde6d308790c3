use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

use crate::Result;
use crate::api::models::{
    InitConfig, InterfaceStatus, IpReadyInfo, ModemEvent, ModemOperatingConfig, ModemOptions,
    NetworkIpType, NetworkScanResult, OperatingMode, PacketServiceEvent, PacketStats, PlmnInfo,
    ProfileDescriptor, ProfileEvent, RadioTechSet, RegistrationEvent, SignalInfo,
    SlotSelectionEvent, UiccSlotInfo, UiccStatus,
};
use crate::backend::ModemBackend;
use crate::core::device::{self, IdentityField};
use crate::core::slots::{self, CardField};
use crate::core::state::ModemContext;
use crate::core::state_wait::Completion;
use crate::core::{power, profiles, session};
use crate::monitoring::events as event_monitor;

/// Typed interface to one cellular modem.
///
/// This is the main entry point of the crate. It validates every input
/// before touching the modem, keeps track of SIM, registration, profile and
/// data session state, and checks everything the backend reports against
/// the contract ranges.
///
/// # Creating an Instance
///
/// ```rust
/// use cellhal::{CellularModem, ModemOptions, SimulatedModem};
/// use std::sync::Arc;
///
/// let modem = CellularModem::new(Arc::new(SimulatedModem::default()), ModemOptions::default());
/// ```
///
/// # Examples
///
/// ## Bringing up data
///
/// ```no_run
/// use cellhal::{
///     CellularModem, InitConfig, IpFamily, ModemOptions, NetworkIpType, ProfileBuilder,
///     RadioTechPreference, SimulatedModem,
/// };
/// use std::sync::Arc;
///
/// # async fn example() -> cellhal::Result<()> {
/// let modem = CellularModem::new(Arc::new(SimulatedModem::default()), ModemOptions::default());
///
/// modem
///     .init(InitConfig {
///         ip_family: IpFamily::Ipv4v6,
///         preferred_technology: RadioTechPreference::Lte,
///         default_profile: ProfileBuilder::new(1, "internet").apn("internet").build()?,
///     })
///     .await?;
///
/// let ip = modem.start_network(NetworkIpType::Ipv4, None).await?.await?;
/// println!("{} is up with {}", ip.interface_name, ip.ip_address);
/// # Ok(())
/// # }
/// ```
///
/// ## Watching registration
///
/// ```no_run
/// use cellhal::{CellularModem, ModemOptions, SimulatedModem};
/// use std::sync::Arc;
/// use tokio::sync::watch;
///
/// # async fn example() -> cellhal::Result<()> {
/// let modem = CellularModem::new(Arc::new(SimulatedModem::default()), ModemOptions::default());
/// let (_stop, shutdown) = watch::channel(());
///
/// modem
///     .monitor_device_registration(shutdown, |event| {
///         println!("registration: {} (roaming={})", event.status, event.roaming);
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// `CellularModem` is `Clone` and can be shared across tasks. Clones share
/// the same state; operations on one modem are serialized.
#[derive(Clone)]
pub struct CellularModem {
    ctx: Arc<ModemContext>,
}

impl fmt::Debug for CellularModem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellularModem")
            .field("options", &self.ctx.options)
            .finish_non_exhaustive()
    }
}

impl CellularModem {
    /// Creates a modem on top of a backend.
    pub fn new(backend: Arc<dyn ModemBackend>, options: ModemOptions) -> Self {
        Self {
            ctx: Arc::new(ModemContext::new(backend, options)),
        }
    }

    pub fn options(&self) -> &ModemOptions {
        &self.ctx.options
    }

    /// Subscribes to every event the modem publishes.
    pub fn subscribe(&self) -> broadcast::Receiver<ModemEvent> {
        self.ctx.subscribe()
    }

    /// Returns `true` if modem hardware is detected.
    pub async fn is_modem_present(&self) -> bool {
        self.ctx.backend.is_present().await
    }

    /// Initialization with the IP family preference, the preferred
    /// technology and the default profile. A later call replaces all three.
    ///
    /// # Errors
    ///
    /// Returns `HalError::ProfileInUse` if a running session uses the
    /// default profile.
    pub async fn init(&self, config: InitConfig) -> Result<()> {
        power::init(&self.ctx, config).await
    }

    /// Returns `true` once `init` succeeded and no factory reset followed.
    pub async fn is_initialized(&self) -> bool {
        power::is_initialized(&self.ctx).await
    }

    pub async fn imei(&self) -> Result<String> {
        device::identity(&self.ctx, IdentityField::Imei).await
    }

    pub async fn imeisv(&self) -> Result<String> {
        device::identity(&self.ctx, IdentityField::Imeisv).await
    }

    pub async fn firmware_version(&self) -> Result<String> {
        device::identity(&self.ctx, IdentityField::FirmwareVersion).await
    }

    /// ICCID of the card in the active slot.
    ///
    /// # Errors
    ///
    /// Returns `HalError::NoActiveCard` when the active slot holds no
    /// powered card.
    pub async fn current_iccid(&self) -> Result<String> {
        slots::card_identifier(&self.ctx, CardField::Iccid).await
    }

    /// MSISDN of the card in the active slot.
    pub async fn current_msisdn(&self) -> Result<String> {
        slots::card_identifier(&self.ctx, CardField::Msisdn).await
    }

    /// Technologies the modem is currently attached on.
    pub async fn current_radio_technology(&self) -> Result<RadioTechSet> {
        device::current_radio_technology(&self.ctx).await
    }

    /// The technology preference in effect (`AUTO` until set).
    pub async fn preferred_radio_technology(&self) -> Result<RadioTechSet> {
        device::preferred_radio_technology(&self.ctx).await
    }

    pub async fn supported_radio_technology(&self) -> Result<RadioTechSet> {
        device::supported_radio_technology(&self.ctx).await
    }

    /// Sets the technology preference from its text form, e.g. `"LTE"` or
    /// `"UMTS,LTE"`.
    ///
    /// # Errors
    ///
    /// Returns `HalError::InvalidRadioTechnology` for text outside the
    /// vocabulary and `HalError::UnsupportedRadioTechnology` when the modem
    /// does not support a named technology.
    pub async fn set_preferred_radio_technology(&self, rat: &str) -> Result<()> {
        device::set_preferred_radio_technology(&self.ctx, rat).await
    }

    pub async fn signal_info(&self) -> Result<SignalInfo> {
        device::signal_info(&self.ctx).await
    }

    /// The network the modem is registered on.
    ///
    /// # Errors
    ///
    /// Returns `HalError::NotRegistered` while unregistered.
    pub async fn current_plmn_information(&self) -> Result<PlmnInfo> {
        device::plmn_info(&self.ctx).await
    }

    /// Scans for visible networks. The modem must be online.
    pub async fn available_networks(&self) -> Result<Vec<NetworkScanResult>> {
        device::available_networks(&self.ctx).await
    }

    /// Reads the traffic counters.
    ///
    /// # Errors
    ///
    /// Returns `HalError::CounterRegression` if a cumulative counter went
    /// down since the previous reading without a modem reset in between.
    pub async fn packet_statistics(&self) -> Result<PacketStats> {
        device::packet_statistics(&self.ctx).await
    }

    pub async fn interface_status(&self) -> Result<InterfaceStatus> {
        device::interface_status(&self.ctx).await
    }

    pub async fn total_uicc_slots(&self) -> Result<u32> {
        slots::slot_count(&self.ctx).await
    }

    /// Snapshot of one slot by zero-based index.
    pub async fn uicc_slot_info(&self, index: u32) -> Result<UiccSlotInfo> {
        slots::slot_info(&self.ctx, index).await
    }

    pub async fn active_card_status(&self) -> Result<UiccStatus> {
        slots::active_card_status(&self.ctx).await
    }

    /// Powers the card in a slot on or off.
    pub async fn sim_power_enable(&self, index: u32, enable: bool) -> Result<()> {
        slots::sim_power(&self.ctx, index, enable).await
    }

    /// Selects the first slot with a usable card as the active slot.
    pub async fn select_device_slot(&self) -> Result<Completion<SlotSelectionEvent>> {
        slots::select_device_slot(&self.ctx).await
    }

    /// Monitors network registration changes.
    ///
    /// Runs until `shutdown` fires or its sender is dropped. Run it in a
    /// background task.
    pub async fn monitor_device_registration<F>(
        &self,
        shutdown: watch::Receiver<()>,
        callback: F,
    ) -> Result<()>
    where
        F: Fn(RegistrationEvent),
    {
        event_monitor::monitor_registration(&self.ctx, shutdown, callback).await
    }

    /// Monitors slot selection events.
    pub async fn monitor_slot_status<F>(
        &self,
        shutdown: watch::Receiver<()>,
        callback: F,
    ) -> Result<()>
    where
        F: Fn(SlotSelectionEvent),
    {
        event_monitor::monitor_slot_status(&self.ctx, shutdown, callback).await
    }

    /// Monitors data sessions going up or down.
    pub async fn monitor_packet_service<F>(
        &self,
        shutdown: watch::Receiver<()>,
        callback: F,
    ) -> Result<()>
    where
        F: Fn(PacketServiceEvent),
    {
        event_monitor::monitor_packet_service(&self.ctx, shutdown, callback).await
    }

    /// Creates a profile.
    ///
    /// Validation and the duplicate check happen before this returns; the
    /// completion resolves once the profile is stored on the modem.
    pub async fn profile_create(
        &self,
        profile: ProfileDescriptor,
    ) -> Result<Completion<ProfileEvent>> {
        profiles::create(&self.ctx, profile).await
    }

    /// Replaces an existing profile with the same id.
    pub async fn profile_modify(
        &self,
        profile: ProfileDescriptor,
    ) -> Result<Completion<ProfileEvent>> {
        profiles::modify(&self.ctx, profile).await
    }

    /// Deletes the profile with the descriptor's id.
    pub async fn profile_delete(
        &self,
        profile: ProfileDescriptor,
    ) -> Result<Completion<ProfileEvent>> {
        profiles::delete(&self.ctx, profile).await
    }

    /// All stored profiles, ordered by id.
    pub async fn profile_list(&self) -> Result<Vec<ProfileDescriptor>> {
        profiles::list(&self.ctx).await
    }

    /// Starts a data session of `ip_type`, with `profile` or the default
    /// profile from `init`.
    ///
    /// The completion resolves with the IP configuration once the session
    /// is up. Awaiting it has no timeout; use
    /// [`Completion::wait_timeout`] to bound it.
    pub async fn start_network(
        &self,
        ip_type: NetworkIpType,
        profile: Option<ProfileDescriptor>,
    ) -> Result<Completion<IpReadyInfo>> {
        session::start_network(&self.ctx, ip_type, profile).await
    }

    /// Stops the data session of `ip_type`; `Unknown` stops all of them.
    pub async fn stop_network(&self, ip_type: NetworkIpType) -> Result<()> {
        session::stop_network(&self.ctx, ip_type).await
    }

    /// Attaches to the packet domain.
    pub async fn attach(&self) -> Result<()> {
        session::attach(&self.ctx).await
    }

    /// Detaches from the packet domain, stopping every data session.
    pub async fn detach(&self) -> Result<()> {
        session::detach(&self.ctx).await
    }

    pub async fn operating_mode(&self) -> OperatingMode {
        power::operating_mode(&self.ctx).await
    }

    /// Switches the modem to an operating configuration.
    ///
    /// `Offline` and `LowPower` end every data session and the attach.
    /// `Reset` and `FactoryReset` behave like [`reset`](Self::reset) and
    /// [`factory_reset`](Self::factory_reset).
    pub async fn set_operating_configuration(&self, config: ModemOperatingConfig) -> Result<()> {
        power::set_operating_configuration(&self.ctx, config).await
    }

    /// Restarts the modem. Profiles and initialization are kept.
    pub async fn reset(&self) -> Result<()> {
        power::reset(&self.ctx).await
    }

    /// Restores factory defaults, clearing profiles and initialization.
    pub async fn factory_reset(&self) -> Result<()> {
        power::factory_reset(&self.ctx).await
    }
}
