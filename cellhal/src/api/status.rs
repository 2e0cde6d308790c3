//! Status-code surface of the HAL.
//!
//! [`StatusApi`] mirrors the C-callable contract on top of a
//! [`CellularModem`]: every call returns [`RETURN_OK`] or [`RETURN_ERROR`],
//! inputs arrive as raw structures and outputs are written through
//! caller-provided references. A missing reference is an invalid argument;
//! the call fails before anything else happens. Error details are logged
//! and then collapsed into `RETURN_ERROR`.
//!
//! Asynchronous results are delivered to callbacks from a background task,
//! bounded by the timeouts in [`ModemOptions`](crate::ModemOptions).
//!
//! # Example
//!
//! ```rust
//! use cellhal::status::{RETURN_OK, StatusApi};
//! use cellhal::{CellularModem, ModemOptions, SimulatedModem};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let api = StatusApi::new(CellularModem::new(
//!     Arc::new(SimulatedModem::default()),
//!     ModemOptions::default(),
//! ));
//!
//! let mut imei = [0u8; 16];
//! assert_eq!(api.get_device_imei(Some(&mut imei)).await, RETURN_OK);
//! assert_eq!(api.get_device_imei(None).await, cellhal::status::RETURN_ERROR);
//! # }
//! ```

use log::warn;
use std::time::Duration;
use tokio::sync::watch;

use crate::Result;
use crate::api::models::{
    HalError, InitConfig, IpReadyInfo, PacketServiceEvent, PacketStats, ProfileDescriptor,
    ProfileEvent, RegistrationEvent, SignalInfo, SlotSelectionEvent,
};
use crate::api::modem::CellularModem;
use crate::api::raw::{
    RawInitConfig, RawNetworkScanResult, RawPlmnInfo, RawProfileDescriptor, RawUiccSlotInfo,
};
use crate::core::state_wait::Completion;
use crate::core::validation::{parse_flag, parse_ip_type, parse_operating_config};
use crate::types::constants::limits;
use crate::util::utils::copy_c_string;

pub use crate::types::constants::status::{RETURN_ERROR, RETURN_OK};
pub use crate::util::utils::read_c_string;

fn required<T>(field: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or(HalError::MissingArgument(field))
}

/// Collapses a result into a status code, logging the failure.
fn status(op: &'static str, result: Result<()>) -> i32 {
    match result {
        Ok(()) => RETURN_OK,
        Err(e) => {
            warn!("{op} failed: {e}");
            RETURN_ERROR
        }
    }
}

/// Hands an accepted operation's result to `callback`, waiting at most
/// `timeout`.
fn dispatch<T, F>(
    op: &'static str,
    accepted: Result<Completion<T>>,
    timeout: Duration,
    callback: F,
) -> i32
where
    T: Send + 'static,
    F: FnOnce(Result<T>) + Send + 'static,
{
    match accepted {
        Ok(completion) => {
            tokio::spawn(async move {
                let result = completion.wait_timeout(timeout).await;
                if let Err(e) = &result {
                    warn!("{op} did not complete: {e}");
                }
                callback(result);
            });
            RETURN_OK
        }
        Err(e) => status(op, Err(e)),
    }
}

/// The C-style, status-returning HAL surface.
///
/// Monitors registered through this surface stop when it is dropped.
#[derive(Debug)]
pub struct StatusApi {
    modem: CellularModem,
    shutdown: watch::Sender<()>,
}

impl StatusApi {
    pub fn new(modem: CellularModem) -> Self {
        let (shutdown, _) = watch::channel(());
        Self { modem, shutdown }
    }

    /// The typed modem underneath.
    pub fn modem(&self) -> &CellularModem {
        &self.modem
    }

    pub async fn is_modem_device_present(&self) -> bool {
        self.modem.is_modem_present().await
    }

    pub async fn init(&self, config: Option<&RawInitConfig>) -> i32 {
        let result = async {
            let config = InitConfig::try_from(required("init_config", config)?)?;
            self.modem.init(config).await
        };
        status("init", result.await)
    }

    pub async fn select_device_slot<F>(&self, callback: F) -> i32
    where
        F: FnOnce(Result<SlotSelectionEvent>) + Send + 'static,
    {
        let timeout = self.modem.options().profile_timeout;
        dispatch(
            "select_device_slot",
            self.modem.select_device_slot().await,
            timeout,
            callback,
        )
    }

    pub async fn sim_power_enable(&self, slot_id: u32, enable: u8) -> i32 {
        let result = async {
            let enable = parse_flag("enable", enable)?;
            self.modem.sim_power_enable(slot_id, enable).await
        };
        status("sim_power_enable", result.await)
    }

    pub async fn get_total_no_of_uicc_slots(&self, out: Option<&mut u32>) -> i32 {
        let result = async {
            let out = required("total_slots", out)?;
            self.modem.total_uicc_slots().await.map(|n| *out = n)
        };
        status("get_total_no_of_uicc_slots", result.await)
    }

    pub async fn get_uicc_slot_info(
        &self,
        slot_index: u32,
        out: Option<&mut RawUiccSlotInfo>,
    ) -> i32 {
        let result = async {
            let out = required("slot_info", out)?;
            let info = self.modem.uicc_slot_info(slot_index).await?;
            *out = RawUiccSlotInfo::from(&info);
            Ok::<(), HalError>(())
        };
        status("get_uicc_slot_info", result.await)
    }

    pub async fn get_active_card_status(&self, out: Option<&mut u32>) -> i32 {
        let result = async {
            let out = required("card_status", out)?;
            self.modem
                .active_card_status()
                .await
                .map(|status| *out = status.as_raw())
        };
        status("get_active_card_status", result.await)
    }

    /// Registers `callback` for registration changes until this surface is
    /// dropped.
    pub async fn monitor_device_registration<F>(&self, callback: F) -> i32
    where
        F: Fn(RegistrationEvent) + Send + 'static,
    {
        let modem = self.modem.clone();
        let shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = modem.monitor_device_registration(shutdown, callback).await {
                warn!("Registration monitor stopped: {e}");
            }
        });
        RETURN_OK
    }

    /// Registers `callback` for data session status changes until this
    /// surface is dropped.
    pub async fn monitor_packet_service_status<F>(&self, callback: F) -> i32
    where
        F: Fn(PacketServiceEvent) + Send + 'static,
    {
        let modem = self.modem.clone();
        let shutdown = self.shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = modem.monitor_packet_service(shutdown, callback).await {
                warn!("Packet service monitor stopped: {e}");
            }
        });
        RETURN_OK
    }

    pub async fn profile_create<F>(
        &self,
        profile: Option<&RawProfileDescriptor>,
        callback: F,
    ) -> i32
    where
        F: FnOnce(Result<ProfileEvent>) + Send + 'static,
    {
        let accepted = async {
            let profile = ProfileDescriptor::try_from(required("profile", profile)?)?;
            self.modem.profile_create(profile).await
        };
        let timeout = self.modem.options().profile_timeout;
        dispatch("profile_create", accepted.await, timeout, callback)
    }

    pub async fn profile_modify<F>(
        &self,
        profile: Option<&RawProfileDescriptor>,
        callback: F,
    ) -> i32
    where
        F: FnOnce(Result<ProfileEvent>) + Send + 'static,
    {
        let accepted = async {
            let profile = ProfileDescriptor::try_from(required("profile", profile)?)?;
            self.modem.profile_modify(profile).await
        };
        let timeout = self.modem.options().profile_timeout;
        dispatch("profile_modify", accepted.await, timeout, callback)
    }

    pub async fn profile_delete<F>(
        &self,
        profile: Option<&RawProfileDescriptor>,
        callback: F,
    ) -> i32
    where
        F: FnOnce(Result<ProfileEvent>) + Send + 'static,
    {
        let accepted = async {
            let profile = ProfileDescriptor::try_from(required("profile", profile)?)?;
            self.modem.profile_delete(profile).await
        };
        let timeout = self.modem.options().profile_timeout;
        dispatch("profile_delete", accepted.await, timeout, callback)
    }

    pub async fn get_profile_list(
        &self,
        out_profiles: Option<&mut Vec<RawProfileDescriptor>>,
        out_count: Option<&mut u32>,
    ) -> i32 {
        let result = async {
            let out_profiles = required("profile_list", out_profiles)?;
            let out_count = required("profile_count", out_count)?;
            let profiles = self.modem.profile_list().await?;
            *out_count = u32::try_from(profiles.len()).unwrap_or(u32::MAX);
            *out_profiles = profiles.iter().map(RawProfileDescriptor::from).collect();
            Ok::<(), HalError>(())
        };
        status("get_profile_list", result.await)
    }

    /// Starts a data session; `profile` defaults to the init profile.
    pub async fn start_network<F>(
        &self,
        ip_type: u32,
        profile: Option<&RawProfileDescriptor>,
        callback: F,
    ) -> i32
    where
        F: FnOnce(Result<IpReadyInfo>) + Send + 'static,
    {
        let accepted = async {
            let ip_type = parse_ip_type(ip_type)?;
            let profile = profile.map(ProfileDescriptor::try_from).transpose()?;
            self.modem.start_network(ip_type, profile).await
        };
        let timeout = self.modem.options().network_start_timeout;
        dispatch("start_network", accepted.await, timeout, callback)
    }

    pub async fn stop_network(&self, ip_type: u32) -> i32 {
        let result = async {
            let ip_type = parse_ip_type(ip_type)?;
            self.modem.stop_network(ip_type).await
        };
        status("stop_network", result.await)
    }

    pub async fn get_signal_info(&self, out: Option<&mut SignalInfo>) -> i32 {
        let result = async {
            let out = required("signal_info", out)?;
            self.modem.signal_info().await.map(|signal| *out = signal)
        };
        status("get_signal_info", result.await)
    }

    pub async fn set_modem_operating_configuration(&self, config: u32) -> i32 {
        let result = async {
            let config = parse_operating_config(config)?;
            self.modem.set_operating_configuration(config).await
        };
        status("set_modem_operating_configuration", result.await)
    }

    pub async fn get_device_imei(&self, out: Option<&mut [u8]>) -> i32 {
        let result = async {
            let out = required("imei", out)?;
            copy_c_string("imei", &self.modem.imei().await?, out)
        };
        status("get_device_imei", result.await)
    }

    pub async fn get_device_imei_sv(&self, out: Option<&mut [u8]>) -> i32 {
        let result = async {
            let out = required("imeisv", out)?;
            copy_c_string("imeisv", &self.modem.imeisv().await?, out)
        };
        status("get_device_imei_sv", result.await)
    }

    pub async fn get_modem_current_iccid(&self, out: Option<&mut [u8]>) -> i32 {
        let result = async {
            let out = required("iccid", out)?;
            copy_c_string("iccid", &self.modem.current_iccid().await?, out)
        };
        status("get_modem_current_iccid", result.await)
    }

    pub async fn get_modem_current_msisdn(&self, out: Option<&mut [u8]>) -> i32 {
        let result = async {
            let out = required("msisdn", out)?;
            copy_c_string("msisdn", &self.modem.current_msisdn().await?, out)
        };
        status("get_modem_current_msisdn", result.await)
    }

    pub async fn get_modem_firmware_version(&self, out: Option<&mut [u8]>) -> i32 {
        let result = async {
            let out = required("firmware_version", out)?;
            copy_c_string("firmware_version", &self.modem.firmware_version().await?, out)
        };
        status("get_modem_firmware_version", result.await)
    }

    pub async fn get_packet_statistics(&self, out: Option<&mut PacketStats>) -> i32 {
        let result = async {
            let out = required("packet_stats", out)?;
            self.modem.packet_statistics().await.map(|stats| *out = stats)
        };
        status("get_packet_statistics", result.await)
    }

    pub async fn get_current_modem_interface_status(&self, out: Option<&mut u32>) -> i32 {
        let result = async {
            let out = required("interface_status", out)?;
            self.modem
                .interface_status()
                .await
                .map(|status| *out = status.as_raw())
        };
        status("get_current_modem_interface_status", result.await)
    }

    pub async fn set_modem_network_attach(&self) -> i32 {
        status("set_modem_network_attach", self.modem.attach().await)
    }

    pub async fn set_modem_network_detach(&self) -> i32 {
        status("set_modem_network_detach", self.modem.detach().await)
    }

    pub async fn get_current_plmn_information(&self, out: Option<&mut RawPlmnInfo>) -> i32 {
        let result = async {
            let out = required("plmn_info", out)?;
            let plmn = self.modem.current_plmn_information().await?;
            *out = RawPlmnInfo::try_from(&plmn)?;
            Ok::<(), HalError>(())
        };
        status("get_current_plmn_information", result.await)
    }

    pub async fn get_available_networks_information(
        &self,
        out_networks: Option<&mut Vec<RawNetworkScanResult>>,
        out_count: Option<&mut u32>,
    ) -> i32 {
        let result = async {
            let out_networks = required("networks", out_networks)?;
            let out_count = required("network_count", out_count)?;
            let networks = self.modem.available_networks().await?;
            *out_count = u32::try_from(networks.len()).unwrap_or(u32::MAX);
            *out_networks = networks.iter().map(RawNetworkScanResult::from).collect();
            Ok::<(), HalError>(())
        };
        status("get_available_networks_information", result.await)
    }

    pub async fn get_modem_preferred_radio_technology(&self, out: Option<&mut [u8]>) -> i32 {
        let result = async {
            let out = required("preferred_rat", out)?;
            let rat = self.modem.preferred_radio_technology().await?.to_string();
            copy_c_string("preferred_rat", &rat, out)
        };
        status("get_modem_preferred_radio_technology", result.await)
    }

    pub async fn set_modem_preferred_radio_technology(&self, rat: Option<&str>) -> i32 {
        let result = async {
            let rat = required("preferred_rat", rat)?;
            self.modem.set_preferred_radio_technology(rat).await
        };
        status("set_modem_preferred_radio_technology", result.await)
    }

    pub async fn get_modem_current_radio_technology(&self, out: Option<&mut [u8]>) -> i32 {
        let result = async {
            let out = required("current_rat", out)?;
            let rat = self.modem.current_radio_technology().await?.to_string();
            copy_c_string("current_rat", &rat, out)
        };
        status("get_modem_current_radio_technology", result.await)
    }

    pub async fn get_modem_supported_radio_technology(&self, out: Option<&mut [u8]>) -> i32 {
        let result = async {
            let out = required("supported_rat", out)?;
            let rat = self.modem.supported_radio_technology().await?.to_string();
            if rat.len() + 1 > limits::RADIO_TECHNOLOGY {
                return Err(HalError::BufferTooSmall {
                    field: "supported_rat",
                    needed: rat.len() + 1,
                    capacity: limits::RADIO_TECHNOLOGY,
                });
            }
            copy_c_string("supported_rat", &rat, out)
        };
        status("get_modem_supported_radio_technology", result.await)
    }

    pub async fn modem_factory_reset(&self) -> i32 {
        status("modem_factory_reset", self.modem.factory_reset().await)
    }

    pub async fn modem_reset(&self) -> i32 {
        status("modem_reset", self.modem.reset().await)
    }
}
