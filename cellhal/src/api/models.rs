use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::types::constants::{events, timeouts};

/// Declares a closed, integer-coded enumeration of the HAL contract.
///
/// Every generated type converts from its raw `u32` code with `TryFrom`,
/// rejecting codes outside the set with [`HalError::InvalidEnum`], and back
/// with `as_raw()`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($label:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal => $text:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every member of the set, in code order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the raw code used on the C-callable surface.
            pub fn as_raw(self) -> u32 {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }

        impl TryFrom<u32> for $name {
            type Error = HalError;

            fn try_from(code: u32) -> std::result::Result<Self, HalError> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    value => Err(HalError::InvalidEnum { field: $label, value }),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $text),)+
                }
            }
        }
    };
}

wire_enum! {
    /// IP family the data session should prefer.
    pub enum IpFamily ("ip_family") {
        /// No preference.
        Unknown = 1 => "unknown",
        /// IPv4 only.
        Ipv4 = 2 => "IPv4",
        /// IPv6 only.
        Ipv6 = 3 => "IPv6",
        /// Dual stack.
        Ipv4v6 = 4 => "IPv4v6",
    }
}

wire_enum! {
    /// Preferred access technology given at initialization.
    pub enum RadioTechPreference ("preferred_technology") {
        Gprs = 1 => "GPRS",
        Edge = 2 => "EDGE",
        Umts = 3 => "UMTS",
        UmtsHspa = 4 => "UMTS-HSPA",
        Cdma2000OneX = 5 => "CDMA2000-1X",
        Cdma2000Hrpd = 6 => "CDMA2000-HRPD",
        Lte = 7 => "LTE",
        Nr = 8 => "NR",
    }
}

wire_enum! {
    /// Standards family of a PDP profile.
    pub enum ProfileType ("profile_type") {
        ThreeGpp = 0 => "3GPP",
        ThreeGpp2 = 1 => "3GPP2",
    }
}

wire_enum! {
    /// Packet data protocol carried by a context.
    pub enum PdpType ("pdp_type") {
        Ipv4 = 0 => "IPv4",
        Ppp = 1 => "PPP",
        Ipv6 = 2 => "IPv6",
        Ipv4v6 = 3 => "IPv4v6",
    }
}

wire_enum! {
    /// Authentication used when activating a PDP context.
    pub enum PdpAuthentication ("pdp_authentication") {
        None = 0 => "none",
        Pap = 1 => "PAP",
        Chap = 2 => "CHAP",
    }
}

wire_enum! {
    /// How the modem obtains its IP configuration.
    pub enum PdpNetworkConfig ("pdp_network_config") {
        Nas = 1 => "NAS",
        Dhcp = 2 => "DHCP",
    }
}

wire_enum! {
    /// Operating configuration requests accepted by
    /// [`CellularModem::set_operating_configuration`](crate::CellularModem::set_operating_configuration).
    pub enum ModemOperatingConfig ("operating_config") {
        Online = 1 => "online",
        Offline = 2 => "offline",
        LowPower = 3 => "low-power",
        Reset = 4 => "reset",
        FactoryReset = 5 => "factory-reset",
    }
}

wire_enum! {
    /// Status of the cellular WAN interface.
    pub enum InterfaceStatus ("interface_status") {
        Up = 1 => "up",
        Down = 2 => "down",
        Unknown = 3 => "unknown",
        Dormant = 4 => "dormant",
        NotPresent = 5 => "not present",
        LowerLayerDown = 6 => "lower layer down",
        Error = 7 => "error",
    }
}

wire_enum! {
    /// Status of a UICC (SIM card).
    pub enum UiccStatus ("uicc_status") {
        Valid = 0 => "valid",
        Blocked = 1 => "blocked",
        Error = 2 => "error",
        Empty = 3 => "empty",
    }
}

wire_enum! {
    /// Physical form factor of a UICC.
    pub enum UiccFormFactor ("form_factor") {
        OneFf = 0 => "1FF",
        TwoFf = 1 => "2FF",
        ThreeFf = 2 => "3FF",
        FourFf = 3 => "4FF",
    }
}

wire_enum! {
    /// Application hosted on a UICC.
    pub enum UiccApplication ("application") {
        Usim = 0 => "USIM",
        Isim = 1 => "ISIM",
        UsimIsim = 2 => "USIM+ISIM",
    }
}

wire_enum! {
    /// IP type of a data session request.
    pub enum NetworkIpType ("ip_type") {
        Ipv4 = 1 => "IPv4",
        Ipv6 = 2 => "IPv6",
        /// Either family; stopping with this type stops every session.
        Unknown = 3 => "unknown",
    }
}

wire_enum! {
    /// Registration state reported in [`PlmnInfo`].
    ///
    /// There is no "not registered" member: querying the PLMN while
    /// unregistered fails with [`HalError::NotRegistered`].
    pub enum RegistrationStatus ("registration_status") {
        Home = 1 => "registered (home)",
        Roaming = 2 => "registered (roaming)",
    }
}

wire_enum! {
    /// Service domain(s) the modem is registered for.
    pub enum RegisteredService ("registered_service") {
        None = 0 => "none",
        Ps = 1 => "PS",
        Cs = 2 => "CS",
        CsPs = 3 => "CS+PS",
    }
}

wire_enum! {
    /// Non-access-stratum registration state carried by registration events.
    pub enum NasStatus ("nas_status") {
        NotRegistered = 1 => "not registered",
        Registering = 2 => "registering",
        Registered = 3 => "registered",
    }
}

wire_enum! {
    /// Progress of a device slot selection.
    pub enum SlotStatus ("slot_status") {
        NotReady = 0 => "not ready",
        Ready = 1 => "ready",
        Selecting = 2 => "selecting",
        Selected = 3 => "selected",
    }
}

wire_enum! {
    /// Packet service state of a data session.
    pub enum PacketServiceStatus ("packet_service_status") {
        Connected = 0 => "connected",
        Disconnected = 1 => "disconnected",
    }
}

/// Power state the modem is currently in.
///
/// `Reset` and `FactoryReset` requests are transient and always leave the
/// modem `Online`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OperatingMode {
    /// Radio on, network operations allowed.
    #[default]
    Online,
    /// Radio off.
    Offline,
    /// Radio off, modem in its low-power state.
    LowPower,
}

impl Display for OperatingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
            Self::LowPower => write!(f, "low-power"),
        }
    }
}

bitflags! {
    /// A set of radio access technologies from the HAL vocabulary.
    ///
    /// The text form is the comma-joined canonical order, e.g. `"UMTS,LTE"`
    /// for a modem attached on two technologies at once. `AUTO` never
    /// combines with another token.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RadioTechSet: u8 {
        const AUTO = 1 << 0;
        const CDMA20001X = 1 << 1;
        const EVDO = 1 << 2;
        const GSM = 1 << 3;
        const UMTS = 1 << 4;
        const LTE = 1 << 5;
    }
}

impl RadioTechSet {
    /// Vocabulary tokens in canonical order.
    pub const TOKENS: &'static [(&'static str, RadioTechSet)] = &[
        ("AUTO", RadioTechSet::AUTO),
        ("CDMA20001X", RadioTechSet::CDMA20001X),
        ("EVDO", RadioTechSet::EVDO),
        ("GSM", RadioTechSet::GSM),
        ("UMTS", RadioTechSet::UMTS),
        ("LTE", RadioTechSet::LTE),
    ];

    /// Technologies that can be selected explicitly (everything but `AUTO`).
    pub fn technologies(self) -> RadioTechSet {
        self.difference(RadioTechSet::AUTO)
    }

    /// Maps the initialization preference onto the string vocabulary.
    ///
    /// NR has no token of its own and falls back to `AUTO`.
    pub fn from_preference(pref: RadioTechPreference) -> RadioTechSet {
        match pref {
            RadioTechPreference::Gprs | RadioTechPreference::Edge => RadioTechSet::GSM,
            RadioTechPreference::Umts | RadioTechPreference::UmtsHspa => RadioTechSet::UMTS,
            RadioTechPreference::Cdma2000OneX => RadioTechSet::CDMA20001X,
            RadioTechPreference::Cdma2000Hrpd => RadioTechSet::EVDO,
            RadioTechPreference::Lte => RadioTechSet::LTE,
            RadioTechPreference::Nr => RadioTechSet::AUTO,
        }
    }
}

impl Display for RadioTechSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (token, flag) in Self::TOKENS {
            if self.contains(*flag) {
                if !first {
                    f.write_str(",")?;
                }
                f.write_str(token)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl FromStr for RadioTechSet {
    type Err = HalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || HalError::InvalidRadioTechnology(s.to_string());
        let mut set = RadioTechSet::empty();

        for raw in s.split(',') {
            let token = raw.trim();
            let flag = Self::TOKENS
                .iter()
                .find(|(name, _)| *name == token)
                .map(|(_, flag)| *flag)
                .ok_or_else(invalid)?;
            if set.contains(flag) {
                return Err(invalid());
            }
            set.insert(flag);
        }

        if set.is_empty() || (set.contains(RadioTechSet::AUTO) && set != RadioTechSet::AUTO) {
            return Err(invalid());
        }
        Ok(set)
    }
}

impl Serialize for RadioTechSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RadioTechSet {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Describes a PDP (packet data protocol) profile.
///
/// Profiles are keyed by `profile_id`. Text fields are bounded by the
/// capacities in [`limits`](crate::types::constants::limits); the profile
/// name must not be empty.
///
/// # Examples
///
/// ```rust
/// use cellhal::{PdpType, ProfileBuilder};
///
/// let profile = ProfileBuilder::new(1, "internet")
///     .apn("internet.example")
///     .pdp_type(PdpType::Ipv4v6)
///     .default_profile(true)
///     .build()
///     .unwrap();
/// assert!(profile.is_default);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDescriptor {
    /// Numeric profile identifier
    pub profile_id: u32,
    /// 3GPP or 3GPP2
    pub profile_type: ProfileType,
    /// PDP context number used on the modem
    pub pdp_context_number: u32,
    /// Packet data protocol
    pub pdp_type: PdpType,
    /// Authentication mode
    pub authentication: PdpAuthentication,
    /// IP configuration method
    pub network_config: PdpNetworkConfig,
    /// Human readable profile name
    pub profile_name: String,
    /// Access point name
    pub apn: String,
    /// Authentication user name
    pub username: String,
    /// Authentication password
    pub password: String,
    /// Proxy host
    pub proxy: String,
    /// Proxy port
    pub proxy_port: u16,
    /// Do not use this profile while roaming
    pub no_roaming: bool,
    /// The APN is administratively disabled
    pub apn_disabled: bool,
    /// This is the default profile
    pub is_default: bool,
}

/// One-time initialization parameters consumed by
/// [`CellularModem::init`](crate::CellularModem::init).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitConfig {
    /// IP family preference for data sessions
    pub ip_family: IpFamily,
    /// Preferred access technology
    pub preferred_technology: RadioTechPreference,
    /// Profile created as the default profile
    pub default_profile: ProfileDescriptor,
}

/// Hardware identity of the modem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModemIdentity {
    /// International Mobile Equipment Identity
    pub imei: String,
    /// IMEI with software version
    pub imeisv: String,
    /// Modem firmware version string
    pub firmware_version: String,
}

/// Snapshot of one UICC slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiccSlotInfo {
    /// The slot is enabled in hardware
    pub slot_enabled: bool,
    /// A card is inserted
    pub card_present: bool,
    /// The card is powered
    pub card_enabled: bool,
    /// Physical form factor
    pub form_factor: UiccFormFactor,
    /// Hosted application
    pub application: UiccApplication,
    /// Card status
    pub status: UiccStatus,
    /// Operator name stored on the card
    pub operator_name: String,
    /// Integrated Circuit Card Identifier
    pub iccid: String,
    /// Subscriber phone number
    pub msisdn: String,
}

/// Radio signal quality.
///
/// Valid readings fall within [`signal_range`](crate::types::constants::signal_range);
/// anything else indicates a sensor or implementation fault.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalInfo {
    /// Received signal strength indicator, dBm
    pub rssi: i32,
    /// Reference signal received quality, dB
    pub rsrq: f32,
    /// Reference signal received power, dBm
    pub rsrp: i32,
    /// Signal to noise ratio, dB
    pub snr: i32,
    /// Transmit power, dBm
    pub tx_power: i32,
}

/// Network the modem is currently registered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlmnInfo {
    /// Operator name
    pub network_name: String,
    /// Mobile country code (0-999)
    pub mcc: u32,
    /// Mobile network code (0-999)
    pub mnc: u32,
    /// Roaming is allowed
    pub roaming_enabled: bool,
    /// Location/tracking area code
    pub area_code: u32,
    /// Serving cell identifier
    pub cell_id: u32,
    /// Registration state
    pub registration_status: RegistrationStatus,
    /// Registered service domain(s)
    pub registered_service: RegisteredService,
}

/// One network found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkScanResult {
    /// Operator name
    pub network_name: String,
    /// Mobile country code
    pub mcc: u32,
    /// Mobile network code
    pub mnc: u32,
    /// The SIM is allowed to register on this network
    pub allowed: bool,
}

/// Cumulative packet counters of the cellular interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PacketStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_sent_drop: u64,
    pub packets_received_drop: u64,
    pub upstream_max_bit_rate: u64,
    pub downstream_max_bit_rate: u64,
}

impl PacketStats {
    /// The cumulative counters by name. The bit rates are instantaneous
    /// maxima and are not included.
    pub fn cumulative_counters(&self) -> [(&'static str, u64); 6] {
        [
            ("bytes_sent", self.bytes_sent),
            ("bytes_received", self.bytes_received),
            ("packets_sent", self.packets_sent),
            ("packets_received", self.packets_received),
            ("packets_sent_drop", self.packets_sent_drop),
            ("packets_received_drop", self.packets_received_drop),
        ]
    }
}

/// IP configuration delivered once a data session is up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpReadyInfo {
    /// WAN interface name (e.g. "wwan0")
    pub interface_name: String,
    /// IP type of the session
    pub ip_type: NetworkIpType,
    pub ip_address: String,
    pub subnet_mask: String,
    pub default_gateway: String,
    pub dns_primary: String,
    pub dns_secondary: String,
    /// Search domains
    pub domains: String,
    pub mtu: u32,
}

/// Reported while a device slot is being selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSelectionEvent {
    /// Slot name, e.g. "slot1"
    pub slot_name: String,
    /// Slot type, e.g. "SIM"
    pub slot_type: String,
    /// Zero-based slot index, `None` when no slot qualified
    pub slot_index: Option<u32>,
    pub status: SlotStatus,
}

/// Reported when the network registration changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationEvent {
    pub status: NasStatus,
    /// Registered on a visited network
    pub roaming: bool,
    pub service: RegisteredService,
}

/// Profile operation that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileAction {
    Created,
    Modified,
    Deleted,
}

impl Display for ProfileAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Modified => write!(f, "modified"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// Completion of a profile create/modify/delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEvent {
    pub profile_id: u32,
    pub profile_type: ProfileType,
    pub action: ProfileAction,
}

/// Reported when a data session goes up or down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketServiceEvent {
    pub interface_name: String,
    pub ip_type: NetworkIpType,
    pub status: PacketServiceStatus,
}

/// Everything published on the modem event bus.
#[derive(Debug, Clone, PartialEq)]
pub enum ModemEvent {
    SlotSelection(SlotSelectionEvent),
    Registration(RegistrationEvent),
    Profile(ProfileEvent),
    PacketService(PacketServiceEvent),
}

/// Tuning for a [`CellularModem`](crate::CellularModem).
///
/// # Example
///
/// ```rust
/// use cellhal::ModemOptions;
/// use std::time::Duration;
///
/// let options = ModemOptions::new()
///     .with_event_capacity(16)
///     .with_network_start_timeout(Duration::from_secs(60));
/// assert_eq!(options.event_capacity, 16);
/// ```
#[derive(Debug, Clone)]
pub struct ModemOptions {
    /// Events buffered per subscriber before the oldest are dropped
    pub event_capacity: usize,
    /// Bound applied by the status surface to profile completions
    pub profile_timeout: Duration,
    /// Bound applied by the status surface to data session starts
    pub network_start_timeout: Duration,
    /// Run output conformance checks on everything the backend reports
    pub check_outputs: bool,
}

impl Default for ModemOptions {
    fn default() -> Self {
        Self {
            event_capacity: events::CHANNEL_CAPACITY,
            profile_timeout: timeouts::profile_timeout(),
            network_start_timeout: timeouts::network_start_timeout(),
            check_outputs: true,
        }
    }
}

impl ModemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_profile_timeout(mut self, timeout: Duration) -> Self {
        self.profile_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_network_start_timeout(mut self, timeout: Duration) -> Self {
        self.network_start_timeout = timeout;
        self
    }

    /// Disables output conformance checks, passing backend values through.
    #[must_use]
    pub fn with_check_outputs(mut self, enabled: bool) -> Self {
        self.check_outputs = enabled;
        self
    }
}

/// Errors returned by the cellular HAL.
///
/// Variants fall into four groups, see [`HalError::is_invalid_argument`]:
///
/// - invalid arguments, detected before any hardware interaction
/// - operational failures reported by the modem or network
/// - conformance failures, where a backend produced an out-of-contract value
/// - completion failures of asynchronous operations
///
/// The status surface collapses all of them into `RETURN_ERROR`.
///
/// # Examples
///
/// ```rust
/// use cellhal::{HalError, ModemOperatingConfig};
///
/// let err = ModemOperatingConfig::try_from(9).unwrap_err();
/// assert!(err.is_invalid_argument());
/// assert!(matches!(err, HalError::InvalidEnum { value: 9, .. }));
/// ```
#[derive(Debug, Error)]
pub enum HalError {
    /// A required argument or output was not provided.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// An integer is outside its enumeration.
    #[error("invalid value {value} for {field}")]
    InvalidEnum { field: &'static str, value: u32 },

    /// A boolean byte is neither TRUE (1) nor FALSE (0).
    #[error("invalid boolean byte {value:#04x} for {field}")]
    InvalidFlag { field: &'static str, value: u8 },

    /// A text field is malformed or too long.
    #[error("invalid {field}: {reason}")]
    InvalidText { field: &'static str, reason: String },

    /// Proxy port outside 0-65535.
    #[error("invalid proxy port: {0}")]
    InvalidPort(u32),

    /// The slot index does not name a physical UICC slot.
    #[error("invalid UICC slot index: {0}")]
    InvalidSlot(u32),

    /// No profile with this id exists.
    #[error("unknown profile id: {0}")]
    UnknownProfile(u32),

    /// A profile with this id already exists.
    #[error("profile id {0} already exists")]
    DuplicateProfile(u32),

    /// The profile is used by a running data session.
    #[error("profile {0} is in use by a running data session")]
    ProfileInUse(u32),

    /// Radio technology string outside the vocabulary.
    #[error("invalid radio technology: {0:?}")]
    InvalidRadioTechnology(String),

    /// Radio technology not supported by this modem.
    #[error("radio technology not supported by modem: {0}")]
    UnsupportedRadioTechnology(String),

    /// The operation needs state that only `init` provides.
    #[error("modem not initialized")]
    NotInitialized,

    /// No modem hardware was detected.
    #[error("no cellular modem present")]
    ModemNotPresent,

    /// The radio is off.
    #[error("modem is not online (mode: {0})")]
    ModemOffline(OperatingMode),

    /// No usable SIM card in the active slot.
    #[error("no active SIM card")]
    NoActiveCard,

    /// The modem is not registered on any network.
    #[error("not registered on any network")]
    NotRegistered,

    /// The packet network cannot be reached.
    #[error("packet network unavailable")]
    NetworkUnavailable,

    /// A data session of this IP type is already running.
    #[error("a {0} data session is already running")]
    SessionActive(NetworkIpType),

    /// The profile's PDP type cannot carry the requested session.
    #[error("{pdp_type} profile cannot carry an {ip_type} data session")]
    IpTypeMismatch {
        ip_type: NetworkIpType,
        pdp_type: PdpType,
    },

    /// A reading lies outside its physical range.
    #[error("{field} value {value} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A string does not fit its buffer, terminator included.
    #[error("{field} needs {needed} bytes but capacity is {capacity}")]
    BufferTooSmall {
        field: &'static str,
        needed: usize,
        capacity: usize,
    },

    /// A string output that must not be empty was empty.
    #[error("{0} is empty")]
    EmptyValue(&'static str),

    /// A cumulative counter decreased without an intervening reset.
    #[error("packet counter {0} decreased without a reset")]
    CounterRegression(&'static str),

    /// The modem backend reported a failure.
    #[error("modem backend error: {0}")]
    Backend(String),

    /// The operation was dropped before it completed.
    #[error("operation cancelled before completion")]
    Cancelled,

    /// The operation did not complete in time.
    #[error("operation timed out")]
    Timeout,
}

impl HalError {
    /// Returns `true` for caller errors detected before touching hardware.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument(_)
                | Self::InvalidEnum { .. }
                | Self::InvalidFlag { .. }
                | Self::InvalidText { .. }
                | Self::InvalidPort(_)
                | Self::InvalidSlot(_)
                | Self::UnknownProfile(_)
                | Self::DuplicateProfile(_)
                | Self::InvalidRadioTechnology(_)
                | Self::UnsupportedRadioTechnology(_)
                | Self::IpTypeMismatch { .. }
        )
    }

    /// Returns `true` when a backend produced a value outside the contract.
    pub fn is_conformance_failure(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. }
                | Self::BufferTooSmall { .. }
                | Self::EmptyValue(_)
                | Self::CounterRegression(_)
        )
    }
}
