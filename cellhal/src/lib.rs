//! A typed, async hardware abstraction layer for cellular modems.
//!
//! This crate sits between a connection manager and the modem vendor code.
//! It covers the whole modem contract:
//!
//! - Modem presence, identity and initialization
//! - UICC slot inspection, SIM power and active slot selection
//! - Network registration, signal quality, PLMN information and scans
//! - PDP profile management
//! - Packet domain attach and data sessions with IP configuration
//! - Operating modes, resets and traffic statistics
//!
//! Inputs are validated before the modem is touched, and everything the
//! modem reports is checked against the contract ranges. The vendor side
//! plugs in through the [`ModemBackend`] trait; [`SimulatedModem`] is an
//! in-memory reference backend.
//!
//! # Example
//!
//! ```no_run
//! use cellhal::{CellularModem, ModemOptions, NetworkIpType, ProfileBuilder, SimulatedModem};
//! use std::sync::Arc;
//!
//! # async fn example() -> cellhal::Result<()> {
//! let modem = CellularModem::new(Arc::new(SimulatedModem::default()), ModemOptions::default());
//!
//! println!("IMEI {}", modem.imei().await?);
//! println!("signal {:?}", modem.signal_info().await?);
//!
//! let profile = ProfileBuilder::new(1, "internet").apn("internet").build()?;
//! modem.profile_create(profile.clone()).await?.await?;
//!
//! let ip = modem
//!     .start_network(NetworkIpType::Ipv4, Some(profile))
//!     .await?
//!     .await?;
//! println!("{}: {}", ip.interface_name, ip.ip_address);
//! # Ok(())
//! # }
//! ```
//!
//! # Surfaces
//!
//! [`CellularModem`] is the typed API. [`status::StatusApi`] wraps it in the
//! status-code form of the C contract (`RETURN_OK`/`RETURN_ERROR`, raw
//! structures, caller-provided outputs, callbacks).
//!
//! # Error Handling
//!
//! All typed operations return `Result<T, HalError>`. [`HalError`] tells
//! invalid arguments, operational failures and conformance failures apart;
//! the status surface collapses all of them into `RETURN_ERROR` after
//! logging the detail.
//!
//! # Asynchronous Operations
//!
//! Profile changes, data session start and slot selection return a
//! [`Completion`] once their input is accepted. Await it for the outcome,
//! bound it with [`Completion::wait_timeout`], or drop it.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger` or
//! `tracing-subscriber`.

pub mod api;
pub mod backend;
mod core;
mod monitoring;
pub mod types;
mod util;

pub use api::builders;
pub use api::conformance;
pub use api::models;
pub use api::raw;
pub use api::status;

pub use api::builders::ProfileBuilder;
pub use api::models::{
    HalError, InitConfig, InterfaceStatus, IpFamily, IpReadyInfo, ModemEvent, ModemIdentity,
    ModemOperatingConfig, ModemOptions, NasStatus, NetworkIpType, NetworkScanResult,
    OperatingMode, PacketServiceEvent, PacketServiceStatus, PacketStats, PdpAuthentication,
    PdpNetworkConfig, PdpType, PlmnInfo, ProfileAction, ProfileDescriptor, ProfileEvent,
    ProfileType, RadioTechPreference, RadioTechSet, RegisteredService, RegistrationEvent,
    RegistrationStatus, SignalInfo, SlotSelectionEvent, SlotStatus, UiccApplication,
    UiccFormFactor, UiccSlotInfo, UiccStatus,
};
pub use api::modem::CellularModem;
pub use api::raw::{
    RawInitConfig, RawNetworkScanResult, RawPlmnInfo, RawProfileDescriptor, RawUiccSlotInfo,
};
pub use api::status::StatusApi;
pub use backend::{LinkState, ModemBackend, SimulatedModem, SimulatedModemConfig};
pub use crate::core::state_wait::Completion;

/// A specialized `Result` type for HAL operations.
pub type Result<T> = std::result::Result<T, HalError>;
