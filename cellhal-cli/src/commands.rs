//! Subcommands of the `cellhal` agent.

use anyhow::{Context, Result, bail};
use cellhal::{
    CellularModem, InterfaceStatus, ModemOperatingConfig, NetworkIpType, OperatingMode,
    PdpAuthentication, PdpType, ProfileBuilder, ProfileDescriptor, RadioTechSet, SimulatedModem,
    UiccStatus,
};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

use crate::config::AgentConfig;
use crate::state::{self, SavedState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Identity, card and interface state (default)
    Status,
    /// List the UICC slots
    Slots,
    /// Select the first slot holding a usable card
    SelectSlot,
    /// Power the card in a slot on or off
    SimPower {
        slot: u32,
        #[arg(value_enum)]
        state: Power,
    },
    /// Radio signal quality
    Signal,
    /// Network the modem is registered on
    Plmn,
    /// Scan for available networks
    Scan,
    /// Packet counters of the WAN interface
    Stats,
    /// Manage PDP profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Register on the packet network
    Attach,
    /// Deregister, stopping every data session
    Detach,
    /// Start a data session
    Start {
        #[arg(value_enum, default_value_t = IpType::Ipv4)]
        ip_type: IpType,
        /// Use this stored profile instead of the default one
        #[arg(long)]
        profile: Option<u32>,
        /// Keep the session up for this many seconds, then stop it
        #[arg(long)]
        hold: Option<u64>,
    },
    /// Stop data sessions
    Stop {
        #[arg(value_enum, default_value_t = IpType::Any)]
        ip_type: IpType,
    },
    /// Show or change the operating mode
    Mode {
        #[arg(value_enum)]
        mode: Option<Mode>,
    },
    /// Show or set the preferred radio technology, e.g. "LTE" or "UMTS,LTE"
    Rat { technologies: Option<String> },
    /// Reset the modem
    Reset,
    /// Reset the modem to factory defaults
    FactoryReset,
    /// Read commands from stdin and print modem events until "exit"
    Shell,
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// List stored profiles
    List,
    /// Create a profile
    Add {
        id: u32,
        name: String,
        #[arg(long, default_value = "")]
        apn: String,
        #[arg(long, value_enum, default_value_t = Pdp::Ipv4v6)]
        pdp: Pdp,
        /// User name for PAP authentication
        #[arg(long, requires = "password")]
        username: Option<String>,
        #[arg(long, requires = "username")]
        password: Option<String>,
        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },
    /// Delete a profile
    Delete { id: u32 },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    On,
    Off,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpType {
    Ipv4,
    Ipv6,
    /// Either family
    Any,
}

impl From<IpType> for NetworkIpType {
    fn from(ip_type: IpType) -> Self {
        match ip_type {
            IpType::Ipv4 => NetworkIpType::Ipv4,
            IpType::Ipv6 => NetworkIpType::Ipv6,
            IpType::Any => NetworkIpType::Unknown,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pdp {
    Ipv4,
    Ipv6,
    Ipv4v6,
    Ppp,
}

impl From<Pdp> for PdpType {
    fn from(pdp: Pdp) -> Self {
        match pdp {
            Pdp::Ipv4 => PdpType::Ipv4,
            Pdp::Ipv6 => PdpType::Ipv6,
            Pdp::Ipv4v6 => PdpType::Ipv4v6,
            Pdp::Ppp => PdpType::Ppp,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Online,
    Offline,
    LowPower,
}

impl From<Mode> for ModemOperatingConfig {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Online => ModemOperatingConfig::Online,
            Mode::Offline => ModemOperatingConfig::Offline,
            Mode::LowPower => ModemOperatingConfig::LowPower,
        }
    }
}

/// Builds the modem from the configuration, then brings it to the state
/// saved by the previous run, or to the configured startup state on the
/// first run.
pub async fn open_modem(
    config: &AgentConfig,
    saved: Option<&SavedState>,
) -> Result<CellularModem> {
    let mut modem_config = config.modem.clone();
    if let Some(saved) = saved {
        for (slot, &powered) in modem_config.slots.iter_mut().zip(&saved.card_power) {
            slot.card_enabled = powered && slot.card_present;
        }
    }
    let backend = Arc::new(SimulatedModem::new(modem_config));
    let modem = CellularModem::new(backend, config.options.to_options());

    if !modem.is_modem_present().await {
        warn!("No modem present, skipping startup configuration");
        return Ok(modem);
    }

    // a factory reset in an earlier run keeps the modem uninitialized
    if let Some(init) = &config.init
        && saved.is_none_or(|s| s.initialized)
    {
        modem
            .init(init.clone())
            .await
            .context("Modem initialization failed")?;
        info!("Modem initialized");
    }

    match saved {
        Some(saved) => restore(&modem, saved).await?,
        None => {
            for profile in &config.profiles {
                create_profile(&modem, profile.clone()).await?;
            }
        }
    }

    Ok(modem)
}

async fn restore(modem: &CellularModem, saved: &SavedState) -> Result<()> {
    let timeout = modem.options().profile_timeout;
    let current = modem.profile_list().await?;

    for profile in &current {
        if !saved.profiles.iter().any(|p| p.profile_id == profile.profile_id) {
            modem
                .profile_delete(profile.clone())
                .await?
                .wait_timeout(timeout)
                .await?;
        }
    }
    for profile in &saved.profiles {
        match current.iter().find(|p| p.profile_id == profile.profile_id) {
            Some(existing) if existing == profile => {}
            Some(_) => {
                modem
                    .profile_modify(profile.clone())
                    .await?
                    .wait_timeout(timeout)
                    .await?;
            }
            None => create_profile(modem, profile.clone()).await?,
        }
    }

    if let Some(rat) = saved.preferred_rat {
        modem
            .set_preferred_radio_technology(&rat.to_string())
            .await
            .context("Failed to restore the preferred radio technology")?;
    }
    let mode = match saved.mode {
        OperatingMode::Online => ModemOperatingConfig::Online,
        OperatingMode::Offline => ModemOperatingConfig::Offline,
        OperatingMode::LowPower => ModemOperatingConfig::LowPower,
    };
    modem.set_operating_configuration(mode).await?;
    debug!("Restored saved modem state");
    Ok(())
}

async fn create_profile(modem: &CellularModem, profile: ProfileDescriptor) -> Result<()> {
    let id = profile.profile_id;
    modem
        .profile_create(profile)
        .await?
        .wait_timeout(modem.options().profile_timeout)
        .await
        .with_context(|| format!("Failed to create profile {id}"))?;
    Ok(())
}

pub async fn execute(modem: &CellularModem, command: Command, output: Output) -> Result<()> {
    match command {
        Command::Status => status(modem, output).await,
        Command::Slots => slots(modem, output).await,
        Command::SelectSlot => {
            let event = modem
                .select_device_slot()
                .await?
                .wait_timeout(modem.options().profile_timeout)
                .await?;
            emit(output, &event, |e| match e.slot_index {
                Some(index) => println!("{} (index {index}): {}", e.slot_name, e.status),
                None => println!("No usable slot: {}", e.status),
            })
        }
        Command::SimPower { slot, state } => {
            modem.sim_power_enable(slot, state == Power::On).await?;
            let info = modem.uicc_slot_info(slot).await?;
            emit(output, &info, |i| {
                println!("slot {slot}: card {}", on_off(i.card_enabled))
            })
        }
        Command::Signal => {
            let signal = modem.signal_info().await?;
            emit(output, &signal, |s| {
                row("RSSI", Some(format!("{} dBm", s.rssi)));
                row("RSRQ", Some(format!("{} dB", s.rsrq)));
                row("RSRP", Some(format!("{} dBm", s.rsrp)));
                row("SNR", Some(format!("{} dB", s.snr)));
                row("TX power", Some(format!("{} dBm", s.tx_power)));
            })
        }
        Command::Plmn => {
            // Registration needs an attach; a no-op when already attached.
            modem.attach().await?;
            let plmn = modem.current_plmn_information().await?;
            emit(output, &plmn, |p| {
                row("Network", Some(&p.network_name));
                row("MCC/MNC", Some(format!("{:03}/{:02}", p.mcc, p.mnc)));
                row("Status", Some(p.registration_status));
                row("Service", Some(p.registered_service));
                row("Roaming allowed", Some(yes_no(p.roaming_enabled)));
                row("Area code", Some(p.area_code));
                row("Cell id", Some(p.cell_id));
            })
        }
        Command::Scan => {
            let networks = modem.available_networks().await?;
            emit(output, &networks, |list| {
                for n in list {
                    let allowed = if n.allowed { "" } else { " (forbidden)" };
                    println!("{:03}/{:02}  {}{allowed}", n.mcc, n.mnc, n.network_name);
                }
            })
        }
        Command::Stats => {
            let stats = modem.packet_statistics().await?;
            emit(output, &stats, |s| {
                for (name, value) in s.cumulative_counters() {
                    row(name, Some(value));
                }
            })
        }
        Command::Profile(command) => profile(modem, command, output).await,
        Command::Attach => {
            modem.attach().await?;
            emit(output, &json!({ "attached": true }), |_| println!("Attached"))
        }
        Command::Detach => {
            modem.detach().await?;
            emit(output, &json!({ "attached": false }), |_| println!("Detached"))
        }
        Command::Start {
            ip_type,
            profile,
            hold,
        } => start(modem, ip_type.into(), profile, hold, output).await,
        Command::Stop { ip_type } => {
            modem.stop_network(ip_type.into()).await?;
            let status = modem.interface_status().await?;
            emit(output, &json!({ "interface_status": status }), |_| {
                println!("Stopped, interface {status}")
            })
        }
        Command::Mode { mode } => {
            if let Some(mode) = mode {
                modem.set_operating_configuration(mode.into()).await?;
            }
            let mode = modem.operating_mode().await;
            emit(output, &json!({ "mode": mode }), |_| println!("{mode}"))
        }
        Command::Rat { technologies } => {
            if let Some(rat) = technologies {
                modem.set_preferred_radio_technology(&rat).await?;
            }
            let preferred = modem.preferred_radio_technology().await?;
            let supported = modem.supported_radio_technology().await?;
            emit(
                output,
                &json!({ "preferred": preferred, "supported": supported }),
                |_| {
                    row("Preferred", Some(preferred));
                    row("Supported", Some(supported));
                },
            )
        }
        Command::Reset => {
            modem.reset().await?;
            emit(output, &json!({ "reset": true }), |_| println!("Modem reset"))
        }
        Command::FactoryReset => {
            modem.factory_reset().await?;
            emit(output, &json!({ "factory_reset": true }), |_| {
                println!("Modem reset to factory defaults")
            })
        }
        Command::Shell => bail!("Already in a shell"),
        Command::Config => bail!("config is handled before the modem is opened"),
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    present: bool,
    mode: OperatingMode,
    interface: InterfaceStatus,
    imei: Option<String>,
    imeisv: Option<String>,
    firmware_version: Option<String>,
    card_status: Option<UiccStatus>,
    iccid: Option<String>,
    msisdn: Option<String>,
    current_rat: Option<RadioTechSet>,
    preferred_rat: Option<RadioTechSet>,
    supported_rat: Option<RadioTechSet>,
}

async fn status(modem: &CellularModem, output: Output) -> Result<()> {
    let report = StatusReport {
        present: modem.is_modem_present().await,
        mode: modem.operating_mode().await,
        interface: modem.interface_status().await?,
        imei: modem.imei().await.ok(),
        imeisv: modem.imeisv().await.ok(),
        firmware_version: modem.firmware_version().await.ok(),
        card_status: modem.active_card_status().await.ok(),
        iccid: modem.current_iccid().await.ok(),
        msisdn: modem.current_msisdn().await.ok(),
        current_rat: modem.current_radio_technology().await.ok(),
        preferred_rat: modem.preferred_radio_technology().await.ok(),
        supported_rat: modem.supported_radio_technology().await.ok(),
    };

    emit(output, &report, |r| {
        row("Present", Some(yes_no(r.present)));
        row("Mode", Some(r.mode));
        row("Interface", Some(r.interface));
        row("IMEI", r.imei.as_ref());
        row("IMEISV", r.imeisv.as_ref());
        row("Firmware", r.firmware_version.as_ref());
        row("Card", r.card_status);
        row("ICCID", r.iccid.as_ref());
        row("MSISDN", r.msisdn.as_ref());
        row("Current RAT", r.current_rat);
        row("Preferred RAT", r.preferred_rat);
        row("Supported RAT", r.supported_rat);
    })
}

async fn slots(modem: &CellularModem, output: Output) -> Result<()> {
    let count = modem.total_uicc_slots().await?;
    let mut slots = Vec::with_capacity(count as usize);
    for index in 0..count {
        slots.push(modem.uicc_slot_info(index).await?);
    }

    emit(output, &slots, |list| {
        for (index, slot) in list.iter().enumerate() {
            if !slot.card_present {
                println!("slot{index}: empty");
                continue;
            }
            println!(
                "slot{index}: {} {} {} card {} {} ({})",
                slot.status,
                slot.form_factor,
                slot.application,
                on_off(slot.card_enabled),
                slot.iccid,
                slot.operator_name,
            );
        }
    })
}

async fn profile(modem: &CellularModem, command: ProfileCommand, output: Output) -> Result<()> {
    let timeout = modem.options().profile_timeout;

    match command {
        ProfileCommand::List => {
            let profiles = modem.profile_list().await?;
            emit(output, &profiles, |list| {
                for p in list {
                    let default = if p.is_default { " [default]" } else { "" };
                    println!(
                        "{:>3}  {:<16} {:<7} {}{default}",
                        p.profile_id,
                        p.profile_name,
                        p.pdp_type.to_string(),
                        p.apn
                    );
                }
            })
        }
        ProfileCommand::Add {
            id,
            name,
            apn,
            pdp,
            username,
            password,
            default,
        } => {
            let mut builder = ProfileBuilder::new(id, name)
                .apn(apn)
                .pdp_type(pdp.into())
                .default_profile(default);
            if let (Some(username), Some(password)) = (username, password) {
                builder = builder
                    .authentication(PdpAuthentication::Pap)
                    .credentials(username, password);
            }

            let event = modem
                .profile_create(builder.build()?)
                .await?
                .wait_timeout(timeout)
                .await?;
            emit(output, &event, |e| {
                println!("Profile {} {}", e.profile_id, e.action)
            })
        }
        ProfileCommand::Delete { id } => {
            let profile = find_profile(modem, id).await?;
            let event = modem
                .profile_delete(profile)
                .await?
                .wait_timeout(timeout)
                .await?;
            emit(output, &event, |e| {
                println!("Profile {} {}", e.profile_id, e.action)
            })
        }
    }
}

async fn start(
    modem: &CellularModem,
    ip_type: NetworkIpType,
    profile: Option<u32>,
    hold: Option<u64>,
    output: Output,
) -> Result<()> {
    let profile = match profile {
        Some(id) => Some(find_profile(modem, id).await?),
        None => None,
    };

    let ip = modem
        .start_network(ip_type, profile)
        .await?
        .wait_timeout(modem.options().network_start_timeout)
        .await?;
    emit(output, &ip, |ip| {
        row("Interface", Some(&ip.interface_name));
        row("IP type", Some(ip.ip_type));
        row("Address", Some(&ip.ip_address));
        row("Netmask", Some(&ip.subnet_mask));
        row("Gateway", Some(&ip.default_gateway));
        row("DNS", Some(format!("{} {}", ip.dns_primary, ip.dns_secondary)));
        row("MTU", Some(ip.mtu));
    })?;

    if let Some(seconds) = hold {
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        let stats = modem.packet_statistics().await?;
        modem.stop_network(ip.ip_type).await?;
        emit(output, &stats, |s| {
            println!(
                "Session stopped after {seconds}s: {} bytes sent, {} received",
                s.bytes_sent, s.bytes_received
            )
        })?;
    }

    Ok(())
}

/// One line of shell input.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Command,
}

/// Runs commands read from stdin while printing modem events, saving the
/// modem state to `state_path` after every command.
pub async fn shell(
    modem: &CellularModem,
    output: Output,
    state_path: Option<&Path>,
) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell_loop(modem, stdin, output, state_path).await
}

async fn shell_loop<R>(
    modem: &CellularModem,
    input: R,
    output: Output,
    state_path: Option<&Path>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let (stop, shutdown) = watch::channel(());

    let commands = async move {
        let result = read_commands(modem, input, output, state_path).await;
        drop(stop);
        result
    };

    let (monitored, read) = tokio::join!(print_events(modem, shutdown, output), commands);
    monitored?;
    read
}

async fn read_commands<R>(
    modem: &CellularModem,
    input: R,
    output: Output,
    state_path: Option<&Path>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["exit" | "quit"] => break,
            _ => {}
        }

        let command = match ShellLine::try_parse_from(words.iter().copied()) {
            Ok(line) => line.command,
            Err(e) => {
                e.print()?;
                continue;
            }
        };
        if let Err(e) = execute(modem, command, output).await {
            eprintln!("Error: {e:#}");
        }
        if let Some(path) = state_path {
            state::persist(modem, path).await?;
        }
    }
    Ok(())
}

async fn print_events(
    modem: &CellularModem,
    shutdown: watch::Receiver<()>,
    output: Output,
) -> Result<()> {
    tokio::try_join!(
        modem.monitor_device_registration(shutdown.clone(), move |event| {
            let _ = emit(output, &json!({ "registration": event }), |_| {
                println!(
                    "registration: {} (roaming: {})",
                    event.status,
                    yes_no(event.roaming)
                )
            });
        }),
        modem.monitor_slot_status(shutdown.clone(), move |event| {
            let _ = emit(output, &json!({ "slot": &event }), |_| {
                println!("slot: {} {}", event.slot_name, event.status)
            });
        }),
        modem.monitor_packet_service(shutdown, move |event| {
            let _ = emit(output, &json!({ "packet_service": &event }), |_| {
                println!(
                    "packet service: {} {} {}",
                    event.interface_name, event.ip_type, event.status
                )
            });
        }),
    )?;
    Ok(())
}

async fn find_profile(modem: &CellularModem, id: u32) -> Result<ProfileDescriptor> {
    modem
        .profile_list()
        .await?
        .into_iter()
        .find(|p| p.profile_id == id)
        .with_context(|| format!("No profile with id {id}"))
}

/// Prints `value` as JSON or through `render`.
fn emit<T, F>(output: Output, value: &T, render: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T),
{
    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Output::Text => render(value),
    }
    Ok(())
}

fn row<V: Display>(label: &str, value: Option<V>) {
    match value {
        Some(value) => println!("{label:<16} {value}"),
        None => println!("{label:<16} -"),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
