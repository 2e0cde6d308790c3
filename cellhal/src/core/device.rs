use log::{debug, warn};

use crate::Result;
use crate::api::conformance::{
    check_counters, check_plmn_info, check_scan_result, check_signal_info, check_string_output,
};
use crate::api::models::{
    HalError, InterfaceStatus, NetworkScanResult, OperatingMode, PacketStats, PlmnInfo,
    RadioTechSet, SignalInfo,
};
use crate::core::session::reconcile;
use crate::core::state::ModemContext;
use crate::types::constants::limits;

/// Which identity string to read.
#[derive(Debug, Clone, Copy)]
pub(crate) enum IdentityField {
    Imei,
    Imeisv,
    FirmwareVersion,
}

pub(crate) async fn identity(ctx: &ModemContext, field: IdentityField) -> Result<String> {
    ctx.require_present().await?;
    let identity = ctx.backend.identity().await?;

    let (name, value, capacity) = match field {
        IdentityField::Imei => ("imei", identity.imei, limits::IMEI),
        IdentityField::Imeisv => ("imeisv", identity.imeisv, limits::IMEISV),
        IdentityField::FirmwareVersion => (
            "firmware_version",
            identity.firmware_version,
            limits::FIRMWARE_VERSION,
        ),
    };
    ctx.conform(check_string_output(name, &value, capacity))?;
    Ok(value)
}

pub(crate) async fn current_radio_technology(ctx: &ModemContext) -> Result<RadioTechSet> {
    ctx.require_present().await?;
    let rat = ctx.backend.current_radio_technology().await?;
    if rat.is_empty() {
        ctx.conform(Err(HalError::EmptyValue("current_radio_technology")))?;
    }
    Ok(rat)
}

pub(crate) async fn supported_radio_technology(ctx: &ModemContext) -> Result<RadioTechSet> {
    ctx.require_present().await?;
    let rat = ctx.backend.supported_radio_technology().await?;
    if rat.technologies().is_empty() {
        ctx.conform(Err(HalError::EmptyValue("supported_radio_technology")))?;
    }
    Ok(rat)
}

pub(crate) async fn preferred_radio_technology(ctx: &ModemContext) -> Result<RadioTechSet> {
    ctx.require_present().await?;
    Ok(ctx.state.lock().await.preferred_rat)
}

/// Parses and applies a technology preference string.
///
/// The string must come from the HAL vocabulary and every named technology
/// must be supported by the modem. Nothing changes on failure.
pub(crate) async fn set_preferred_radio_technology(ctx: &ModemContext, value: &str) -> Result<()> {
    let rat: RadioTechSet = value.parse()?;
    ctx.require_present().await?;

    let mut state = ctx.state.lock().await;
    let supported = ctx.backend.supported_radio_technology().await?;
    if !supported.contains(rat.technologies()) {
        warn!("Rejecting preference {rat}: modem supports {supported}");
        return Err(HalError::UnsupportedRadioTechnology(rat.to_string()));
    }

    ctx.backend.set_preferred_radio_technology(rat).await?;
    state.preferred_rat = rat;
    debug!("Preferred radio technology set to {rat}");
    Ok(())
}

pub(crate) async fn signal_info(ctx: &ModemContext) -> Result<SignalInfo> {
    ctx.require_present().await?;
    let signal = ctx.backend.signal_info().await?;
    ctx.conform(check_signal_info(&signal))?;
    Ok(signal)
}

/// Current registration. Unregistered is reported as
/// [`HalError::NotRegistered`].
pub(crate) async fn plmn_info(ctx: &ModemContext) -> Result<PlmnInfo> {
    ctx.require_present().await?;
    let plmn = ctx
        .backend
        .plmn_info()
        .await?
        .ok_or(HalError::NotRegistered)?;
    ctx.conform(check_plmn_info(&plmn))?;
    Ok(plmn)
}

pub(crate) async fn available_networks(ctx: &ModemContext) -> Result<Vec<NetworkScanResult>> {
    ctx.require_present().await?;
    {
        let state = ctx.state.lock().await;
        if state.mode != OperatingMode::Online {
            return Err(HalError::ModemOffline(state.mode));
        }
    }

    let networks = ctx.backend.scan_networks().await?;
    for network in &networks {
        ctx.conform(check_scan_result(network))?;
    }
    debug!("Scan found {} networks", networks.len());
    Ok(networks)
}

/// Reads the traffic counters, checking them against the previous reading.
///
/// The baseline only advances on a conforming reading and is cleared by any
/// modem reset.
pub(crate) async fn packet_statistics(ctx: &ModemContext) -> Result<PacketStats> {
    ctx.require_present().await?;
    let mut state = ctx.state.lock().await;
    let stats = ctx.backend.packet_statistics().await?;
    ctx.conform(check_counters(state.last_stats.as_ref(), &stats))?;
    state.last_stats = Some(stats);
    Ok(stats)
}

/// Derives the WAN interface status from the tracked state, after
/// reconciling it with the modem's link state.
pub(crate) async fn interface_status(ctx: &ModemContext) -> Result<InterfaceStatus> {
    if !ctx.backend.is_present().await {
        return Ok(InterfaceStatus::NotPresent);
    }

    let mut state = ctx.state.lock().await;
    reconcile(ctx, &mut state).await?;
    let status = if state.mode != OperatingMode::Online {
        InterfaceStatus::LowerLayerDown
    } else if !state.sessions.is_empty() {
        InterfaceStatus::Up
    } else if state.attached {
        InterfaceStatus::Dormant
    } else {
        InterfaceStatus::Down
    };
    Ok(status)
}
