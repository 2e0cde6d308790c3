//! Initialization, operating modes and resets.

use log::{debug, info, warn};

use crate::Result;
use crate::api::models::{HalError, InitConfig, ModemOperatingConfig, OperatingMode, RadioTechSet};
use crate::core::session::teardown;
use crate::core::state::{ModemContext, ModemState};
use crate::core::validation::check_profile;

/// Initialization.
///
/// Writes the default profile and applies the technology preference. Calling
/// it again replaces the stored configuration and default profile, unless a
/// running session uses that profile.
pub(crate) async fn init(ctx: &ModemContext, config: InitConfig) -> Result<()> {
    check_profile(&config.default_profile)?;
    ctx.require_present().await?;

    let mut state = ctx.state.lock().await;
    let id = config.default_profile.profile_id;
    if state.sessions.uses_profile(id) {
        return Err(HalError::ProfileInUse(id));
    }

    let rat = RadioTechSet::from_preference(config.preferred_technology);
    let supported = ctx.backend.supported_radio_technology().await?;
    if !supported.contains(rat.technologies()) {
        return Err(HalError::UnsupportedRadioTechnology(rat.to_string()));
    }

    let previous = state.profiles.get(id).cloned();
    let mut profile = config.default_profile.clone();
    profile.is_default = true;
    ctx.backend.write_profile(&profile).await?;
    if let Err(e) = ctx.backend.set_preferred_radio_technology(rat).await {
        warn!("Rolling back default profile after failed preference: {e}");
        let rollback = match &previous {
            Some(previous) => ctx.backend.write_profile(previous).await,
            None => ctx.backend.erase_profile(id).await,
        };
        if let Err(rollback) = rollback {
            warn!("Rollback of profile {id} failed: {rollback}");
        }
        return Err(e);
    }

    if state.init.is_some() {
        debug!("Replacing earlier initialization");
    }
    state.profiles.upsert(profile);
    state.preferred_rat = rat;
    info!(
        "Modem initialized: family={}, technology={} ({rat}), default profile {id}",
        config.ip_family, config.preferred_technology
    );
    state.init = Some(config);
    Ok(())
}

pub(crate) async fn is_initialized(ctx: &ModemContext) -> bool {
    ctx.state.lock().await.init.is_some()
}

pub(crate) async fn operating_mode(ctx: &ModemContext) -> OperatingMode {
    ctx.state.lock().await.mode
}

/// Applies an operating configuration request.
pub(crate) async fn set_operating_configuration(
    ctx: &ModemContext,
    config: ModemOperatingConfig,
) -> Result<()> {
    let mode = match config {
        ModemOperatingConfig::Online => OperatingMode::Online,
        ModemOperatingConfig::Offline => OperatingMode::Offline,
        ModemOperatingConfig::LowPower => OperatingMode::LowPower,
        ModemOperatingConfig::Reset => return reset(ctx).await,
        ModemOperatingConfig::FactoryReset => return factory_reset(ctx).await,
    };

    ctx.require_present().await?;
    let mut state = ctx.state.lock().await;
    if state.mode == mode {
        debug!("Modem already {mode}");
        return Ok(());
    }

    ctx.backend.set_operating_mode(mode).await?;
    if mode != OperatingMode::Online {
        teardown(ctx, &mut state);
    }
    state.mode = mode;
    info!("Modem is now {mode}");
    Ok(())
}

fn after_restart(ctx: &ModemContext, state: &mut ModemState) {
    teardown(ctx, state);
    state.mode = OperatingMode::Online;
    state.last_stats = None;
}

/// Restarts the modem. Profiles and initialization survive.
pub(crate) async fn reset(ctx: &ModemContext) -> Result<()> {
    ctx.require_present().await?;
    let mut state = ctx.state.lock().await;
    ctx.backend.reset().await?;
    after_restart(ctx, &mut state);
    info!("Modem reset");
    Ok(())
}

/// Restores factory defaults: no profiles, no initialization, `AUTO`
/// technology preference.
pub(crate) async fn factory_reset(ctx: &ModemContext) -> Result<()> {
    ctx.require_present().await?;
    let mut state = ctx.state.lock().await;
    ctx.backend.factory_reset().await?;
    after_restart(ctx, &mut state);
    state.profiles.clear();
    state.init = None;
    state.preferred_rat = RadioTechSet::AUTO;
    state.active_slot = None;
    info!("Modem factory reset");
    Ok(())
}
