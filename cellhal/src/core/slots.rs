//! UICC slot queries, SIM power and device slot selection.

use log::{debug, info, warn};
use std::sync::Arc;

use crate::Result;
use crate::api::conformance::{check_slot_count, check_slot_info, check_string_output};
use crate::api::models::{
    HalError, ModemEvent, SlotSelectionEvent, SlotStatus, UiccSlotInfo, UiccStatus,
};
use crate::core::session::teardown;
use crate::core::state::{ModemContext, ModemState};
use crate::core::state_wait::Completion;
use crate::types::constants::limits;

/// Slot type reported in selection events.
const SLOT_TYPE: &str = "SIM";

fn slot_name(index: u32) -> String {
    format!("slot{}", index + 1)
}

/// A card that can carry service: powered, present and valid.
pub(crate) fn is_usable(slot: &UiccSlotInfo) -> bool {
    slot.slot_enabled && slot.card_present && slot.card_enabled && slot.status == UiccStatus::Valid
}

pub(crate) async fn slot_count(ctx: &ModemContext) -> Result<u32> {
    ctx.require_present().await?;
    let count = ctx.backend.uicc_slot_count().await?;
    ctx.conform(check_slot_count(count))?;
    Ok(count)
}

/// Snapshot of one slot. `index` must name a physical slot.
pub(crate) async fn slot_info(ctx: &ModemContext, index: u32) -> Result<UiccSlotInfo> {
    let count = slot_count(ctx).await?;
    if index >= count {
        return Err(HalError::InvalidSlot(index));
    }
    let info = ctx.backend.uicc_slot(index).await?;
    ctx.conform(check_slot_info(&info))?;
    Ok(info)
}

/// Resolves the active slot, picking the first slot with a card in it if
/// none has been selected yet.
pub(crate) async fn resolve_active_slot(
    ctx: &ModemContext,
    state: &mut ModemState,
) -> Result<Option<u32>> {
    if state.active_slot.is_some() {
        return Ok(state.active_slot);
    }

    let count = ctx.backend.uicc_slot_count().await?;
    for index in 0..count {
        if ctx.backend.uicc_slot(index).await?.card_present {
            debug!("Active slot resolved to {}", slot_name(index));
            state.active_slot = Some(index);
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// The active slot's snapshot, if a slot is active.
pub(crate) async fn active_slot_info(
    ctx: &ModemContext,
    state: &mut ModemState,
) -> Result<Option<UiccSlotInfo>> {
    match resolve_active_slot(ctx, state).await? {
        Some(index) => Ok(Some(ctx.backend.uicc_slot(index).await?)),
        None => Ok(None),
    }
}

/// Status of the card in the active slot. A missing or unpowered card is
/// reported as `Empty`.
pub(crate) async fn active_card_status(ctx: &ModemContext) -> Result<UiccStatus> {
    ctx.require_present().await?;
    let mut state = ctx.state.lock().await;
    let status = match active_slot_info(ctx, &mut state).await? {
        Some(slot) if slot.card_present && slot.card_enabled => slot.status,
        _ => UiccStatus::Empty,
    };
    Ok(status)
}

/// Which card identifier to read.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CardField {
    Iccid,
    Msisdn,
}

pub(crate) async fn card_identifier(ctx: &ModemContext, field: CardField) -> Result<String> {
    ctx.require_present().await?;
    let mut state = ctx.state.lock().await;
    let slot = active_slot_info(ctx, &mut state)
        .await?
        .filter(|s| s.card_present && s.card_enabled)
        .ok_or(HalError::NoActiveCard)?;

    let (name, value, capacity) = match field {
        CardField::Iccid => ("iccid", slot.iccid, limits::ICCID),
        CardField::Msisdn => ("msisdn", slot.msisdn, limits::MSISDN),
    };
    ctx.conform(check_string_output(name, &value, capacity))?;
    Ok(value)
}

/// Powers the card in `index` on or off.
///
/// Powering off the active card ends every data session and the packet
/// attach.
pub(crate) async fn sim_power(ctx: &ModemContext, index: u32, enable: bool) -> Result<()> {
    let count = slot_count(ctx).await?;
    if index >= count {
        return Err(HalError::InvalidSlot(index));
    }

    let mut state = ctx.state.lock().await;
    ctx.backend.set_sim_power(index, enable).await?;
    info!("{} card power {}", slot_name(index), if enable { "on" } else { "off" });

    if !enable && resolve_active_slot(ctx, &mut state).await? == Some(index) {
        teardown(ctx, &mut state);
    }
    Ok(())
}

/// Starts device slot selection.
///
/// The returned completion resolves with the final event: `Selected` with
/// the chosen slot, or `NotReady` when no slot holds a usable card. A
/// `Selecting` event is published before the slots are examined.
pub(crate) async fn select_device_slot(
    ctx: &Arc<ModemContext>,
) -> Result<Completion<SlotSelectionEvent>> {
    ctx.require_present().await?;

    let (completer, completion) = Completion::channel();
    let ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        let result = run_slot_selection(&ctx).await;
        if let Ok(event) = &result {
            ctx.publish(ModemEvent::SlotSelection(event.clone()));
        }
        completer.complete(result);
    });
    Ok(completion)
}

async fn run_slot_selection(ctx: &ModemContext) -> Result<SlotSelectionEvent> {
    let mut state = ctx.state.lock().await;
    ctx.publish(ModemEvent::SlotSelection(SlotSelectionEvent {
        slot_name: String::new(),
        slot_type: SLOT_TYPE.into(),
        slot_index: None,
        status: SlotStatus::Selecting,
    }));

    let count = ctx.backend.uicc_slot_count().await?;
    for index in 0..count {
        if is_usable(&ctx.backend.uicc_slot(index).await?) {
            if state.active_slot.is_some_and(|active| active != index) && state.attached {
                ctx.backend.detach().await?;
                teardown(ctx, &mut state);
            }
            state.active_slot = Some(index);
            info!("Selected {}", slot_name(index));
            return Ok(SlotSelectionEvent {
                slot_name: slot_name(index),
                slot_type: SLOT_TYPE.into(),
                slot_index: Some(index),
                status: SlotStatus::Selected,
            });
        }
    }

    warn!("No slot holds a usable card");
    Ok(SlotSelectionEvent {
        slot_name: String::new(),
        slot_type: SLOT_TYPE.into(),
        slot_index: None,
        status: SlotStatus::NotReady,
    })
}
