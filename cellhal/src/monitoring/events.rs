use log::{debug, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;

use crate::Result;
use crate::api::models::{
    HalError, ModemEvent, PacketServiceEvent, RegistrationEvent, SlotSelectionEvent,
};
use crate::core::state::ModemContext;

/// Feeds every event `select` picks out of the bus to `callback`.
///
/// Returns when `shutdown` fires or its sender is dropped. Events missed
/// because the subscriber lagged are logged and skipped.
async fn watch_events<T, S, F>(
    ctx: &ModemContext,
    mut shutdown: watch::Receiver<()>,
    select: S,
    callback: F,
) -> Result<()>
where
    S: Fn(ModemEvent) -> Option<T>,
    F: Fn(T),
{
    let mut events = ctx.subscribe();

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("Event monitor shutting down");
                return Ok(());
            }
            received = events.recv() => match received {
                Ok(event) => {
                    if let Some(item) = select(event) {
                        callback(item);
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Event monitor lagged, {missed} events missed");
                }
                Err(RecvError::Closed) => return Err(HalError::Cancelled),
            }
        }
    }
}

/// Invokes `callback` on every registration change.
pub(crate) async fn monitor_registration<F>(
    ctx: &ModemContext,
    shutdown: watch::Receiver<()>,
    callback: F,
) -> Result<()>
where
    F: Fn(RegistrationEvent),
{
    watch_events(
        ctx,
        shutdown,
        |event| match event {
            ModemEvent::Registration(e) => Some(e),
            _ => None,
        },
        callback,
    )
    .await
}

/// Invokes `callback` on every slot selection event.
pub(crate) async fn monitor_slot_status<F>(
    ctx: &ModemContext,
    shutdown: watch::Receiver<()>,
    callback: F,
) -> Result<()>
where
    F: Fn(SlotSelectionEvent),
{
    watch_events(
        ctx,
        shutdown,
        |event| match event {
            ModemEvent::SlotSelection(e) => Some(e),
            _ => None,
        },
        callback,
    )
    .await
}

/// Invokes `callback` whenever a data session goes up or down.
pub(crate) async fn monitor_packet_service<F>(
    ctx: &ModemContext,
    shutdown: watch::Receiver<()>,
    callback: F,
) -> Result<()>
where
    F: Fn(PacketServiceEvent),
{
    watch_events(
        ctx,
        shutdown,
        |event| match event {
            ModemEvent::PacketService(e) => Some(e),
            _ => None,
        },
        callback,
    )
    .await
}
