//! Event-bus worker delivering promotion events to the handler.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::handler::PromotionLoggingHandler;
use crate::PromotionActionCreated;

/// Delivers bus events to the handler in order until the sender side closes
/// or the shutdown signal flips. Already-queued events are drained before a
/// shutdown is honored.
pub async fn run_promotion_event_worker(
    mut events: mpsc::Receiver<PromotionActionCreated>,
    handler: Arc<PromotionLoggingHandler>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    while let Ok(event) = events.try_recv() {
                        deliver(&handler, &event).await;
                    }
                    debug!("promotion event worker stopping");
                    return;
                }
            }
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    debug!("promotion event bus closed");
                    return;
                };
                deliver(&handler, &event).await;
            }
        }
    }
}

async fn deliver(handler: &PromotionLoggingHandler, event: &PromotionActionCreated) {
    if let Err(error) = handler.handle(event).await {
        warn!(
            action_id = event.action_id,
            "promotion event handling failed: {error:#}"
        );
    }
}
