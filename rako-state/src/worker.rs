//! Background listener task for one bridge
//!
//! The task opens the bridge's status listener, then alternates between
//! waiting for the next message and dispatching it. Both waits race the
//! cancellation token, so a stop request is honoured wherever the task is
//! suspended. The listener is owned by the task and dropped on every exit.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use rako_protocol::{Bridge, LevelCache, ListenerFactory, Message};

use crate::dispatch::dispatch;
use crate::error::Result;
use crate::manager::BridgeState;

/// Everything the listener task needs from its controller
pub(crate) struct ListenerContext {
    pub bridge: Arc<Bridge>,
    pub levels: Arc<LevelCache>,
    pub factory: Arc<dyn ListenerFactory>,
    pub state: Arc<Mutex<BridgeState>>,
}

/// Listener task body
///
/// Returns `Ok(())` when cancelled. Returns an error when the listener could
/// not be opened or its transport failed; undecodable datagrams are skipped.
pub(crate) async fn run_listener(ctx: ListenerContext, cancel: CancellationToken) -> Result<()> {
    let bridge_id = ctx.bridge.id();

    let opened = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(()),
        opened = ctx.factory.open(ctx.bridge.port) => opened,
    };
    let mut source = match opened {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("Failed to open status listener for {}: {}", ctx.bridge, e);
            return Err(e.into());
        }
    };

    tracing::info!("Listening for status updates from {}", ctx.bridge);

    loop {
        let received = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            received = source.next_message() => received,
        };

        match received {
            Ok(Some(Message::Status(status))) => {
                let state = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    state = ctx.state.lock() => state,
                };
                let reached = dispatch(bridge_id, &state.registry, &ctx.levels, &status);
                tracing::debug!("{:?} reached {} observers", status, reached);
            }
            Ok(Some(other)) => {
                tracing::trace!("Ignoring non-status message {:?}", other);
            }
            Ok(None) => {
                tracing::trace!("No status from {} within receive timeout", ctx.bridge);
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Skipping datagram from {}: {}", ctx.bridge, e);
            }
            Err(e) => {
                tracing::error!("Status listener for {} failed: {}", ctx.bridge, e);
                return Err(e.into());
            }
        }
    }

    tracing::info!("Stopped listening for status updates from {}", ctx.bridge);
    Ok(())
}
