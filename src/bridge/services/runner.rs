//! Event-loop driver for a long-running bridge.
//!
//! The runtime's event stream is an out-of-scope collaborator; embedders
//! adapt it to a [`ContainerEvent`] channel and hand the receiver to
//! [`run`], which drives the bridge until the stream closes or the
//! cancellation token fires. Refresh and periodic resync tick on the
//! intervals from the bridge configuration; an interval of zero disables
//! its timer.

use crate::bridge::domain::ContainerId;
use crate::bridge::services::Bridge;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// One container lifecycle event from the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEvent {
    /// A container started.
    Started(ContainerId),
    /// A container died or was removed.
    Died(ContainerId),
}

/// Drives the bridge from a container event stream until cancellation.
pub async fn run(
    bridge: Bridge,
    mut events: mpsc::Receiver<ContainerEvent>,
    cancel: CancellationToken,
) {
    let mut refresh_timer = interval_for(bridge.config().refresh_interval);
    let mut resync_timer = interval_for(bridge.config().resync_interval);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ContainerEvent::Started(container_id)) => bridge.add(&container_id).await,
                Some(ContainerEvent::Died(container_id)) => {
                    bridge.remove_on_exit(&container_id).await;
                }
                None => {
                    info!("event stream closed, stopping bridge runner");
                    break;
                }
            },
            () = tick(&mut refresh_timer) => bridge.refresh().await,
            () = tick(&mut resync_timer) => {
                if let Err(err) = bridge.sync(true).await {
                    warn!(error = %err, "periodic sync failed");
                }
            }
            () = cancel.cancelled() => {
                info!("bridge runner shutting down");
                break;
            }
        }
    }
}

fn interval_for(secs: i64) -> Option<Interval> {
    let secs = u64::try_from(secs).ok().filter(|&secs| secs > 0)?;
    let period = Duration::from_secs(secs);
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}

async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
