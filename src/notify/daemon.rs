//! Overlay scheduler: the only place overlay state is mutated.

use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;

use super::icons::IconAssetProvider;
use super::overlay::{OverlayController, OverlayRenderer};
use super::queue::NotificationQueue;

/// One frame: drain everything queued and advance the animation.
///
/// Returns the number of events consumed.
pub fn step<R, I>(
    controller: &mut OverlayController<R, I>,
    queue: &NotificationQueue,
    now: Instant,
) -> usize
where
    R: OverlayRenderer,
    I: IconAssetProvider,
{
    let events = queue.drain_all();
    let consumed = events.len();
    controller.tick(now, events);
    consumed
}

/// Run the overlay at a fixed frame period, forever.
///
/// Borrowing the controller lets the caller tear the popup down after
/// cancelling this future (e.g. on Ctrl-C).
pub async fn run<R, I>(
    controller: &mut OverlayController<R, I>,
    queue: &NotificationQueue,
    period: Duration,
) where
    R: OverlayRenderer,
    I: IconAssetProvider,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let tick = interval.tick().await;
        step(controller, queue, tick.into_std());
    }
}
