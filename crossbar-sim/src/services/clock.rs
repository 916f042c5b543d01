/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crossbar::prelude::*;

use crate::messages::{CrashedBroadcast, TerminatedBroadcast, TickBroadcast};

#[crossbar_actor]
pub struct ClockState {
    stopped: Arc<AtomicBool>,
}

/// Starts the global clock: an actor watching for early shutdown plus a
/// driver task broadcasting one tick per interval.
///
/// After `duration` ticks the driver announces orderly termination. A crash
/// or termination notice from elsewhere stops the driver at the next tick
/// boundary.
pub async fn start_clock(
    app: &mut ActorRuntime,
    tick_interval: Duration,
    duration: u32,
) -> anyhow::Result<(ActorHandle, JoinHandle<()>)> {
    let mut clock = app.new_actor::<ClockState>("clock");
    let stopped = clock.model.stopped.clone();

    clock
        .act_on::<CrashedBroadcast>(|actor, context| {
            info!(source = %context.message().source, "clock stopping after crash notice");
            actor.model.stopped.store(true, Ordering::SeqCst);
            actor.terminate();
            ActorReply::immediate()
        })
        .act_on::<TerminatedBroadcast>(|actor, _context| {
            debug!("clock stopping after termination notice");
            actor.model.stopped.store(true, Ordering::SeqCst);
            actor.terminate();
            ActorReply::immediate()
        });
    clock.subscribe_broadcast::<CrashedBroadcast>()?;
    clock.subscribe_broadcast::<TerminatedBroadcast>()?;

    let handle = clock.start().await;
    let bus = handle.bus();

    let driver = tokio::spawn(async move {
        for tick in 1..=duration {
            if stopped.load(Ordering::SeqCst) {
                info!(tick, "clock stopped early");
                return;
            }
            debug!(tick, "tick");
            bus.send_broadcast(TickBroadcast { tick });
            tokio::time::sleep(tick_interval).await;
        }
        if !stopped.load(Ordering::SeqCst) {
            info!(duration, "run complete; announcing termination");
            bus.send_broadcast(TerminatedBroadcast);
        }
    });

    Ok((handle, driver))
}
