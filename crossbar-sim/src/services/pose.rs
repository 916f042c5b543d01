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

use tracing::{debug, info, warn};

use crossbar::prelude::*;

use crate::messages::{CrashedBroadcast, PoseEvent, TerminatedBroadcast, TickBroadcast};
use crate::objects::PoseLog;

#[crossbar_actor]
pub struct PoseState {
    log: PoseLog,
    /// The recorded track ran out and the final pose was already re-sent.
    final_pose_sent: bool,
}

/// Starts the pose service.
///
/// Each tick it publishes the recorded pose as a [`PoseEvent`] toward fusion.
/// When the track runs out it re-sends the last known pose once, then
/// announces orderly termination on the following tick.
pub async fn start_pose(app: &mut ActorRuntime, log: PoseLog) -> anyhow::Result<ActorHandle> {
    let mut service = app.new_actor::<PoseState>("pose");
    service.model.log = log;

    service
        .act_on::<TickBroadcast>(|actor, context| {
            handle_tick(actor, context.message().tick);
            ActorReply::immediate()
        })
        .act_on::<TerminatedBroadcast>(|actor, _context| {
            info!("pose service terminating on notice");
            actor.terminate();
            ActorReply::immediate()
        })
        .act_on::<CrashedBroadcast>(|actor, _context| {
            info!("pose service terminating after crash notice");
            actor.terminate();
            ActorReply::immediate()
        });

    service.subscribe_broadcast::<TickBroadcast>()?;
    service.subscribe_broadcast::<TerminatedBroadcast>()?;
    service.subscribe_broadcast::<CrashedBroadcast>()?;

    Ok(service.start().await)
}

fn handle_tick(actor: &mut ManagedActor<Started, PoseState>, tick: u32) {
    if let Some(pose) = actor.model.log.pose_at(tick) {
        debug!(tick, "publishing pose");
        if let Err(error) = actor.send_event(PoseEvent { pose }) {
            warn!(tick, %error, "pose has nowhere to go");
        }
        return;
    }

    if !actor.model.log.is_exhausted_at(tick) {
        // A gap in the middle of the track; fusion will have to do without
        // this tick.
        warn!(tick, "no pose recorded for this tick");
        return;
    }

    if !actor.model.final_pose_sent {
        if let Some(last) = actor.model.log.latest_until(tick) {
            info!(tick, "track exhausted; re-sending the final pose");
            if let Err(error) = actor.send_event(PoseEvent { pose: last }) {
                warn!(tick, %error, "pose has nowhere to go");
            }
        }
        actor.model.final_pose_sent = true;
    } else {
        info!(tick, "pose track exhausted; announcing termination");
        actor.send_broadcast(TerminatedBroadcast);
        actor.terminate();
    }
}
