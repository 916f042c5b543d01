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

use std::sync::Arc;

use tracing::{debug, info, warn};

use crossbar::prelude::*;

use crate::messages::{
    CrashedBroadcast, DetectObjectsEvent, TerminatedBroadcast, TickBroadcast, TrackedObjectsEvent,
};
use crate::objects::{LidarTracker, RunStats, SensorStatus};

#[crossbar_actor]
pub struct LidarState {
    tracker: LidarTracker,
    stats: Arc<RunStats>,
}

/// Starts one LiDAR tracker service.
///
/// Camera frames arrive as round-robin events and are acknowledged through
/// the reply channel; each tick, detections that have waited out the
/// tracker's frequency get their coordinates resolved and move on to fusion
/// as a [`TrackedObjectsEvent`].
pub async fn start_lidar(
    app: &mut ActorRuntime,
    tracker: LidarTracker,
    stats: Arc<RunStats>,
) -> anyhow::Result<ActorHandle> {
    let name = format!("lidar_{}", tracker.id());
    stats.register_sensor(&name);

    let mut service = app.new_actor::<LidarState>(&name);
    service.model.tracker = tracker;
    service.model.stats = stats;

    service
        .act_on::<DetectObjectsEvent>(|actor, context| {
            handle_detections(actor, context);
            ActorReply::immediate()
        })
        .act_on::<TickBroadcast>(|actor, context| {
            handle_tick(actor, context.message().tick);
            ActorReply::immediate()
        })
        .act_on::<TerminatedBroadcast>(|actor, _context| {
            info!(lidar = %actor.id, "terminating on notice");
            actor.terminate();
            ActorReply::immediate()
        })
        .act_on::<CrashedBroadcast>(|actor, _context| {
            info!(lidar = %actor.id, "terminating after crash notice");
            actor.terminate();
            ActorReply::immediate()
        });

    service.subscribe_event::<DetectObjectsEvent>()?;
    service.subscribe_broadcast::<TickBroadcast>()?;
    service.subscribe_broadcast::<TerminatedBroadcast>()?;
    service.subscribe_broadcast::<CrashedBroadcast>()?;

    Ok(service.start().await)
}

fn handle_detections(
    actor: &mut ManagedActor<Started, LidarState>,
    context: &MessageContext<DetectObjectsEvent>,
) {
    let queued = actor.model.tracker.ingest(&context.message().frame);
    match queued {
        Ok(()) => {
            debug!(lidar = %actor.id, time = context.message().frame.time, "frame queued");
            if let Some(token) = context.reply_token() {
                actor.complete(token, true);
            }
        }
        Err(reason) => {
            // Refuse the frame, then crash the run.
            if let Some(token) = context.reply_token() {
                actor.complete(token, false);
            }
            actor.send_broadcast(CrashedBroadcast {
                source: actor.id.name().to_string(),
                reason,
            });
            actor.terminate();
        }
    }
}

fn handle_tick(actor: &mut ManagedActor<Started, LidarState>, tick: u32) {
    let name = actor.id.name().to_string();

    if actor.model.tracker.status() == SensorStatus::Error {
        actor.send_broadcast(CrashedBroadcast {
            source: name,
            reason: "tracker is in the error state".into(),
        });
        actor.terminate();
        return;
    }

    match actor.model.tracker.advance(tick) {
        Ok(resolved) => {
            if !resolved.is_empty() {
                let lidar_id = actor.model.tracker.id();
                for object in &resolved {
                    actor.model.stats.record_lidar_frame(lidar_id, object.clone());
                }
                actor.model.stats.add_tracked(resolved.len() as u32);

                // The acknowledgment is dropped; fusion's reply carries
                // nothing the tracker acts on.
                if let Err(error) = actor.send_event(TrackedObjectsEvent { tracked: resolved }) {
                    warn!(lidar = %name, %error, "tracked objects have no fusion to go to");
                }
            }
        }
        Err(reason) => {
            warn!(lidar = %name, %reason, "recorded data fault; crashing the run");
            actor.send_broadcast(CrashedBroadcast {
                source: name,
                reason,
            });
            actor.terminate();
            return;
        }
    }

    if actor.model.tracker.status() == SensorStatus::Up && actor.model.tracker.is_data_exhausted() {
        info!(lidar = %name, "no returns left to resolve; sensor down");
        actor.model.tracker.set_status(SensorStatus::Down);
        actor.model.stats.mark_sensor_down(&name);
        if actor.model.stats.all_sensors_down() {
            info!(lidar = %name, "every sensor is down; announcing termination");
            actor.send_broadcast(TerminatedBroadcast);
            actor.terminate();
        }
    }
}
