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

use tracing::{info, warn};

use crossbar::prelude::*;

use crate::messages::{CrashedBroadcast, DetectObjectsEvent, TerminatedBroadcast, TickBroadcast};
use crate::objects::{Camera, RunStats, SensorStatus};

#[crossbar_actor]
pub struct CameraState {
    camera: Camera,
    stats: Arc<RunStats>,
}

/// Starts one camera service.
///
/// On every tick the camera publishes the frame that is due, if any, as a
/// [`DetectObjectsEvent`] routed to one LiDAR tracker. A poisoned frame
/// crashes the run; running out of frames marks the sensor down and, once
/// every sensor is down, triggers orderly termination.
pub async fn start_camera(
    app: &mut ActorRuntime,
    camera: Camera,
    stats: Arc<RunStats>,
) -> anyhow::Result<ActorHandle> {
    let name = format!("camera_{}", camera.id());
    stats.register_sensor(&name);

    let mut service = app.new_actor::<CameraState>(&name);
    service.model.camera = camera;
    service.model.stats = stats;

    service
        .act_on::<TickBroadcast>(|actor, context| {
            handle_tick(actor, context.message().tick);
            ActorReply::immediate()
        })
        .act_on::<TerminatedBroadcast>(|actor, _context| {
            info!(camera = %actor.id, "terminating on notice");
            actor.terminate();
            ActorReply::immediate()
        })
        .act_on::<CrashedBroadcast>(|actor, _context| {
            info!(camera = %actor.id, "terminating after crash notice");
            actor.terminate();
            ActorReply::immediate()
        });

    service.subscribe_broadcast::<TickBroadcast>()?;
    service.subscribe_broadcast::<TerminatedBroadcast>()?;
    service.subscribe_broadcast::<CrashedBroadcast>()?;

    Ok(service.start().await)
}

fn handle_tick(actor: &mut ManagedActor<Started, CameraState>, tick: u32) {
    let name = actor.id.name().to_string();

    if actor.model.camera.status() == SensorStatus::Error {
        actor.send_broadcast(CrashedBroadcast {
            source: name,
            reason: "camera is in the error state".into(),
        });
        actor.terminate();
        return;
    }

    if actor.model.camera.status() == SensorStatus::Up {
        let Some(frame) = actor.model.camera.frame_for_tick(tick) else {
            return;
        };

        if let Some(fault) = frame.fault() {
            warn!(camera = %name, reason = %fault.description, "poisoned frame; crashing the run");
            actor.send_broadcast(CrashedBroadcast {
                source: name,
                reason: fault.description.clone(),
            });
            actor.terminate();
            return;
        }

        let camera_id = actor.model.camera.id();
        actor.model.stats.record_camera_frame(camera_id, frame.clone());
        actor
            .model
            .stats
            .add_detected(frame.detections.len() as u32);
        if actor.model.camera.status() == SensorStatus::Down {
            info!(camera = %name, "all frames published; sensor down");
            actor.model.stats.mark_sensor_down(&name);
        }

        // The returned acknowledgment future is dropped on purpose: the
        // tracker's reply carries no information the camera acts on.
        if let Err(error) = actor.send_event(DetectObjectsEvent { frame }) {
            warn!(camera = %name, %error, "detections have no tracker to go to");
        }
    } else if actor.model.stats.all_sensors_down() {
        info!(camera = %name, "every sensor is down; announcing termination");
        actor.send_broadcast(TerminatedBroadcast);
        actor.terminate();
    }
}
