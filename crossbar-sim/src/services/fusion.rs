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

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crossbar::prelude::*;

use crate::messages::{
    CrashedBroadcast, PoseEvent, TerminatedBroadcast, TickBroadcast, TrackedObjectsEvent,
};
use crate::objects::{FusionMap, RunStats};
use crate::output;

#[crossbar_actor]
pub struct FusionState {
    map: FusionMap,
    stats: Arc<RunStats>,
    output_dir: PathBuf,
}

/// Starts the map-fusion service.
///
/// It consumes poses and tracked objects as events, folds them into the
/// global landmark map, counts runtime ticks, and writes the run report when
/// the run ends — the regular report on orderly termination, the error
/// report on a crash.
pub async fn start_fusion(
    app: &mut ActorRuntime,
    stats: Arc<RunStats>,
    output_dir: PathBuf,
) -> anyhow::Result<ActorHandle> {
    let mut service = app.new_actor::<FusionState>("fusion");
    service.model.stats = stats;
    service.model.output_dir = output_dir;

    service
        .act_on::<TickBroadcast>(|actor, _context| {
            actor.model.stats.add_runtime(1);
            ActorReply::immediate()
        })
        .act_on::<PoseEvent>(|actor, context| {
            debug!(time = context.message().pose.time, "pose recorded");
            actor.model.map.record_pose(context.message().pose);
            if let Some(token) = context.reply_token() {
                actor.complete(token, true);
            }
            ActorReply::immediate()
        })
        .act_on::<TrackedObjectsEvent>(|actor, context| {
            let tracked = &context.message().tracked;
            let created = actor.model.map.merge_batch(tracked);
            actor.model.stats.add_landmarks(created);
            debug!(
                merged = tracked.len(),
                new_landmarks = created,
                "tracked objects fused"
            );
            if let Some(token) = context.reply_token() {
                actor.complete(token, true);
            }
            ActorReply::immediate()
        })
        .act_on_fallible::<TerminatedBroadcast>(|actor, _context| {
            info!("run over; writing the final report");
            let written = output::write_final_report(
                &actor.model.output_dir,
                &actor.model.stats,
                &actor.model.map,
            );
            actor.terminate();
            Box::pin(async move { written })
        })
        .act_on_fallible::<CrashedBroadcast>(|actor, context| {
            info!(source = %context.message().source, "crash; writing the error report");
            let written = output::write_error_report(
                &actor.model.output_dir,
                &actor.model.stats,
                &actor.model.map,
                &context.message().source,
                &context.message().reason,
            );
            actor.terminate();
            Box::pin(async move { written })
        });

    service.subscribe_event::<PoseEvent>()?;
    service.subscribe_event::<TrackedObjectsEvent>()?;
    service.subscribe_broadcast::<TickBroadcast>()?;
    service.subscribe_broadcast::<TerminatedBroadcast>()?;
    service.subscribe_broadcast::<CrashedBroadcast>()?;

    Ok(service.start().await)
}
