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

//! The message vocabulary of the simulation.
//!
//! Broadcasts carry system-wide notices (clock ticks, orderly termination,
//! crashes); events carry sensor data toward the services that consume it and
//! are acknowledged through the reply channel.

use crossbar::prelude::*;

use crate::objects::{DetectionFrame, Pose, TrackedObject};

/// The global clock advanced by one tick.
#[crossbar_message(broadcast)]
pub struct TickBroadcast {
    pub tick: u32,
}

/// The run is over; every service should finish up and stop.
#[crossbar_message(broadcast)]
pub struct TerminatedBroadcast;

/// A sensor failed; every service should stop and the error report should be
/// written.
#[crossbar_message(broadcast)]
pub struct CrashedBroadcast {
    /// The service that observed the fault.
    pub source: String,
    pub reason: String,
}

/// A camera publishing one frame of detections toward a LiDAR tracker.
/// The reply acknowledges whether the tracker queued the frame.
#[crossbar_message(reply(bool))]
pub struct DetectObjectsEvent {
    pub frame: DetectionFrame,
}

/// A LiDAR tracker publishing objects with resolved coordinates toward map
/// fusion. The reply acknowledges the merge.
#[crossbar_message(reply(bool))]
pub struct TrackedObjectsEvent {
    pub tracked: Vec<TrackedObject>,
}

/// The rig's pose at one tick, consumed by map fusion.
/// The reply acknowledges the pose was recorded.
#[crossbar_message(reply(bool))]
pub struct PoseEvent {
    pub pose: Pose,
}
