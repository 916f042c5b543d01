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

//! Domain objects of the perception rig. These hold the sensor data and map
//! state; all messaging lives in the service layer on top of them.

pub use camera::{Camera, DetectedObject, DetectionFrame};
pub use fusion::{FusionMap, Landmark};
pub use lidar::{CloudPoint, CloudPointFrame, CloudPointsDb, LidarTracker, TrackedObject};
pub use pose::{Pose, PoseLog};
pub use stats::RunStats;

mod camera;
mod fusion;
mod lidar;
mod pose;
mod stats;

/// Operational state of a sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SensorStatus {
    #[default]
    Up,
    /// Out of data; finished cleanly.
    Down,
    /// Observed a fault; the run must crash.
    Error,
}
