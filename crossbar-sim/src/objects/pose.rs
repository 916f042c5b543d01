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

use serde::{Deserialize, Serialize};

/// The rig's position and orientation relative to its docking station, at the
/// tick it reached them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Pose {
    pub time: u32,
    pub x: f64,
    pub y: f64,
    /// Orientation in degrees, counter-clockwise from the station's x axis.
    pub yaw: f64,
}

/// The recorded pose track the pose service publishes from.
#[derive(Debug, Clone, Default)]
pub struct PoseLog {
    poses: Vec<Pose>,
}

impl PoseLog {
    pub fn new(poses: Vec<Pose>) -> Self {
        Self { poses }
    }

    /// The recorded pose for exactly this tick, if the track has one.
    pub fn pose_at(&self, tick: u32) -> Option<Pose> {
        self.poses.iter().copied().find(|pose| pose.time == tick)
    }

    /// The latest recorded pose at or before `tick`.
    pub fn latest_until(&self, tick: u32) -> Option<Pose> {
        self.poses
            .iter()
            .copied()
            .filter(|pose| pose.time <= tick)
            .max_by_key(|pose| pose.time)
    }

    /// Whether the track ends before `tick`.
    pub fn is_exhausted_at(&self, tick: u32) -> bool {
        self.poses.iter().all(|pose| pose.time < tick)
    }
}
