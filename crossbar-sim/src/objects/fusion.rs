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

use serde::Serialize;
use tracing::warn;

use crate::objects::{CloudPoint, Pose, TrackedObject};

/// A mapped object in the global frame.
#[derive(Debug, Clone, Serialize)]
pub struct Landmark {
    pub id: String,
    pub description: String,
    pub coordinates: Vec<CloudPoint>,
}

impl Landmark {
    /// Refines this landmark with a fresh observation by averaging matching
    /// points pairwise; observation points beyond the known ones are
    /// appended.
    fn refine(&mut self, observation: &[CloudPoint]) {
        let mut refined: Vec<CloudPoint> = self
            .coordinates
            .iter()
            .zip(observation)
            .map(|(known, seen)| CloudPoint {
                x: (known.x + seen.x) / 2.0,
                y: (known.y + seen.y) / 2.0,
            })
            .collect();
        if observation.len() > self.coordinates.len() {
            refined.extend_from_slice(&observation[self.coordinates.len()..]);
        }
        self.coordinates = refined;
    }
}

/// The global landmark map plus the pose track it was built against.
#[derive(Debug, Default)]
pub struct FusionMap {
    landmarks: Vec<Landmark>,
    poses: Vec<Pose>,
}

impl FusionMap {
    pub fn record_pose(&mut self, pose: Pose) {
        self.poses.push(pose);
    }

    pub fn pose_at(&self, time: u32) -> Option<Pose> {
        self.poses.iter().copied().find(|pose| pose.time == time)
    }

    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Merges a tracked object observed from `pose` into the map.
    ///
    /// Coordinates are rotated by the pose's yaw and translated to the global
    /// frame. Returns `true` when this created a new landmark rather than
    /// refining a known one.
    pub fn merge(&mut self, tracked: &TrackedObject, pose: Pose) -> bool {
        let global = Self::to_global(&tracked.coordinates, pose);
        match self
            .landmarks
            .iter_mut()
            .find(|landmark| landmark.id == tracked.id)
        {
            Some(known) => {
                known.refine(&global);
                false
            }
            None => {
                self.landmarks.push(Landmark {
                    id: tracked.id.clone(),
                    description: tracked.description.clone(),
                    coordinates: global,
                });
                true
            }
        }
    }

    /// Transforms rig-relative points into the global frame for the given
    /// pose.
    pub fn to_global(points: &[CloudPoint], pose: Pose) -> Vec<CloudPoint> {
        let yaw = pose.yaw.to_radians();
        let (sin, cos) = yaw.sin_cos();
        points
            .iter()
            .map(|point| CloudPoint {
                x: cos * point.x - sin * point.y + pose.x,
                y: sin * point.x + cos * point.y + pose.y,
            })
            .collect()
    }

    /// Merges every object in a batch, looking up the pose recorded for each
    /// object's capture time. Objects without a matching pose are skipped.
    /// Returns how many new landmarks appeared.
    pub fn merge_batch(&mut self, tracked: &[TrackedObject]) -> u32 {
        let mut new_landmarks = 0;
        for object in tracked {
            match self.pose_at(object.time) {
                Some(pose) => {
                    if self.merge(object, pose) {
                        new_landmarks += 1;
                    }
                }
                None => warn!(id = %object.id, time = object.time, "no pose recorded for observation"),
            }
        }
        new_landmarks
    }
}
