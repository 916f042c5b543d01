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

use crate::config::CameraConfig;
use crate::objects::SensorStatus;

/// The sentinel object id marking a poisoned detection in recorded data.
pub const FAULT_ID: &str = "ERROR";

/// One object a camera saw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectedObject {
    pub id: String,
    pub description: String,
}

/// Everything one camera saw at one capture time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectionFrame {
    /// The tick the frame was captured at.
    pub time: u32,
    pub detections: Vec<DetectedObject>,
}

impl DetectionFrame {
    /// The poisoned detection, if this frame carries one.
    pub fn fault(&self) -> Option<&DetectedObject> {
        self.detections.iter().find(|object| object.id == FAULT_ID)
    }
}

/// A camera working through its recorded frames.
///
/// A frame captured at time `t` is published at tick `t + frequency`; once
/// every recorded detection has been published the camera reports itself
/// down.
#[derive(Debug, Clone, Default)]
pub struct Camera {
    id: u32,
    frequency: u32,
    status: SensorStatus,
    frames: Vec<DetectionFrame>,
    last_published_time: u32,
    total_detections: usize,
    published_detections: usize,
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let total_detections = config
            .frames
            .iter()
            .map(|frame| frame.detections.len())
            .sum();
        Self {
            id: config.id,
            frequency: config.frequency,
            status: SensorStatus::Up,
            frames: config.frames,
            last_published_time: 0,
            total_detections,
            published_detections: 0,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn status(&self) -> SensorStatus {
        self.status
    }

    pub fn set_status(&mut self, status: SensorStatus) {
        self.status = status;
    }

    /// The frame due for publication at `tick`, if any.
    ///
    /// Due means captured exactly `frequency` ticks ago and not yet
    /// published. Publishing the last recorded detection flips the camera to
    /// [`SensorStatus::Down`].
    pub fn frame_for_tick(&mut self, tick: u32) -> Option<DetectionFrame> {
        if self.status != SensorStatus::Up {
            return None;
        }
        let due = self
            .frames
            .iter()
            .find(|frame| {
                frame.time + self.frequency == tick && frame.time > self.last_published_time
            })?
            .clone();

        self.last_published_time = due.time;
        self.published_detections += due.detections.len();
        if self.published_detections >= self.total_detections {
            self.status = SensorStatus::Down;
        }
        Some(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(time: u32, ids: &[&str]) -> DetectionFrame {
        DetectionFrame {
            time,
            detections: ids
                .iter()
                .map(|id| DetectedObject {
                    id: id.to_string(),
                    description: format!("object {id}"),
                })
                .collect(),
        }
    }

    fn camera(frequency: u32, frames: Vec<DetectionFrame>) -> Camera {
        Camera::new(CameraConfig {
            id: 7,
            frequency,
            frames,
        })
    }

    #[test]
    fn frames_publish_after_the_frequency_delay() {
        let mut camera = camera(2, vec![frame(1, &["Wall_1"]), frame(3, &["Door_1"])]);

        assert!(camera.frame_for_tick(1).is_none());
        assert!(camera.frame_for_tick(2).is_none());
        let published = camera.frame_for_tick(3).expect("frame captured at 1");
        assert_eq!(published.time, 1);
        assert_eq!(camera.status(), SensorStatus::Up);

        let published = camera.frame_for_tick(5).expect("frame captured at 3");
        assert_eq!(published.time, 3);
        // Everything recorded has now been published.
        assert_eq!(camera.status(), SensorStatus::Down);
        assert!(camera.frame_for_tick(7).is_none());
    }

    #[test]
    fn a_frame_is_published_at_most_once() {
        let mut camera = camera(1, vec![frame(2, &["Wall_1", "Wall_2"])]);
        assert!(camera.frame_for_tick(3).is_some());
        assert!(camera.frame_for_tick(3).is_none());
    }

    #[test]
    fn an_errored_camera_publishes_nothing() {
        let mut camera = camera(1, vec![frame(1, &["Wall_1"])]);
        camera.set_status(SensorStatus::Error);
        assert!(camera.frame_for_tick(2).is_none());
    }

    #[test]
    fn poisoned_detections_are_visible() {
        let poisoned = frame(4, &["Wall_1", FAULT_ID]);
        assert_eq!(poisoned.fault().unwrap().id, FAULT_ID);
        assert!(frame(4, &["Wall_1"]).fault().is_none());
    }
}
