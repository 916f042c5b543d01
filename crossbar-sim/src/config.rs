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

//! Scenario configuration: one JSON file describing the clock, every sensor,
//! the recorded cloud-point data, and the rig's pose track.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::objects::{CloudPointFrame, DetectionFrame, Pose};

/// A full simulation scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Wall-clock duration of one tick, in milliseconds.
    pub tick_millis: u64,
    /// Total number of ticks the clock emits before ending the run.
    pub duration: u32,
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
    #[serde(default)]
    pub lidars: Vec<LidarConfig>,
    /// Recorded LiDAR returns, shared by every tracker.
    #[serde(default)]
    pub cloud_points: Vec<CloudPointFrame>,
    /// The rig's pose at each tick it reached one.
    #[serde(default)]
    pub poses: Vec<Pose>,
}

/// One camera: an id, a processing delay, and its recorded detection frames.
#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    pub id: u32,
    /// Ticks between a frame's capture time and when the camera publishes it.
    pub frequency: u32,
    #[serde(default)]
    pub frames: Vec<DetectionFrame>,
}

/// One LiDAR tracker: an id and its processing delay in ticks.
#[derive(Debug, Clone, Deserialize)]
pub struct LidarConfig {
    pub id: u32,
    pub frequency: u32,
}

impl Scenario {
    /// Loads a scenario from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario file {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&raw)
            .with_context(|| format!("parsing scenario file {}", path.display()))?;
        info!(
            cameras = scenario.cameras.len(),
            lidars = scenario.lidars.len(),
            poses = scenario.poses.len(),
            duration = scenario.duration,
            "scenario loaded"
        );
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_scenario() {
        let raw = r#"{
            "tick_millis": 50,
            "duration": 6,
            "cameras": [
                {
                    "id": 1,
                    "frequency": 1,
                    "frames": [
                        {
                            "time": 2,
                            "detections": [
                                { "id": "Wall_1", "description": "north wall" }
                            ]
                        }
                    ]
                }
            ],
            "lidars": [ { "id": 1, "frequency": 1 } ],
            "cloud_points": [
                {
                    "id": "Wall_1",
                    "time": 2,
                    "points": [ { "x": 0.5, "y": 3.9 }, { "x": 0.2, "y": 3.7 } ]
                }
            ],
            "poses": [ { "time": 1, "x": 0.0, "y": 0.0, "yaw": 0.0 } ]
        }"#;

        let scenario: Scenario = serde_json::from_str(raw).unwrap();
        assert_eq!(scenario.duration, 6);
        assert_eq!(scenario.cameras.len(), 1);
        assert_eq!(scenario.cameras[0].frames[0].detections[0].id, "Wall_1");
        assert_eq!(scenario.cloud_points[0].points.len(), 2);
        assert_eq!(scenario.poses[0].time, 1);
    }

    #[test]
    fn sensor_sections_default_to_empty() {
        let scenario: Scenario =
            serde_json::from_str(r#"{ "tick_millis": 10, "duration": 1 }"#).unwrap();
        assert!(scenario.cameras.is_empty());
        assert!(scenario.lidars.is_empty());
        assert!(scenario.cloud_points.is_empty());
        assert!(scenario.poses.is_empty());
    }
}
