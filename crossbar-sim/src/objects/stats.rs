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

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::objects::{DetectionFrame, SensorStatus, TrackedObject};

/// Run-wide counters and last-seen sensor frames, shared by every service.
///
/// Counters are atomics because every service bumps them from its own task;
/// the last-frame maps feed the error report when a run crashes.
#[derive(Debug, Default)]
pub struct RunStats {
    runtime_ticks: AtomicU32,
    detected_objects: AtomicU32,
    tracked_objects: AtomicU32,
    landmarks: AtomicU32,
    active_sensors: AtomicUsize,
    sensor_status: DashMap<String, SensorStatus>,
    cameras_last_frame: DashMap<u32, DetectionFrame>,
    lidars_last_frame: DashMap<u32, TrackedObject>,
}

impl RunStats {
    pub fn add_runtime(&self, ticks: u32) {
        self.runtime_ticks.fetch_add(ticks, Ordering::SeqCst);
    }

    pub fn add_detected(&self, count: u32) {
        self.detected_objects.fetch_add(count, Ordering::SeqCst);
    }

    pub fn add_tracked(&self, count: u32) {
        self.tracked_objects.fetch_add(count, Ordering::SeqCst);
    }

    pub fn add_landmarks(&self, count: u32) {
        self.landmarks.fetch_add(count, Ordering::SeqCst);
    }

    pub fn runtime_ticks(&self) -> u32 {
        self.runtime_ticks.load(Ordering::SeqCst)
    }

    pub fn detected_objects(&self) -> u32 {
        self.detected_objects.load(Ordering::SeqCst)
    }

    pub fn tracked_objects(&self) -> u32 {
        self.tracked_objects.load(Ordering::SeqCst)
    }

    pub fn landmarks(&self) -> u32 {
        self.landmarks.load(Ordering::SeqCst)
    }

    /// Declares a live sensor. Each sensor registers once at startup.
    pub fn register_sensor(&self, name: &str) {
        self.sensor_status.insert(name.to_string(), SensorStatus::Up);
        self.active_sensors.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks a sensor down. Idempotent: only the Up -> Down transition
    /// decrements the live count.
    pub fn mark_sensor_down(&self, name: &str) {
        if let Some(mut status) = self.sensor_status.get_mut(name) {
            if *status == SensorStatus::Up {
                *status = SensorStatus::Down;
                self.active_sensors.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    /// Whether every registered sensor has gone down.
    pub fn all_sensors_down(&self) -> bool {
        self.active_sensors.load(Ordering::SeqCst) == 0
    }

    pub fn record_camera_frame(&self, camera_id: u32, frame: DetectionFrame) {
        self.cameras_last_frame.insert(camera_id, frame);
    }

    pub fn record_lidar_frame(&self, lidar_id: u32, tracked: TrackedObject) {
        self.lidars_last_frame.insert(lidar_id, tracked);
    }

    pub fn camera_last_frames(&self) -> Vec<(u32, DetectionFrame)> {
        self.cameras_last_frame
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn lidar_last_frames(&self) -> Vec<(u32, TrackedObject)> {
        self.lidars_last_frame
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_count_tracks_up_to_down_transitions_once() {
        let stats = RunStats::default();
        stats.register_sensor("camera_1");
        stats.register_sensor("lidar_1");
        assert!(!stats.all_sensors_down());

        stats.mark_sensor_down("camera_1");
        stats.mark_sensor_down("camera_1");
        assert!(!stats.all_sensors_down());

        stats.mark_sensor_down("lidar_1");
        assert!(stats.all_sensors_down());
    }
}
