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

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::LidarConfig;
use crate::objects::camera::FAULT_ID;
use crate::objects::{DetectionFrame, SensorStatus};

/// A point in the plane, in whatever frame its context implies (rig-relative
/// when measured, global once fused).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CloudPoint {
    pub x: f64,
    pub y: f64,
}

/// The recorded LiDAR returns for one object at one time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudPointFrame {
    pub id: String,
    pub time: u32,
    pub points: Vec<CloudPoint>,
}

/// An object with resolved coordinates, on its way to map fusion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedObject {
    pub id: String,
    /// The tick the underlying detection was captured at.
    pub time: u32,
    pub description: String,
    pub coordinates: Vec<CloudPoint>,
}

/// The recorded cloud-point data every tracker resolves coordinates from.
///
/// One instance is built from the scenario and shared by reference; the
/// remaining-returns counter tells trackers when the recording is exhausted.
#[derive(Debug, Default)]
pub struct CloudPointsDb {
    by_object: HashMap<String, Vec<CloudPointFrame>>,
    left_to_track: AtomicUsize,
}

impl CloudPointsDb {
    pub fn from_frames(frames: Vec<CloudPointFrame>) -> Self {
        let mut by_object: HashMap<String, Vec<CloudPointFrame>> = HashMap::new();
        let mut total = 0;
        for frame in frames {
            total += 1;
            by_object.entry(frame.id.clone()).or_default().push(frame);
        }
        Self {
            by_object,
            left_to_track: AtomicUsize::new(total),
        }
    }

    /// The recorded coordinates for `id` at `time`.
    pub fn coordinates(&self, id: &str, time: u32) -> Option<Vec<CloudPoint>> {
        self.by_object
            .get(id)?
            .iter()
            .find(|frame| frame.time == time)
            .map(|frame| frame.points.clone())
    }

    /// Whether the recording itself is poisoned at `time`.
    pub fn fault_at(&self, time: u32) -> bool {
        self.by_object
            .get(FAULT_ID)
            .is_some_and(|frames| frames.iter().any(|frame| frame.time == time))
    }

    pub fn mark_tracked(&self) {
        self.left_to_track.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn is_exhausted(&self) -> bool {
        self.left_to_track.load(Ordering::SeqCst) == 0
    }
}

/// A LiDAR worker matching camera detections against the recorded returns.
///
/// Detections wait in a queue until `frequency` ticks after their capture
/// time, then get their coordinates resolved and move on to fusion.
#[derive(Debug, Default)]
pub struct LidarTracker {
    id: u32,
    frequency: u32,
    status: SensorStatus,
    pending: VecDeque<TrackedObject>,
    db: Arc<CloudPointsDb>,
}

impl LidarTracker {
    pub fn new(config: LidarConfig, db: Arc<CloudPointsDb>) -> Self {
        Self {
            id: config.id,
            frequency: config.frequency,
            status: SensorStatus::Up,
            pending: VecDeque::new(),
            db,
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

    /// Whether the shared recording has no returns left to resolve.
    pub fn is_data_exhausted(&self) -> bool {
        self.db.is_exhausted()
    }

    /// Queues a camera frame's detections for coordinate resolution.
    ///
    /// A poisoned detection puts the tracker into the error state; the
    /// returned message names the fault.
    pub fn ingest(&mut self, frame: &DetectionFrame) -> Result<(), String> {
        for detected in &frame.detections {
            if detected.id == FAULT_ID {
                self.status = SensorStatus::Error;
                return Err(format!("poisoned detection: {}", detected.description));
            }
            self.pending.push_back(TrackedObject {
                id: detected.id.clone(),
                time: frame.time,
                description: detected.description.clone(),
                coordinates: Vec::new(),
            });
        }
        Ok(())
    }

    /// Resolves every queued detection that is due at `tick` against the
    /// recorded returns.
    ///
    /// A fault in the recording at `tick` puts the tracker into the error
    /// state. Detections without recorded returns are dropped with a warning;
    /// the recording simply has nothing for them.
    pub fn advance(&mut self, tick: u32) -> Result<Vec<TrackedObject>, String> {
        if self.status != SensorStatus::Up {
            return Ok(Vec::new());
        }
        if self.db.fault_at(tick) {
            self.status = SensorStatus::Error;
            return Err(format!("recorded returns are poisoned at tick {tick}"));
        }

        let mut resolved = Vec::new();
        while let Some(next) = self.pending.front() {
            if next.time + self.frequency > tick {
                break;
            }
            let mut object = self.pending.pop_front().expect("front was just peeked");
            match self.db.coordinates(&object.id, object.time) {
                Some(coordinates) => {
                    object.coordinates = coordinates;
                    self.db.mark_tracked();
                    resolved.push(object);
                }
                None => {
                    warn!(id = %object.id, time = object.time, "no recorded returns for detection");
                }
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::DetectedObject;

    fn db() -> Arc<CloudPointsDb> {
        Arc::new(CloudPointsDb::from_frames(vec![
            CloudPointFrame {
                id: "Wall_1".into(),
                time: 2,
                points: vec![CloudPoint { x: 0.5, y: 3.9 }, CloudPoint { x: 0.2, y: 3.7 }],
            },
            CloudPointFrame {
                id: "Door_1".into(),
                time: 4,
                points: vec![CloudPoint { x: -1.0, y: 1.0 }],
            },
        ]))
    }

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

    #[test]
    fn detections_resolve_after_the_frequency_delay() {
        let mut tracker = LidarTracker::new(LidarConfig { id: 1, frequency: 2 }, db());

        tracker.ingest(&frame(2, &["Wall_1"])).unwrap();
        assert!(tracker.advance(3).unwrap().is_empty());

        let resolved = tracker.advance(4).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "Wall_1");
        assert_eq!(resolved[0].coordinates.len(), 2);
    }

    #[test]
    fn exhaustion_tracks_the_shared_recording() {
        let db = db();
        let mut tracker = LidarTracker::new(LidarConfig { id: 1, frequency: 0 }, db.clone());
        assert!(!tracker.is_data_exhausted());

        tracker.ingest(&frame(2, &["Wall_1"])).unwrap();
        tracker.ingest(&frame(4, &["Door_1"])).unwrap();
        tracker.advance(2).unwrap();
        tracker.advance(4).unwrap();
        assert!(tracker.is_data_exhausted());
    }

    #[test]
    fn poisoned_detection_faults_the_tracker() {
        let mut tracker = LidarTracker::new(LidarConfig { id: 1, frequency: 1 }, db());
        let error = tracker.ingest(&frame(2, &[FAULT_ID])).unwrap_err();
        assert!(error.contains("poisoned"));
        assert_eq!(tracker.status(), SensorStatus::Error);
    }

    #[test]
    fn poisoned_recording_faults_the_tracker() {
        let db = Arc::new(CloudPointsDb::from_frames(vec![CloudPointFrame {
            id: FAULT_ID.into(),
            time: 3,
            points: Vec::new(),
        }]));
        let mut tracker = LidarTracker::new(LidarConfig { id: 1, frequency: 1 }, db);
        tracker.ingest(&frame(2, &["Wall_1"])).unwrap();
        assert!(tracker.advance(3).is_err());
        assert_eq!(tracker.status(), SensorStatus::Error);
    }
}
