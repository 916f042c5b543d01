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

//! JSON run reports: the final landmark map with statistics, and the error
//! report written when a sensor crashes the run.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

use crate::objects::{DetectionFrame, FusionMap, Landmark, Pose, RunStats, TrackedObject};

/// File name of the report written after a clean run.
pub const FINAL_REPORT_FILE: &str = "output_file.json";
/// File name of the report written after a crashed run.
pub const ERROR_REPORT_FILE: &str = "output_error.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    system_runtime: u32,
    num_detected_objects: u32,
    num_tracked_objects: u32,
    num_landmarks: u32,
}

impl Statistics {
    fn gather(stats: &RunStats) -> Self {
        Self {
            system_runtime: stats.runtime_ticks(),
            num_detected_objects: stats.detected_objects(),
            num_tracked_objects: stats.tracked_objects(),
            num_landmarks: stats.landmarks(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FinalReport<'a> {
    #[serde(flatten)]
    statistics: Statistics,
    #[serde(rename = "landMarks")]
    landmarks: BTreeMap<&'a str, &'a Landmark>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LastFrames {
    cameras: BTreeMap<String, DetectionFrame>,
    lidars: BTreeMap<String, TrackedObject>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorReport<'a> {
    error: &'a str,
    faulty_sensor: &'a str,
    last_frames: LastFrames,
    poses: Vec<Pose>,
    #[serde(flatten)]
    statistics: Statistics,
    #[serde(rename = "landMarks")]
    landmarks: BTreeMap<&'a str, &'a Landmark>,
}

fn landmark_index(map: &FusionMap) -> BTreeMap<&str, &Landmark> {
    map.landmarks()
        .iter()
        .map(|landmark| (landmark.id.as_str(), landmark))
        .collect()
}

fn write_json(path: &Path, report: &impl Serialize) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating report file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("writing report {}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

/// Writes the end-of-run report: statistics plus the fused landmark map.
pub fn write_final_report(
    output_dir: &Path,
    stats: &RunStats,
    map: &FusionMap,
) -> anyhow::Result<()> {
    let report = FinalReport {
        statistics: Statistics::gather(stats),
        landmarks: landmark_index(map),
    };
    write_json(&output_dir.join(FINAL_REPORT_FILE), &report)
}

/// Writes the crash report: the fault, every sensor's last frame, the pose
/// track up to the crash, and the map as far as it got.
pub fn write_error_report(
    output_dir: &Path,
    stats: &RunStats,
    map: &FusionMap,
    faulty_sensor: &str,
    error: &str,
) -> anyhow::Result<()> {
    let report = ErrorReport {
        error,
        faulty_sensor,
        last_frames: LastFrames {
            cameras: stats
                .camera_last_frames()
                .into_iter()
                .map(|(id, frame)| (format!("camera{id}"), frame))
                .collect(),
            lidars: stats
                .lidar_last_frames()
                .into_iter()
                .map(|(id, tracked)| (format!("lidar{id}"), tracked))
                .collect(),
        },
        poses: map
            .poses()
            .iter()
            .copied()
            .filter(|pose| pose.time <= stats.runtime_ticks())
            .collect(),
        statistics: Statistics::gather(stats),
        landmarks: landmark_index(map),
    };
    write_json(&output_dir.join(ERROR_REPORT_FILE), &report)
}
