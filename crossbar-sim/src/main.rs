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

//! The perception-rig simulation runner.
//!
//! Loads a scenario, builds one Crossbar system, wires up the services
//! (fusion, pose, LiDAR trackers, cameras, and the clock last so nothing
//! ticks before everyone subscribed), runs the clock to completion, and
//! shuts the system down within a bounded window.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crossbar::prelude::*;

use crate::config::Scenario;
use crate::objects::{Camera, CloudPointsDb, LidarTracker, PoseLog, RunStats};
use crate::services::{start_camera, start_clock, start_fusion, start_lidar, start_pose};

mod config;
mod messages;
mod objects;
mod output;
mod services;

#[derive(Debug, Parser)]
#[command(
    name = "crossbar-sim",
    about = "Perception-rig simulation on the Crossbar message bus"
)]
struct Args {
    /// Path to the scenario JSON file.
    scenario: PathBuf,

    /// Directory the run reports are written to. Defaults to the scenario
    /// file's directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Write the run log to a file in this directory instead of stderr.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,crossbar_core=warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, "crossbar-sim.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

#[crossbar_main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _log_guard = init_tracing(args.log_dir.as_deref());

    let scenario = Scenario::load(&args.scenario)?;
    let output_dir = match args.output_dir {
        Some(dir) => dir,
        None => args
            .scenario
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&output_dir)?;

    let stats = Arc::new(RunStats::default());
    let cloud_db = Arc::new(CloudPointsDb::from_frames(scenario.cloud_points.clone()));

    let mut app = CrossbarApp::launch();

    start_fusion(&mut app, stats.clone(), output_dir.clone()).await?;
    start_pose(&mut app, PoseLog::new(scenario.poses.clone())).await?;
    for lidar_config in scenario.lidars.clone() {
        let tracker = LidarTracker::new(lidar_config, cloud_db.clone());
        start_lidar(&mut app, tracker, stats.clone()).await?;
    }
    for camera_config in scenario.cameras.clone() {
        start_camera(&mut app, Camera::new(camera_config), stats.clone()).await?;
    }

    // The clock starts last: every subscription above is already in place,
    // so the first tick reaches the whole rig.
    let tick_interval = Duration::from_millis(scenario.tick_millis);
    let (_clock, driver) = start_clock(&mut app, tick_interval, scenario.duration).await?;

    driver.await?;

    // Orderly termination is already on every mailbox; this stops whatever
    // is left within the bounded window and force-cancels stragglers.
    app.shutdown_all().await?;

    info!(
        ticks = stats.runtime_ticks(),
        detected = stats.detected_objects(),
        tracked = stats.tracked_objects(),
        landmarks = stats.landmarks(),
        "run finished"
    );
    Ok(())
}
