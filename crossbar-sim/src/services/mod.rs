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

//! The simulation's services, each one a crossbar actor: the global clock,
//! the cameras, the LiDAR trackers, the pose publisher, and map fusion.
//!
//! Camera frames travel as round-robin events to whichever tracker is next;
//! everything clock- and lifecycle-related fans out as broadcasts.

pub use camera::start_camera;
pub use clock::start_clock;
pub use fusion::start_fusion;
pub use lidar::start_lidar;
pub use pose::start_pose;

mod camera;
mod clock;
mod fusion;
mod lidar;
mod pose;
