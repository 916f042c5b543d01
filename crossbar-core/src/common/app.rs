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

use crate::common::ActorRuntime;

/// Entry point for a Crossbar system.
///
/// `launch` builds the shared bus and hands back the [`ActorRuntime`] used to
/// create actors and, eventually, shut everything down. Each launch is a
/// fully independent system; tests routinely run several side by side.
#[derive(Default, Debug, Clone)]
pub struct CrossbarApp;

impl CrossbarApp {
    /// Launches a fresh system: a new bus with no actors.
    pub fn launch() -> ActorRuntime {
        ActorRuntime::default()
    }
}
