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

//! Common structures used throughout the Crossbar framework: the bus, actor
//! identities and handles, the runtime, and shared type aliases.

pub use actor_handle::ActorHandle;
pub use actor_id::ActorId;
pub use actor_reply::ActorReply;
pub use app::CrossbarApp;
pub use bus::MessageBus;
pub use config::{RuntimeConfig, CONFIG, SHUTDOWN_TIMEOUT_ENV};
pub use runtime::ActorRuntime;
pub use types::{BusRef, FallibleFutureBox, FutureBox};

pub(crate) use types::{AsyncLifecycleHandler, HaltSignal, ReactorItem, ReactorMap};

mod actor_handle;
mod actor_id;
mod actor_reply;
mod app;
mod bus;
pub(crate) mod config;
mod runtime;
mod types;
