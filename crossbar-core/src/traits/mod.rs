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

//! Core traits establishing the fundamental contracts of the Crossbar framework.
//!
//! *   [`BusMessage`]: marker required for all types carried by the bus;
//!     ensures messages are `Send`, `Sync`, `Debug`, clonable, and support
//!     downcasting via `Any`.
//! *   [`Event`]: a message expecting exactly one reply, delivered to one
//!     subscriber per send.
//! *   [`Broadcast`]: a fire-and-forget message delivered to all subscribers.
//! *   [`Actor`]: the asynchronous interface of a running actor's handle.

pub use actor::Actor;
pub use broadcast::Broadcast;
pub use bus_message::BusMessage;
pub use event::Event;

mod actor;
mod broadcast;
mod bus_message;
mod event;
