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

#![forbid(unsafe_code)]

//! Crossbar Core Library
//!
//! The core of the Crossbar framework: a shared [`MessageBus`](common::MessageBus)
//! routing request/reply events (round-robin, exactly one handler per send)
//! and fan-out broadcasts between registered actors, a write-once
//! [`Future`](future::Future) for promised replies, and the managed actor
//! runtime driving per-actor receive loops.

/// Common utilities and structures used throughout the Crossbar framework.
pub(crate) mod common;

pub(crate) mod actor;
pub(crate) mod future;
pub(crate) mod message;
/// Trait definitions used in the Crossbar framework.
pub(crate) mod traits;

/// Prelude module for convenient imports.
///
/// Re-exports the types a Crossbar consumer touches: the app entry point and
/// runtime, the bus and its errors, actor states and handles, futures, and
/// the message traits.
pub mod prelude {
    pub use async_trait;

    pub use crate::actor::{Idle, ManagedActor, Started};
    pub use crate::common::{
        ActorHandle, ActorId, ActorReply, ActorRuntime, BusRef, CrossbarApp, FallibleFutureBox,
        FutureBox, MessageBus, RuntimeConfig, SHUTDOWN_TIMEOUT_ENV,
    };
    pub use crate::future::{Future, FutureError, Promise};
    pub use crate::message::{BusError, Envelope, MessageContext, ReplyToken, SystemSignal};
    pub use crate::traits::{Actor, Broadcast, BusMessage, Event};
}
