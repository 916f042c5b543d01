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

//! Common internal type aliases and supporting structures used within
//! `crossbar-core`.
//!
//! Centralizes type definitions for handler futures, reactor maps, and shared
//! handles to improve readability; also defines the public aliases consumers
//! see in handler signatures.

use std::any::TypeId;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use dashmap::DashMap;

use crate::actor::{ManagedActor, Started};
use crate::common::MessageBus;
use crate::message::Envelope;

/// A shared reference to the message bus handed to every actor.
pub type BusRef = Arc<MessageBus>;

/// The pinned, boxed future a message handler returns.
///
/// Build one with [`ActorReply::immediate`](crate::common::ActorReply::immediate)
/// or [`ActorReply::from_async`](crate::common::ActorReply::from_async).
pub type FutureBox = Pin<Box<dyn Future<Output = ()> + Send + Sync + 'static>>;

/// The pinned, boxed future a fallible message handler returns. An `Err` is
/// logged by the actor loop, which then keeps running.
pub type FallibleFutureBox =
    Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + Sync + 'static>>;

/// Crate-internal: map storing message handlers (`TypeId` -> `ReactorItem`).
pub(crate) type ReactorMap<Model> = DashMap<TypeId, ReactorItem<Model>>;

/// Crate-internal: the kinds of registered message handlers.
pub(crate) enum ReactorItem<Model: Default + Send + Debug + 'static> {
    /// A handler whose future always completes successfully.
    Infallible(Box<InfallibleHandler<Model>>),
    /// A handler whose future may fail; errors are logged and the actor loop
    /// continues.
    Fallible(Box<FallibleHandler<Model>>),
}

/// Crate-internal: function signature of an infallible message handler.
pub(crate) type InfallibleHandler<Model> = dyn for<'a, 'b> Fn(&'a mut ManagedActor<Started, Model>, &'b mut Envelope) -> FutureBox
    + Send
    + Sync
    + 'static;

/// Crate-internal: function signature of a fallible message handler.
pub(crate) type FallibleHandler<Model> = dyn for<'a, 'b> Fn(
        &'a mut ManagedActor<Started, Model>,
        &'b mut Envelope,
    ) -> FallibleFutureBox
    + Send
    + Sync
    + 'static;

/// Crate-internal: the atomic flag a handler raises to stop its own loop.
pub(crate) type HaltSignal = AtomicBool;

/// Crate-internal: function signature of an asynchronous lifecycle hook.
pub(crate) type AsyncLifecycleHandler<Model> =
    Box<dyn Fn(&ManagedActor<Started, Model>) -> FutureBox + Send + Sync + 'static>;
