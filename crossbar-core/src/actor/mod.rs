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

use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::marker::PhantomData;

pub use idle::Idle;
pub use started::Started;

use crate::common::{
    ActorHandle, ActorId, ActorRuntime, AsyncLifecycleHandler, HaltSignal, ReactorMap,
};

mod idle;
mod started;

/// A named unit of concurrent execution owning a mailbox on the bus, a set of
/// typed message handlers, and user state (`Model`).
///
/// The type-state parameter tracks the lifecycle: an [`Idle`] actor is being
/// configured (handlers, subscriptions, hooks); calling `start` converts it
/// into a [`Started`] actor whose receive loop runs as its own task until
/// terminated.
pub struct ManagedActor<ActorState, Model: Default + Send + Debug + 'static> {
    /// The external reference other tasks use to reach this actor.
    pub handle: ActorHandle,

    /// The unique identity of this actor.
    pub id: ActorId,

    /// The user state carried through every handler invocation.
    pub model: Model,

    pub(crate) runtime: ActorRuntime,

    pub(crate) halt_signal: HaltSignal,

    /// Hook called before the actor's loop task is spawned.
    pub(crate) before_start: AsyncLifecycleHandler<Model>,
    /// Hook called inside the loop task, before the first receive.
    pub(crate) after_start: AsyncLifecycleHandler<Model>,
    /// Hook called just before the actor stops receiving messages.
    pub(crate) before_stop: AsyncLifecycleHandler<Model>,
    /// Hook called after the actor's loop has finished and it has
    /// unregistered.
    pub(crate) after_stop: AsyncLifecycleHandler<Model>,
    /// Map of handlers for the message types this actor reacts to.
    pub(crate) reactors: ReactorMap<Model>,

    _actor_state: PhantomData<ActorState>,
}

impl<ActorState, Model: Default + Send + Debug + 'static> Debug
    for ManagedActor<ActorState, Model>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedActor").field("id", &self.id).finish()
    }
}
