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
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{instrument, trace};

use crate::common::{ActorId, BusRef};
use crate::future::Future;
use crate::message::{BusError, ReplyToken, SystemSignal};
use crate::traits::{Actor, Broadcast, Event};

/// An external reference to a running (or not-yet-started) actor.
///
/// Handles are cheap to clone and safe to hold after the actor stops; bus
/// operations through a dead handle fail with
/// [`BusError::NotRegistered`](crate::message::BusError) or silently
/// no-op, matching best-effort delivery.
#[derive(Debug, Clone)]
pub struct ActorHandle {
    /// The unique identity of the actor.
    pub(crate) id: ActorId,
    /// The bus the actor is registered with.
    pub(crate) bus: BusRef,
    /// Tracks the actor's spawned loop task.
    pub(crate) tracker: TaskTracker,
    /// Force-stop lever for the actor's loop.
    pub(crate) cancellation_token: CancellationToken,
}

impl PartialEq for ActorHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ActorHandle {}

impl Hash for ActorHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl ActorHandle {
    /// The bus this actor talks through.
    pub fn bus(&self) -> BusRef {
        self.bus.clone()
    }

    /// Subscribes this actor to event type `E` (round-robin delivery).
    pub fn subscribe_event<E: Event>(&self) -> Result<(), BusError> {
        self.bus.subscribe_event::<E>(&self.id)
    }

    /// Subscribes this actor to broadcast type `B` (fan-out delivery).
    pub fn subscribe_broadcast<B: Broadcast>(&self) -> Result<(), BusError> {
        self.bus.subscribe_broadcast::<B>(&self.id)
    }

    /// Sends an event into the bus; see
    /// [`MessageBus::send_event`](crate::common::MessageBus::send_event).
    pub fn send_event<E: Event>(&self, event: E) -> Result<Future<E::Reply>, BusError> {
        self.bus.send_event(event)
    }

    /// Sends a broadcast into the bus; see
    /// [`MessageBus::send_broadcast`](crate::common::MessageBus::send_broadcast).
    pub fn send_broadcast<B: Broadcast>(&self, broadcast: B) {
        self.bus.send_broadcast(broadcast)
    }

    /// Resolves the reply for a handled event.
    pub fn complete<R>(&self, token: ReplyToken, reply: R)
    where
        R: Clone + Send + Sync + std::fmt::Debug + 'static,
    {
        self.bus.complete(token, reply)
    }
}

#[async_trait]
impl Actor for ActorHandle {
    fn id(&self) -> ActorId {
        self.id.clone()
    }

    fn name(&self) -> String {
        self.id.name().to_string()
    }

    #[instrument(skip(self), fields(actor = %self.id))]
    async fn stop(&self) -> anyhow::Result<()> {
        trace!("delivering terminate signal");
        self.bus.send_signal(&self.id, SystemSignal::Terminate);

        trace!("waiting for the actor loop to finish");
        self.tracker.wait().await;

        trace!("actor stopped");
        Ok(())
    }
}
