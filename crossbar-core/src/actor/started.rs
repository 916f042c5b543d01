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

use std::fmt::Debug;
use std::sync::atomic::Ordering;

use tracing::{error, instrument, trace};

use crate::actor::ManagedActor;
use crate::common::{ActorHandle, BusRef, ReactorItem, ReactorMap};
use crate::future::Future;
use crate::message::{BusError, ReplyToken, SystemSignal};
use crate::traits::{Broadcast, Event};

/// Type-state marker for an actor whose receive loop is running.
///
/// Handlers registered during the [`Idle`](super::Idle) state receive
/// `&mut ManagedActor<Started, Model>` and may mutate the model, send events
/// and broadcasts, complete replies, and request termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Started;

impl<Model: Default + Send + Debug + 'static> ManagedActor<Started, Model> {
    /// The external handle of this actor.
    pub fn handle(&self) -> &ActorHandle {
        &self.handle
    }

    /// The bus this actor talks through.
    pub fn bus(&self) -> BusRef {
        self.handle.bus()
    }

    /// The runtime this actor was created through, usable from handlers that
    /// need to spawn further actors.
    pub fn runtime(&self) -> crate::common::ActorRuntime {
        self.runtime.clone()
    }

    /// Sends an event on behalf of this actor.
    pub fn send_event<E: Event>(&self, event: E) -> Result<Future<E::Reply>, BusError> {
        self.handle.send_event(event)
    }

    /// Sends a broadcast on behalf of this actor.
    pub fn send_broadcast<B: Broadcast>(&self, broadcast: B) {
        self.handle.send_broadcast(broadcast)
    }

    /// Resolves the reply for an event this actor is handling.
    pub fn complete<R>(&self, token: ReplyToken, reply: R)
    where
        R: Clone + Send + Sync + Debug + 'static,
    {
        self.handle.complete(token, reply)
    }

    /// Subscribes this actor to event type `E` mid-flight.
    pub fn subscribe_event<E: Event>(&self) -> Result<(), BusError> {
        self.handle.subscribe_event::<E>()
    }

    /// Subscribes this actor to broadcast type `B` mid-flight.
    pub fn subscribe_broadcast<B: Broadcast>(&self) -> Result<(), BusError> {
        self.handle.subscribe_broadcast::<B>()
    }

    /// Requests termination of this actor's own loop.
    ///
    /// Cooperative: the flag is observed after the current handler returns,
    /// so the actor finishes the message in hand, unregisters, and stops.
    pub fn terminate(&self) {
        self.halt_signal.store(true, Ordering::SeqCst);
    }

    #[instrument(skip(self, reactors), fields(actor = %self.id))]
    pub(crate) async fn wake(mut self, reactors: ReactorMap<Model>) {
        (self.after_start)(&self).await;
        let bus = self.handle.bus();
        let id = self.id.clone();

        loop {
            // The mailbox disappearing out from under us (forced unregister)
            // ends the loop the same way a terminate signal does.
            let Ok(mut envelope) = bus.await_message(&id).await else {
                trace!("mailbox closed; leaving receive loop");
                break;
            };

            if let Some(SystemSignal::Terminate) =
                envelope.message.as_any().downcast_ref::<SystemSignal>()
            {
                trace!("terminate signal received");
                (self.before_stop)(&self).await;
                break;
            }

            let type_id = envelope.message.as_any().type_id();
            if let Some(reactor) = reactors.get(&type_id) {
                match reactor.value() {
                    ReactorItem::Infallible(handler) => {
                        handler(&mut self, &mut envelope).await;
                    }
                    ReactorItem::Fallible(handler) => {
                        if let Err(err) = handler(&mut self, &mut envelope).await {
                            // A failing handler must not take the loop down.
                            error!(error = %err, "message handler failed; actor continues");
                        }
                    }
                }
            } else {
                trace!(?type_id, "no handler for message type");
            }

            if self.halt_signal.load(Ordering::SeqCst) {
                trace!("halt requested from handler");
                (self.before_stop)(&self).await;
                break;
            }
        }

        bus.unregister(&id);
        (self.after_stop)(&self).await;
        trace!("actor loop finished");
    }
}
