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

use std::any::TypeId;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;
use std::mem;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, instrument, trace, warn};

use crate::actor::{ManagedActor, Started};
use crate::common::{
    ActorHandle, ActorId, ActorRuntime, FutureBox, ReactorItem,
};
use crate::message::{BusError, Envelope, MessageContext};
use crate::traits::{Broadcast, BusMessage, Event};

/// Type-state marker for an actor that is being configured and has not yet
/// started its receive loop.
///
/// An idle actor already owns a registered mailbox, so subscriptions declared
/// here are valid immediately; messages simply queue until the loop starts.
pub struct Idle;

impl<Model: Default + Send + Debug + 'static> ManagedActor<Idle, Model> {
    /// Adds an asynchronous handler for messages of concrete type `M`.
    ///
    /// At most one handler per message type; registering again replaces the
    /// previous one.
    #[instrument(skip(self, message_processor), level = "debug")]
    pub fn act_on<M>(
        &mut self,
        message_processor: impl for<'a> Fn(
                &'a mut ManagedActor<Started, Model>,
                &'a mut MessageContext<M>,
            ) -> FutureBox
            + Send
            + Sync
            + 'static,
    ) -> &mut Self
    where
        M: BusMessage + Clone + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<M>();
        trace!(type_name = std::any::type_name::<M>(), "adding message handler");
        let handler_box = Box::new(
            move |actor: &mut ManagedActor<Started, Model>,
                  envelope: &mut Envelope|
                  -> FutureBox {
                if let Some(message) = downcast_message::<M>(&*envelope.message) {
                    let mut context = MessageContext::new(
                        message.clone(),
                        envelope.timestamp,
                        envelope.reply_token,
                    );
                    message_processor(actor, &mut context)
                } else {
                    error!(
                        type_name = std::any::type_name::<M>(),
                        "message failed to downcast; dispatch table and envelope disagree"
                    );
                    Box::pin(async {})
                }
            },
        );

        self.reactors
            .insert(type_id, ReactorItem::Infallible(handler_box));
        self
    }

    /// Adds an asynchronous handler for `M` whose future may fail.
    ///
    /// A returned error is logged and the actor keeps processing messages; an
    /// error never kills the loop.
    #[instrument(skip(self, message_processor), level = "debug")]
    pub fn act_on_fallible<M>(
        &mut self,
        message_processor: impl for<'a> Fn(
                &'a mut ManagedActor<Started, Model>,
                &'a mut MessageContext<M>,
            ) -> crate::common::FallibleFutureBox
            + Send
            + Sync
            + 'static,
    ) -> &mut Self
    where
        M: BusMessage + Clone + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<M>();
        trace!(type_name = std::any::type_name::<M>(), "adding fallible message handler");
        let handler_box = Box::new(
            move |actor: &mut ManagedActor<Started, Model>,
                  envelope: &mut Envelope|
                  -> crate::common::FallibleFutureBox {
                if let Some(message) = downcast_message::<M>(&*envelope.message) {
                    let mut context = MessageContext::new(
                        message.clone(),
                        envelope.timestamp,
                        envelope.reply_token,
                    );
                    message_processor(actor, &mut context)
                } else {
                    error!(
                        type_name = std::any::type_name::<M>(),
                        "message failed to downcast; dispatch table and envelope disagree"
                    );
                    Box::pin(async { Ok(()) })
                }
            },
        );

        self.reactors
            .insert(type_id, ReactorItem::Fallible(handler_box));
        self
    }

    /// Sets the hook called before the loop task is spawned.
    pub fn before_start<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedActor<Started, Model>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + Sync + 'static,
    {
        self.before_start = Box::new(move |actor| Box::pin(f(actor)) as FutureBox);
        self
    }

    /// Sets the hook called inside the loop task, before the first receive.
    pub fn after_start<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedActor<Started, Model>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + Sync + 'static,
    {
        self.after_start = Box::new(move |actor| Box::pin(f(actor)) as FutureBox);
        self
    }

    /// Sets the hook called just before the actor stops receiving messages.
    pub fn before_stop<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedActor<Started, Model>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + Sync + 'static,
    {
        self.before_stop = Box::new(move |actor| Box::pin(f(actor)) as FutureBox);
        self
    }

    /// Sets the hook called after the loop has finished and the actor has
    /// unregistered.
    pub fn after_stop<F, Fut>(&mut self, f: F) -> &mut Self
    where
        F: for<'b> Fn(&'b ManagedActor<Started, Model>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + Sync + 'static,
    {
        self.after_stop = Box::new(move |actor| Box::pin(f(actor)) as FutureBox);
        self
    }

    /// Subscribes this actor to event type `E` while still idle. Messages
    /// queue in the mailbox until the loop starts.
    pub fn subscribe_event<E: Event>(&self) -> Result<(), BusError> {
        self.handle.subscribe_event::<E>()
    }

    /// Subscribes this actor to broadcast type `B` while still idle.
    pub fn subscribe_broadcast<B: Broadcast>(&self) -> Result<(), BusError> {
        self.handle.subscribe_broadcast::<B>()
    }

    pub(crate) fn new(runtime: &ActorRuntime, name: &str) -> Self {
        let id = ActorId::new(name);
        let bus = runtime.bus();
        bus.register(&id);

        let tracker = TaskTracker::new();
        // Closed up front so waiting on a never-started actor returns
        // immediately; the tracker still accepts the loop task later.
        tracker.close();

        let handle = ActorHandle {
            id: id.clone(),
            bus,
            tracker,
            cancellation_token: CancellationToken::new(),
        };

        trace!(actor = %id, "new idle actor");
        ManagedActor::<Idle, Model> {
            handle,
            id,
            model: Model::default(),
            runtime: runtime.clone(),
            halt_signal: Default::default(),
            before_start: Box::new(default_handler),
            after_start: Box::new(default_handler),
            before_stop: Box::new(default_handler),
            after_stop: Box::new(default_handler),
            reactors: Default::default(),
            _actor_state: PhantomData,
        }
    }

    /// Converts this actor into its started state and spawns its receive
    /// loop.
    ///
    /// The loop runs until it observes a terminate signal, its handler raises
    /// the halt flag, or its mailbox disappears. The runtime's bounded
    /// shutdown can additionally cancel the loop outright; a cancelled actor
    /// is still unregistered from the bus.
    #[instrument(skip(self), fields(actor = %self.id))]
    pub async fn start(mut self) -> ActorHandle {
        let reactors = mem::take(&mut self.reactors);
        let handle = self.handle.clone();

        let active: ManagedActor<Started, Model> = self.into();
        (active.before_start)(&active).await;

        let cancel_token = handle.cancellation_token.clone();
        let bus = handle.bus.clone();
        let id = handle.id.clone();
        handle.tracker.spawn(async move {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    warn!(actor = %id, "actor loop cancelled before draining its mailbox");
                    bus.unregister(&id);
                }
                _ = active.wake(reactors) => {}
            }
        });

        handle
    }
}

impl<Model: Default + Send + Debug + 'static> From<ManagedActor<Idle, Model>>
    for ManagedActor<Started, Model>
{
    fn from(value: ManagedActor<Idle, Model>) -> Self {
        ManagedActor::<Started, Model> {
            handle: value.handle,
            id: value.id,
            model: value.model,
            runtime: value.runtime,
            halt_signal: value.halt_signal,
            before_start: value.before_start,
            after_start: value.after_start,
            before_stop: value.before_stop,
            after_stop: value.after_stop,
            reactors: value.reactors,
            _actor_state: PhantomData,
        }
    }
}

fn default_handler<Model: Debug + Send + Default + 'static>(
    _actor: &'_ ManagedActor<Started, Model>,
) -> FutureBox {
    Box::pin(async {})
}

/// Recovers the concrete message type from the type-erased envelope payload.
pub fn downcast_message<T: 'static>(msg: &dyn BusMessage) -> Option<&T> {
    msg.as_any().downcast_ref::<T>()
}
