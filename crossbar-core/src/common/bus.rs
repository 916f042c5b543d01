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

use std::any::{self, Any, TypeId};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace};

use crate::common::ActorId;
use crate::future::{Future, Promise};
use crate::message::{BusError, Envelope, ReplyToken, SystemSignal};
use crate::traits::{Broadcast, BusMessage, Event};

/// One actor's inbound FIFO queue.
///
/// The sender side is shared by everyone routing to this actor; the receiver
/// sits behind an async mutex because only the owning actor drains it, one
/// message at a time. Dropping the `Mailbox` closes the channel, which is how
/// a blocked `await_message` learns its actor was unregistered.
#[derive(Debug)]
struct Mailbox {
    sender: mpsc::UnboundedSender<Envelope>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Envelope>>>,
}

impl Mailbox {
    fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }
}

/// A reply promise parked while its event is in flight.
///
/// The promise is type-erased here; `complete` recovers the concrete
/// `Promise<R>` by downcast. `target` remembers which actor was selected so
/// `unregister` can abandon everything routed to a dead actor.
#[derive(Debug)]
struct PendingReply {
    promise: Box<dyn Any + Send + Sync>,
    target: ActorId,
    reply_type: &'static str,
}

/// The shared broker connecting decoupled actors.
///
/// Owns every mailbox, the per-event-type round-robin rotations, the
/// per-broadcast-type fan-out sets, and the pending-reply table. All
/// operations are safe to call from any number of tasks concurrently; the
/// rotate-and-enqueue step of [`send_event`](MessageBus::send_event) is a
/// single critical section per event type, so concurrent sends never select
/// the same head twice or skip a subscriber.
///
/// The bus is plain owned state: construct one (or several, under test), wrap
/// it in an `Arc`, and hand it to every actor. There is no process-wide
/// instance.
#[derive(Debug, Default)]
pub struct MessageBus {
    /// Mailboxes keyed by actor identity.
    mailboxes: DashMap<ActorId, Mailbox>,
    /// Round-robin rotations keyed by event type. Insertion order is rotation
    /// order; the head of the deque is the next recipient.
    event_subscribers: DashMap<TypeId, VecDeque<ActorId>>,
    /// Fan-out membership keyed by broadcast type.
    broadcast_subscribers: DashMap<TypeId, HashSet<ActorId>>,
    /// Reply promises for events currently in flight.
    pending_replies: DashMap<ReplyToken, PendingReply>,
    next_token: AtomicU64,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mailbox for `id` if absent. Idempotent: registering an
    /// already-registered actor changes nothing and drops nothing.
    #[instrument(skip(self, id), fields(actor = %id))]
    pub fn register(&self, id: &ActorId) {
        self.mailboxes.entry(id.clone()).or_insert_with(Mailbox::new);
        trace!("mailbox ready");
    }

    /// Removes every trace of `id` from the bus.
    ///
    /// The mailbox is dropped along with any queued messages, `id` leaves
    /// every event rotation and broadcast set, and every pending reply whose
    /// event was routed to `id` is abandoned — waiters on those futures
    /// observe [`FutureError::Abandoned`](crate::future::FutureError) rather
    /// than hanging forever. Unknown ids are a no-op.
    ///
    /// A receive already parked on the mailbox may still drain what was
    /// queued before removal, then observes `NotRegistered`; nothing new can
    /// be enqueued either way.
    #[instrument(skip(self, id), fields(actor = %id))]
    pub fn unregister(&self, id: &ActorId) {
        self.mailboxes.remove(id);

        self.event_subscribers.retain(|_, rotation| {
            rotation.retain(|subscriber| subscriber != id);
            !rotation.is_empty()
        });
        self.broadcast_subscribers.retain(|_, members| {
            members.remove(id);
            !members.is_empty()
        });

        // Dropping the boxed promise resolves its waiters to Abandoned.
        self.pending_replies.retain(|token, pending| {
            let keep = pending.target != *id;
            if !keep {
                trace!(?token, "abandoning reply promised to removed actor");
            }
            keep
        });
    }

    /// Appends `id` to the round-robin rotation for event type `E`.
    ///
    /// Fails with [`BusError::NotRegistered`] when `id` has no mailbox.
    /// Subscribing the same actor twice gives it two rotation slots; the bus
    /// does not deduplicate.
    #[instrument(skip(self, id), fields(actor = %id, event = any::type_name::<E>()))]
    pub fn subscribe_event<E: Event>(&self, id: &ActorId) -> Result<(), BusError> {
        if !self.mailboxes.contains_key(id) {
            return Err(BusError::NotRegistered(id.to_string()));
        }
        self.event_subscribers
            .entry(TypeId::of::<E>())
            .or_default()
            .push_back(id.clone());
        trace!("joined event rotation");
        Ok(())
    }

    /// Adds `id` to the fan-out set for broadcast type `B`.
    ///
    /// Fails with [`BusError::NotRegistered`] when `id` has no mailbox — a
    /// subscription whose messages could never be received is a caller bug.
    #[instrument(skip(self, id), fields(actor = %id, broadcast = any::type_name::<B>()))]
    pub fn subscribe_broadcast<B: Broadcast>(&self, id: &ActorId) -> Result<(), BusError> {
        if !self.mailboxes.contains_key(id) {
            return Err(BusError::NotRegistered(id.to_string()));
        }
        self.broadcast_subscribers
            .entry(TypeId::of::<B>())
            .or_default()
            .insert(id.clone());
        trace!("joined broadcast fan-out");
        Ok(())
    }

    /// Sends an event to exactly one subscriber, chosen round-robin, and
    /// returns a [`Future`] for its reply.
    ///
    /// With no subscriber for `E`, returns [`BusError::NoSubscriber`]
    /// immediately — never a future that could hang forever. The selection
    /// rotates the subscriber list (head moves to tail) and enqueues inside
    /// the same critical section.
    ///
    /// Delivery is best-effort: if the selected mailbox vanished in a race
    /// with `unregister`, the event is dropped and the returned future
    /// resolves to `Abandoned`.
    #[instrument(skip(self, event), fields(event = any::type_name::<E>()))]
    pub fn send_event<E: Event>(&self, event: E) -> Result<Future<E::Reply>, BusError> {
        let type_name = any::type_name::<E>();
        let Some(mut rotation) = self.event_subscribers.get_mut(&TypeId::of::<E>()) else {
            debug!("event has no subscribers");
            return Err(BusError::NoSubscriber(type_name));
        };

        // Holding the rotation entry exclusively makes rotate-select-enqueue
        // atomic per event type.
        let Some(target) = rotation.pop_front() else {
            debug!("event rotation is empty");
            return Err(BusError::NoSubscriber(type_name));
        };
        rotation.push_back(target.clone());

        let token = ReplyToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        let (promise, future) = Future::pending();
        self.pending_replies.insert(
            token,
            PendingReply {
                promise: Box::new(promise),
                target: target.clone(),
                reply_type: any::type_name::<E::Reply>(),
            },
        );

        let envelope = Envelope::new(Arc::new(event), Some(token));
        let delivered = match self.mailboxes.get(&target) {
            Some(mailbox) => mailbox.sender.send(envelope).is_ok(),
            None => false,
        };
        if delivered {
            trace!(recipient = %target, ?token, "event enqueued");
        } else {
            // Raced with unregister: drop the event, abandon the promise.
            self.pending_replies.remove(&token);
            trace!(recipient = %target, "selected mailbox vanished; event dropped");
        }

        Ok(future)
    }

    /// Enqueues one copy of `broadcast` into every mailbox currently in the
    /// fan-out set for `B`, taken as a snapshot at call time.
    ///
    /// Actors subscribing concurrently may or may not receive this particular
    /// broadcast; mailboxes that vanished since the snapshot are skipped.
    #[instrument(skip(self, broadcast), fields(broadcast = any::type_name::<B>()))]
    pub fn send_broadcast<B: Broadcast>(&self, broadcast: B) {
        let recipients: Vec<ActorId> = match self.broadcast_subscribers.get(&TypeId::of::<B>()) {
            Some(members) => members.iter().cloned().collect(),
            None => return,
        };
        trace!(count = recipients.len(), "fanning out");

        let message: Arc<dyn BusMessage + Send + Sync + 'static> = Arc::new(broadcast);
        for id in recipients {
            if let Some(mailbox) = self.mailboxes.get(&id) {
                let _ = mailbox.sender.send(Envelope::new(message.clone(), None));
            }
        }
    }

    /// Resolves the reply promised for the event identified by `token`.
    ///
    /// A no-op (not an error) when the token is unknown or already completed,
    /// so completing twice, or completing after the sender's actor
    /// unregistered, is harmless.
    #[instrument(skip(self, reply))]
    pub fn complete<R>(&self, token: ReplyToken, reply: R)
    where
        R: Clone + Send + Sync + std::fmt::Debug + 'static,
    {
        let Some((_, pending)) = self.pending_replies.remove(&token) else {
            trace!("no pending reply for token; ignoring");
            return;
        };
        match pending.promise.downcast::<Promise<R>>() {
            Ok(promise) => {
                promise.resolve(reply);
                trace!("reply resolved");
            }
            Err(_) => {
                // Wrong reply type: the entry is gone either way, so the
                // waiters observe Abandoned rather than a lie.
                debug!(
                    expected = pending.reply_type,
                    offered = any::type_name::<R>(),
                    "reply type mismatch; promise abandoned"
                );
            }
        }
    }

    /// Blocks the calling task until `id`'s mailbox yields its next message,
    /// in FIFO order.
    ///
    /// Fails with [`BusError::NotRegistered`] when `id` has no mailbox, or
    /// when the mailbox is removed while this call is parked on it.
    pub async fn await_message(&self, id: &ActorId) -> Result<Envelope, BusError> {
        let receiver = {
            let Some(mailbox) = self.mailboxes.get(id) else {
                return Err(BusError::NotRegistered(id.to_string()));
            };
            Arc::clone(&mailbox.receiver)
        };

        let mut receiver = receiver.lock().await;
        match receiver.recv().await {
            Some(envelope) => Ok(envelope),
            // Channel closed: the mailbox was dropped out from under us.
            None => Err(BusError::NotRegistered(id.to_string())),
        }
    }

    /// Delivers a lifecycle signal through `id`'s mailbox. Missing mailboxes
    /// are ignored; the actor is already gone.
    pub(crate) fn send_signal(&self, id: &ActorId, signal: SystemSignal) {
        if let Some(mailbox) = self.mailboxes.get(id) {
            let _ = mailbox.sender.send(Envelope::new(Arc::new(signal), None));
        }
    }

    /// Whether `id` currently has a mailbox.
    pub fn is_registered(&self, id: &ActorId) -> bool {
        self.mailboxes.contains_key(id)
    }

    /// Number of rotation slots held for event type `E`.
    pub fn event_subscriber_count<E: Event>(&self) -> usize {
        self.event_subscribers
            .get(&TypeId::of::<E>())
            .map_or(0, |rotation| rotation.len())
    }

    /// Number of actors in the fan-out set for broadcast type `B`.
    pub fn broadcast_subscriber_count<B: Broadcast>(&self) -> usize {
        self.broadcast_subscribers
            .get(&TypeId::of::<B>())
            .map_or(0, |members| members.len())
    }

    /// Number of events currently in flight (sent but not completed).
    pub fn pending_reply_count(&self) -> usize {
        self.pending_replies.len()
    }
}
