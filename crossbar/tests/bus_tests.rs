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

//! Contract tests for the bus itself, exercised directly without actor loops:
//! registration, subscription rules, round-robin dispatch, fan-out, reply
//! completion, and mailbox FIFO order.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crossbar::prelude::*;

use crate::setup::*;

mod setup;

fn sequence_of(envelope: &Envelope) -> u32 {
    envelope
        .message
        .as_any()
        .downcast_ref::<ShardJob>()
        .expect("expected a ShardJob")
        .sequence
}

#[tokio::test]
async fn register_is_idempotent() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::new();
    let worker = ActorId::new("worker");

    bus.register(&worker);
    bus.register(&worker);
    assert!(bus.is_registered(&worker));

    bus.subscribe_event::<ShardJob>(&worker)?;
    let future = bus.send_event(ShardJob { sequence: 7 })?;
    assert_eq!(sequence_of(&bus.await_message(&worker).await?), 7);
    assert!(!future.is_resolved());

    Ok(())
}

#[tokio::test]
async fn unregister_leaves_no_residue() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::new();
    let worker = ActorId::new("worker");

    bus.register(&worker);
    bus.subscribe_event::<ShardJob>(&worker)?;
    bus.subscribe_broadcast::<Heartbeat>(&worker)?;
    let _future = bus.send_event(ShardJob { sequence: 1 })?;
    assert_eq!(bus.pending_reply_count(), 1);

    bus.unregister(&worker);

    assert!(!bus.is_registered(&worker));
    assert_eq!(bus.event_subscriber_count::<ShardJob>(), 0);
    assert_eq!(bus.broadcast_subscriber_count::<Heartbeat>(), 0);
    assert_eq!(bus.pending_reply_count(), 0);

    Ok(())
}

#[tokio::test]
async fn subscriptions_require_registration() {
    initialize_tracing();
    let bus = MessageBus::new();
    let stranger = ActorId::new("stranger");

    assert!(matches!(
        bus.subscribe_event::<ShardJob>(&stranger),
        Err(BusError::NotRegistered(_))
    ));
    assert!(matches!(
        bus.subscribe_broadcast::<Heartbeat>(&stranger),
        Err(BusError::NotRegistered(_))
    ));
}

#[tokio::test]
async fn send_event_without_subscribers_reports_no_handler() {
    initialize_tracing();
    let bus = MessageBus::new();

    let result = bus.send_event(ShardJob { sequence: 1 });
    assert!(matches!(result, Err(BusError::NoSubscriber(_))));
}

#[tokio::test]
async fn events_rotate_round_robin() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::new();
    let first = ActorId::new("first");
    let second = ActorId::new("second");

    bus.register(&first);
    bus.register(&second);
    bus.subscribe_event::<ShardJob>(&first)?;
    bus.subscribe_event::<ShardJob>(&second)?;

    for sequence in 1..=3 {
        bus.send_event(ShardJob { sequence })?;
    }

    // Subscription order is rotation order: first gets 1 and 3, second gets 2.
    assert_eq!(sequence_of(&bus.await_message(&first).await?), 1);
    assert_eq!(sequence_of(&bus.await_message(&first).await?), 3);
    assert_eq!(sequence_of(&bus.await_message(&second).await?), 2);

    Ok(())
}

#[tokio::test]
async fn concurrent_sends_balance_across_subscribers() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = Arc::new(MessageBus::new());
    let first = ActorId::new("first");
    let second = ActorId::new("second");

    bus.register(&first);
    bus.register(&second);
    bus.subscribe_event::<ShardJob>(&first)?;
    bus.subscribe_event::<ShardJob>(&second)?;

    let sends = (1..=10u32).map(|sequence| {
        let bus = bus.clone();
        tokio::spawn(async move { bus.send_event(ShardJob { sequence }).map(|_| ()) })
    });
    for outcome in join_all(sends).await {
        outcome.unwrap()?;
    }

    // Rotate-and-enqueue is atomic per type, so ten sends split exactly 5/5
    // no matter how they interleave.
    let mut first_got = Vec::new();
    let mut second_got = Vec::new();
    for _ in 0..5 {
        first_got.push(sequence_of(&bus.await_message(&first).await?));
        second_got.push(sequence_of(&bus.await_message(&second).await?));
    }
    let mut all: Vec<u32> = first_got.iter().chain(&second_got).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (1..=10).collect::<Vec<u32>>());

    Ok(())
}

#[tokio::test]
async fn broadcast_delivers_one_copy_to_each_subscriber() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::new();
    let first = ActorId::new("first");
    let second = ActorId::new("second");

    bus.register(&first);
    bus.register(&second);
    bus.subscribe_broadcast::<Announcement>(&first)?;
    bus.subscribe_broadcast::<Announcement>(&second)?;

    bus.send_broadcast(Announcement {
        text: "all stations".into(),
    });
    // A sentinel broadcast proves exactly one copy of the first arrived.
    bus.send_broadcast(Announcement {
        text: "sentinel".into(),
    });

    for id in [&first, &second] {
        let copy = bus.await_message(id).await?;
        let text = &copy
            .message
            .as_any()
            .downcast_ref::<Announcement>()
            .unwrap()
            .text;
        assert_eq!(text, "all stations");
        let sentinel = bus.await_message(id).await?;
        let text = &sentinel
            .message
            .as_any()
            .downcast_ref::<Announcement>()
            .unwrap()
            .text;
        assert_eq!(text, "sentinel");
    }

    Ok(())
}

#[tokio::test]
async fn broadcast_after_unregister_is_silently_undelivered() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::new();
    let listener = ActorId::new("listener");

    bus.register(&listener);
    bus.subscribe_broadcast::<Heartbeat>(&listener)?;
    bus.unregister(&listener);

    // No subscriber left; this must be a quiet no-op, not an error.
    bus.send_broadcast(Heartbeat);
    assert_eq!(bus.broadcast_subscriber_count::<Heartbeat>(), 0);

    Ok(())
}

#[tokio::test]
async fn complete_resolves_exactly_once() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::new();
    let greeter = ActorId::new("greeter");

    bus.register(&greeter);
    bus.subscribe_event::<Greet>(&greeter)?;

    let future = bus.send_event(Greet { who: "rig".into() })?;
    let envelope = bus.await_message(&greeter).await?;
    let token = envelope.reply_token.expect("events carry a reply token");

    bus.complete(token, "hello, rig".to_string());
    assert!(future.is_resolved());
    assert_eq!(future.get().await?, "hello, rig");

    // A second completion for the same event changes nothing.
    bus.complete(token, "hello again".to_string());
    assert_eq!(future.get().await?, "hello, rig");
    assert_eq!(bus.pending_reply_count(), 0);

    Ok(())
}

#[tokio::test]
async fn complete_with_foreign_token_is_a_noop() -> anyhow::Result<()> {
    initialize_tracing();
    // Two independent buses; a token minted by one means nothing to the other.
    let bus = MessageBus::new();
    let other = MessageBus::new();
    let worker = ActorId::new("worker");

    bus.register(&worker);
    bus.subscribe_event::<ShardJob>(&worker)?;
    let _future = bus.send_event(ShardJob { sequence: 1 })?;
    let token = bus
        .await_message(&worker)
        .await?
        .reply_token
        .expect("events carry a reply token");

    other.complete(token, 2u32);
    assert_eq!(bus.pending_reply_count(), 1);
    assert_eq!(other.pending_reply_count(), 0);

    Ok(())
}

#[tokio::test]
async fn await_message_requires_registration() {
    initialize_tracing();
    let bus = MessageBus::new();
    let stranger = ActorId::new("stranger");

    let result = bus.await_message(&stranger).await;
    assert!(matches!(result, Err(BusError::NotRegistered(_))));
}

#[tokio::test]
async fn mailbox_preserves_fifo_order() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::new();
    let worker = ActorId::new("worker");

    bus.register(&worker);
    bus.subscribe_event::<ShardJob>(&worker)?;
    bus.subscribe_broadcast::<Heartbeat>(&worker)?;

    bus.send_event(ShardJob { sequence: 1 })?;
    bus.send_broadcast(Heartbeat);
    bus.send_event(ShardJob { sequence: 2 })?;

    assert_eq!(sequence_of(&bus.await_message(&worker).await?), 1);
    assert!(bus
        .await_message(&worker)
        .await?
        .message
        .as_any()
        .downcast_ref::<Heartbeat>()
        .is_some());
    assert_eq!(sequence_of(&bus.await_message(&worker).await?), 2);

    Ok(())
}

#[tokio::test]
async fn unregister_abandons_undelivered_events() -> anyhow::Result<()> {
    initialize_tracing();
    let bus = MessageBus::new();
    let worker = ActorId::new("worker");

    bus.register(&worker);
    bus.subscribe_event::<ShardJob>(&worker)?;
    let future = bus.send_event(ShardJob { sequence: 9 })?;

    // The job is still sitting in the mailbox when the worker goes away.
    bus.unregister(&worker);

    assert_eq!(future.get().await, Err(FutureError::Abandoned));
    assert_eq!(
        future.get_timeout(Duration::from_millis(10)).await,
        Err(FutureError::Abandoned)
    );

    Ok(())
}
