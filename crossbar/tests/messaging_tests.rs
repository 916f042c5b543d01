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

//! End-to-end messaging through running actors: round-robin events with
//! completed replies, broadcast fan-out, and handler fault isolation.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use tracing::info;

use crossbar::prelude::*;

use crate::setup::*;

mod setup;

#[tokio::test]
async fn events_round_robin_between_actors() -> anyhow::Result<()> {
    initialize_tracing();
    let mut app = CrossbarApp::launch();

    let log_a = Arc::new(Mutex::new(Vec::new()));
    let log_b = Arc::new(Mutex::new(Vec::new()));

    for log in [&log_a, &log_b] {
        let mut worker = app.new_actor::<Recorder>("worker");
        worker.model.log = log.clone();
        worker.act_on::<ShardJob>(|actor, context| {
            let sequence = context.message().sequence;
            actor.model.log.lock().unwrap().push(sequence);
            if let Some(token) = context.reply_token() {
                actor.complete(token, sequence * 2);
            }
            ActorReply::immediate()
        });
        worker.subscribe_event::<ShardJob>()?;
        worker.start().await;
    }

    let bus = app.bus();
    let mut replies = Vec::new();
    for sequence in 1..=4 {
        replies.push((sequence, bus.send_event(ShardJob { sequence })?));
    }
    for (sequence, reply) in replies {
        assert_eq!(reply.get().await?, sequence * 2);
    }

    app.shutdown_all().await?;

    assert_eq!(*log_a.lock().unwrap(), vec![1, 3]);
    assert_eq!(*log_b.lock().unwrap(), vec![2, 4]);
    Ok(())
}

#[tokio::test]
async fn event_reply_flows_back_to_the_sender() -> anyhow::Result<()> {
    initialize_tracing();
    let mut app = CrossbarApp::launch();

    let mut greeter = app.new_actor::<Counter>("greeter");
    greeter.act_on::<Greet>(|actor, context| {
        info!("greeting {}", context.message().who);
        actor.model.count.fetch_add(1, Ordering::SeqCst);
        let greeting = format!("hello, {}", context.message().who);
        if let Some(token) = context.reply_token() {
            actor.complete(token, greeting);
        }
        ActorReply::immediate()
    });
    greeter.subscribe_event::<Greet>()?;
    let handled = greeter.model.count.clone();
    greeter.start().await;

    let reply = app.bus().send_event(Greet { who: "rig".into() })?;
    assert_eq!(reply.get().await?, "hello, rig");
    assert_eq!(handled.load(Ordering::SeqCst), 1);

    app.shutdown_all().await?;
    Ok(())
}

#[tokio::test]
async fn broadcast_reaches_every_subscribed_actor() -> anyhow::Result<()> {
    initialize_tracing();
    let mut app = CrossbarApp::launch();

    let mut counts = Vec::new();
    for name in ["listener_a", "listener_b"] {
        let mut listener = app.new_actor::<Counter>(name);
        counts.push(listener.model.count.clone());
        listener
            .act_on::<Heartbeat>(|actor, _context| {
                actor.model.count.fetch_add(1, Ordering::SeqCst);
                ActorReply::immediate()
            })
            .after_stop(|actor| {
                let seen = actor.model.count.load(Ordering::SeqCst);
                assert_eq!(seen, 2, "each listener hears every heartbeat");
                ActorReply::immediate()
            });
        listener.subscribe_broadcast::<Heartbeat>()?;
        listener.start().await;
    }

    let bus = app.bus();
    assert_eq!(bus.broadcast_subscriber_count::<Heartbeat>(), 2);
    bus.send_broadcast(Heartbeat);
    bus.send_broadcast(Heartbeat);

    app.shutdown_all().await?;

    for count in counts {
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
    Ok(())
}

#[tokio::test]
async fn handler_error_does_not_kill_the_actor() -> anyhow::Result<()> {
    initialize_tracing();
    let mut app = CrossbarApp::launch();

    let mut listener = app.new_actor::<Counter>("flaky_listener");
    let seen = listener.model.count.clone();
    listener.act_on_fallible::<Announcement>(|actor, context| {
        actor.model.count.fetch_add(1, Ordering::SeqCst);
        let text = context.message().text.clone();
        Box::pin(async move {
            if text == "boom" {
                anyhow::bail!("refusing announcement: {text}");
            }
            Ok(())
        })
    });
    listener.subscribe_broadcast::<Announcement>()?;
    let handle = listener.start().await;

    let bus = app.bus();
    bus.send_broadcast(Announcement {
        text: "boom".into(),
    });
    bus.send_broadcast(Announcement {
        text: "carry on".into(),
    });

    handle.stop().await?;
    // Both announcements were processed: the failure was logged, not fatal.
    assert_eq!(seen.load(Ordering::SeqCst), 2);

    app.shutdown_all().await?;
    Ok(())
}

#[tokio::test]
async fn actor_can_send_events_from_a_handler() -> anyhow::Result<()> {
    initialize_tracing();
    let mut app = CrossbarApp::launch();

    // The responder answers jobs.
    let mut responder = app.new_actor::<Counter>("responder");
    responder.act_on::<ShardJob>(|actor, context| {
        if let Some(token) = context.reply_token() {
            actor.complete(token, context.message().sequence * 2);
        }
        ActorReply::immediate()
    });
    responder.subscribe_event::<ShardJob>()?;
    responder.start().await;

    // The relay turns a heartbeat into a job and records the doubled reply.
    let mut relay = app.new_actor::<Counter>("relay");
    let relayed = relay.model.count.clone();
    relay.act_on::<Heartbeat>(|actor, _context| {
        let outcome = actor.send_event(ShardJob { sequence: 21 });
        let count = actor.model.count.clone();
        ActorReply::from_async(async move {
            if let Ok(reply) = outcome {
                if let Ok(doubled) = reply.get().await {
                    count.fetch_add(doubled as usize, Ordering::SeqCst);
                }
            }
        })
    });
    relay.subscribe_broadcast::<Heartbeat>()?;
    relay.start().await;

    app.bus().send_broadcast(Heartbeat);

    // The relay's handler awaits the reply before the next message, so one
    // heartbeat yields exactly one doubled value.
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while relayed.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("relay should observe the doubled reply");
    assert_eq!(relayed.load(Ordering::SeqCst), 42);

    app.shutdown_all().await?;
    Ok(())
}
