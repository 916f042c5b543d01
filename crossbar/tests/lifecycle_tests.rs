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

//! Actor lifecycle: hook ordering, cooperative termination, stop signals
//! unblocking parked loops, and bounded shutdown of wedged actors.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbar::prelude::*;

use crate::setup::*;

mod setup;

#[tokio::test]
async fn lifecycle_hooks_run_in_order() -> anyhow::Result<()> {
    initialize_tracing();
    let mut app = CrossbarApp::launch();

    let trail: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let mut quiet = app.new_actor::<Counter>("quiet");

    let mark = |label: &'static str, trail: &Arc<Mutex<Vec<&'static str>>>| {
        let trail = trail.clone();
        move |_actor: &ManagedActor<Started, Counter>| {
            trail.lock().unwrap().push(label);
            ActorReply::immediate()
        }
    };
    quiet
        .before_start(mark("before_start", &trail))
        .after_start(mark("after_start", &trail))
        .before_stop(mark("before_stop", &trail))
        .after_stop(mark("after_stop", &trail));

    let handle = quiet.start().await;
    handle.stop().await?;

    assert_eq!(
        *trail.lock().unwrap(),
        vec!["before_start", "after_start", "before_stop", "after_stop"]
    );
    Ok(())
}

#[tokio::test]
async fn stop_unblocks_an_idle_parked_actor() -> anyhow::Result<()> {
    initialize_tracing();
    let mut app = CrossbarApp::launch();

    let sleeper = app.new_actor::<Counter>("sleeper");
    let handle = sleeper.start().await;
    let bus = app.bus();
    assert!(bus.is_registered(&handle.id()));

    // The actor has no messages; its loop is parked in the blocking receive.
    // The terminate signal travels the mailbox and wakes it deterministically.
    let started = Instant::now();
    tokio::time::timeout(Duration::from_secs(5), handle.stop())
        .await
        .expect("stop must not hang on a parked actor")?;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!bus.is_registered(&handle.id()));

    Ok(())
}

#[tokio::test]
async fn terminate_from_a_handler_stops_the_loop() -> anyhow::Result<()> {
    initialize_tracing();
    let mut app = CrossbarApp::launch();

    let mut listener = app.new_actor::<Counter>("self_stopper");
    let seen = listener.model.count.clone();
    listener.act_on::<Announcement>(|actor, context| {
        actor.model.count.fetch_add(1, Ordering::SeqCst);
        if context.message().text == "stop" {
            actor.terminate();
        }
        ActorReply::immediate()
    });
    listener.subscribe_broadcast::<Announcement>()?;
    let handle = listener.start().await;

    let bus = app.bus();
    bus.send_broadcast(Announcement { text: "stop".into() });

    handle.stop().await?;
    assert!(!bus.is_registered(&handle.id()));
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    // Broadcasts after the actor is gone vanish quietly.
    bus.send_broadcast(Announcement {
        text: "anyone there?".into(),
    });
    assert_eq!(bus.broadcast_subscriber_count::<Announcement>(), 0);

    Ok(())
}

#[tokio::test]
async fn shutdown_all_stops_every_actor() -> anyhow::Result<()> {
    initialize_tracing();
    let mut app = CrossbarApp::launch();

    let mut handles = Vec::new();
    for name in ["one", "two", "three"] {
        let actor = app.new_actor::<Counter>(name);
        handles.push(actor.start().await);
    }
    assert_eq!(app.actor_count(), 3);

    app.shutdown_all().await?;

    assert_eq!(app.actor_count(), 0);
    let bus = app.bus();
    for handle in handles {
        assert!(!bus.is_registered(&handle.id()));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bounded_shutdown_cancels_a_wedged_actor() -> anyhow::Result<()> {
    initialize_tracing();
    let mut app = CrossbarApp::launch();

    let mut wedged = app.new_actor::<Counter>("wedged");
    wedged.act_on::<Announcement>(|_actor, _context| {
        // A handler that never comes back: the cooperative paths cannot help.
        ActorReply::from_async(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        })
    });
    wedged.subscribe_broadcast::<Announcement>()?;
    let handle = wedged.start().await;

    let bus = app.bus();
    bus.send_broadcast(Announcement {
        text: "wedge it".into(),
    });
    // Let the actor dequeue the announcement and enter the sleep.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    app.shutdown_all_within(Duration::from_millis(200)).await?;
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "shutdown must not wait out a wedged handler"
    );
    // The cancelled actor was still scrubbed from the bus.
    assert!(!bus.is_registered(&handle.id()));

    Ok(())
}
