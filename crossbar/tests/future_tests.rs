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

//! Behavior of the promised-result primitive through the public surface.

use std::time::{Duration, Instant};

use crossbar::prelude::*;

use crate::setup::initialize_tracing;

mod setup;

#[tokio::test]
async fn every_waiter_sees_the_same_value() -> anyhow::Result<()> {
    initialize_tracing();
    let (promise, future) = Future::<String>::pending();

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let future = future.clone();
            tokio::spawn(async move { future.get().await })
        })
        .collect();

    tokio::task::yield_now().await;
    promise.resolve("X".to_string());

    for waiter in waiters {
        assert_eq!(waiter.await?, Ok("X".to_string()));
    }
    Ok(())
}

#[tokio::test]
async fn timed_get_distinguishes_not_yet_from_falsy_values() -> anyhow::Result<()> {
    initialize_tracing();
    let (promise, future) = Future::<u32>::pending();

    // Unresolved: a prompt, unambiguous "not yet".
    let started = Instant::now();
    assert_eq!(
        future.get_timeout(Duration::from_millis(50)).await,
        Err(FutureError::Unresolved)
    );
    assert!(started.elapsed() < Duration::from_secs(5));

    // Resolved to zero: a falsy payload is still Ok, never mistaken for a
    // timeout.
    promise.resolve(0);
    assert_eq!(future.get_timeout(Duration::from_millis(50)).await, Ok(0));
    assert_eq!(future.try_get(), Some(0));

    Ok(())
}

#[tokio::test]
async fn resolution_is_single_assignment() {
    initialize_tracing();
    let (promise, future) = Future::<&'static str>::pending();

    assert!(!future.is_resolved());
    assert!(promise.resolve("first"));
    assert!(!promise.resolve("second"));
    assert!(promise.is_resolved());
    assert_eq!(future.try_get(), Some("first"));
}
