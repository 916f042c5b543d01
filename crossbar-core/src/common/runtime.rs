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
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use tracing::{error, instrument, trace};

use crate::actor::{Idle, ManagedActor};
use crate::common::config::CONFIG;
use crate::common::{ActorHandle, ActorId, BusRef};
use crate::traits::Actor;

/// The running system: one shared bus plus the registry of root actors
/// created through it.
///
/// Cloning a runtime shares the same bus and registry, so handlers and
/// helpers can carry it around freely.
#[derive(Debug, Clone, Default)]
pub struct ActorRuntime {
    pub(crate) bus: BusRef,
    pub(crate) roots: Arc<DashMap<ActorId, ActorHandle>>,
}

impl ActorRuntime {
    /// Creates a new actor with the given name, registered with the bus
    /// immediately so it can declare subscriptions while still idle.
    ///
    /// # Type Parameters
    ///
    /// * `Model` - The state type of the actor, which must implement
    ///   `Default`, `Send`, `Debug`, and have a static lifetime.
    ///
    /// # Returns
    ///
    /// A `ManagedActor` in the `Idle` state holding a default `Model`.
    pub fn new_actor<Model>(&mut self, name: &str) -> ManagedActor<Idle, Model>
    where
        Model: Default + Send + Debug + 'static,
    {
        let actor = ManagedActor::new(self, name);
        self.roots.insert(actor.id.clone(), actor.handle.clone());
        trace!(actor = %actor.id, "created root actor");
        actor
    }

    /// The shared bus reference.
    pub fn bus(&self) -> BusRef {
        self.bus.clone()
    }

    /// Number of root actors created through this runtime.
    pub fn actor_count(&self) -> usize {
        self.roots.len()
    }

    /// Stops every root actor with the configured per-actor timeout.
    ///
    /// See [`shutdown_all_within`](ActorRuntime::shutdown_all_within).
    pub async fn shutdown_all(&mut self) -> anyhow::Result<()> {
        let timeout = CONFIG.actor_shutdown_timeout();
        self.shutdown_all_within(timeout).await
    }

    /// Stops every root actor, giving each up to `timeout` to finish
    /// gracefully.
    ///
    /// Each actor first receives a terminate signal through its mailbox; one
    /// that fails to stop in time has its loop cancelled outright, so this
    /// call always returns promptly even with a wedged handler.
    #[instrument(skip(self))]
    pub async fn shutdown_all_within(&mut self, timeout: Duration) -> anyhow::Result<()> {
        let stop_futures = self.roots.iter().map(|item| {
            let handle = item.value().clone();
            async move {
                match tokio::time::timeout(timeout, handle.stop()).await {
                    Ok(Ok(())) => {
                        trace!(actor = %handle.id, "stopped cleanly");
                    }
                    Ok(Err(error)) => {
                        error!(actor = %handle.id, %error, "stop reported an error");
                    }
                    Err(_) => {
                        error!(
                            actor = %handle.id,
                            ?timeout,
                            "did not stop in time; cancelling its loop"
                        );
                        handle.cancellation_token.cancel();
                        handle.tracker.wait().await;
                    }
                }
            }
        });

        join_all(stop_futures).await;
        self.roots.clear();
        Ok(())
    }
}
