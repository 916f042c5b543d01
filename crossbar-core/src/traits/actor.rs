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
use async_trait::async_trait;

use crate::common::ActorId;

/// The external interface of a running actor, implemented by
/// [`ActorHandle`](crate::common::ActorHandle).
#[async_trait]
pub trait Actor {
    /// The unique identity of the actor.
    fn id(&self) -> ActorId;

    /// The human-readable name the actor was created with.
    fn name(&self) -> String;

    /// Requests a graceful stop by delivering a terminate signal through the
    /// actor's mailbox, then waits for its loop to finish.
    ///
    /// The signal travels the mailbox like any other message, so a loop parked
    /// in its blocking receive wakes deterministically. This waits without a
    /// deadline; bounded shutdown belongs to
    /// [`ActorRuntime::shutdown_all`](crate::common::ActorRuntime::shutdown_all).
    async fn stop(&self) -> anyhow::Result<()>;
}
