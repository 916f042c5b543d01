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

use thiserror::Error;

/// Errors reported by bus operations.
///
/// Delivery itself is best-effort and never errors: a message racing a
/// concurrent unregister is silently dropped. What does error is misuse of
/// the registry (acting on behalf of an actor with no mailbox) and sending an
/// event nobody can handle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The actor has no mailbox: it was never registered, or it has already
    /// unregistered.
    #[error("actor `{0}` has no mailbox (not registered)")]
    NotRegistered(String),

    /// No actor is currently subscribed to this event type. Returned
    /// immediately instead of a future that could never resolve.
    #[error("no subscriber registered for event type `{0}`")]
    NoSubscriber(&'static str),
}
