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

use std::sync::Arc;
use std::time::SystemTime;

use derive_new::new;
use static_assertions::assert_impl_all;

use crate::traits::BusMessage;

/// Opaque key linking a delivered event to its pending reply promise.
///
/// Issued by the bus when an event is sent and carried in the delivered
/// [`Envelope`]; the handling actor passes it back through `complete` to
/// resolve the sender's future. Tokens are unique per send, so a stale or
/// replayed token is a harmless no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyToken(pub(crate) u64);

/// A message as it travels through a mailbox.
///
/// Broadcasts share one `Arc` across all recipients; events additionally carry
/// the [`ReplyToken`] that keys their pending reply.
#[derive(Debug, Clone, new)]
pub struct Envelope {
    /// The message contained in the envelope.
    pub message: Arc<dyn BusMessage + Send + Sync + 'static>,
    /// The reply token, present only for event deliveries.
    pub reply_token: Option<ReplyToken>,
    /// The time when the message was sent.
    #[new(value = "SystemTime::now()")]
    pub timestamp: SystemTime,
}

// Ensures that Envelope implements the Send trait.
assert_impl_all!(Envelope: Send);
