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

use std::time::SystemTime;

use derive_new::new;
use static_assertions::assert_impl_all;

use crate::message::ReplyToken;

/// The typed view of a delivered message, handed to the handler registered
/// for its concrete type.
///
/// # Type Parameters
/// - `M`: The type of the message contained in the context.
#[derive(Clone, Debug, new)]
pub struct MessageContext<M> {
    /// The message contained in the context.
    pub(crate) message: M,
    /// The time when the message was sent.
    pub(crate) timestamp: SystemTime,
    /// The reply token, present when the message is an event awaiting
    /// completion.
    pub(crate) reply_token: Option<ReplyToken>,
}

impl<M> MessageContext<M> {
    pub fn message(&self) -> &M {
        &self.message
    }

    pub fn timestamp(&self) -> &SystemTime {
        &self.timestamp
    }

    /// The token to pass to `complete` when handling an event. `None` for
    /// broadcasts.
    pub fn reply_token(&self) -> Option<ReplyToken> {
        self.reply_token
    }
}

// Ensures that MessageContext<u32> implements the Send trait.
assert_impl_all!(MessageContext<u32>: Send);
