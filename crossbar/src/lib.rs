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

#![forbid(unsafe_code)]

//! # Crossbar
//!
//! An in-process message bus for decoupled actors, built on Tokio. Two kinds
//! of messages flow through the shared bus:
//!
//! - **Events** expect exactly one reply: each send is routed to exactly one
//!   subscriber, chosen round-robin among everyone subscribed to the event's
//!   concrete type, and the sender receives a write-once [`Future`] for the
//!   promised reply.
//! - **Broadcasts** are fire-and-forget notifications fanned out to every
//!   subscriber of the concrete type.
//!
//! Every actor owns a FIFO mailbox on the bus and runs its own receive loop,
//! dispatching each message to the handler registered for its type.
//!
//! ## Quick Start
//!
//! ```ignore
//! use crossbar::prelude::*;
//!
//! #[crossbar_message(reply(u32))]
//! struct CountWords { text: String }
//!
//! #[crossbar_actor]
//! struct WordCounter;
//!
//! #[crossbar_main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut app = CrossbarApp::launch();
//!
//!     let mut counter = app.new_actor::<WordCounter>("word_counter");
//!     counter.act_on::<CountWords>(|actor, context| {
//!         let words = context.message().text.split_whitespace().count() as u32;
//!         if let Some(token) = context.reply_token() {
//!             actor.complete(token, words);
//!         }
//!         ActorReply::immediate()
//!     });
//!     counter.subscribe_event::<CountWords>()?;
//!     counter.start().await;
//!
//!     let reply = app
//!         .bus()
//!         .send_event(CountWords { text: "promised results arrive".into() })?;
//!     assert_eq!(reply.get().await?, 3);
//!
//!     app.shutdown_all().await
//! }
//! ```
//!
//! [`Future`]: prelude::Future

/// Prelude module for convenient imports.
///
/// Aggregates the core types, the attribute macros, and the `tokio` runtime
/// (used by the expansion of `#[crossbar_main]`).
pub mod prelude {
    pub use tokio;

    pub use crossbar_core::prelude::*;
    pub use crossbar_macro::{crossbar_actor, crossbar_main, crossbar_message};
}
