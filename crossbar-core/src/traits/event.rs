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

use crate::traits::BusMessage;

/// A message expecting exactly one reply value, delivered to exactly one
/// subscriber chosen round-robin among those subscribed to the concrete type.
///
/// Sending an `Event` yields a [`Future`](crate::future::Future) for its
/// [`Reply`](Event::Reply); the handling actor resolves it through
/// `complete`. Implement this with `#[crossbar_message(reply(T))]` or by hand:
///
/// ```ignore
/// #[derive(Clone, Debug)]
/// struct ScanRegion { pub sector: u8 }
///
/// impl Event for ScanRegion {
///     type Reply = u32;
/// }
/// ```
pub trait Event: BusMessage + Clone {
    /// The value the handling actor produces for this event.
    type Reply: Clone + Send + Sync + Debug + 'static;
}
