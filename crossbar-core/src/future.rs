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

//! A one-shot, write-once synchronization cell representing a promised result.
//!
//! [`Future::pending`] returns a producer/consumer pair: the [`Promise`] is the
//! write side (held by whoever will eventually produce the value, typically the
//! bus's pending-reply table), the [`Future`] is the read side and may be cloned
//! freely. Every reader observes the same value once it is written.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::trace;

/// Why a [`Future`] read did not produce a value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FutureError {
    /// The [`Promise`] was dropped before a value was written. The bus abandons
    /// promises when the actor selected to handle an event unregisters without
    /// completing it.
    #[error("promised value was abandoned before resolution")]
    Abandoned,
    /// The timeout given to [`Future::get_timeout`] elapsed first. The value may
    /// still arrive later; this is "not yet", not a failure of the producer.
    #[error("promised value was not resolved within the timeout")]
    Unresolved,
}

/// The write side of a promised result. Single-assignment: the first
/// [`resolve`](Promise::resolve) wins and wakes every waiting reader.
#[derive(Debug)]
pub struct Promise<R> {
    tx: watch::Sender<Option<R>>,
}

/// The read side of a promised result.
///
/// Cloning is cheap and any number of tasks may block on [`get`](Future::get)
/// concurrently; all of them observe the same resolved value.
#[derive(Debug, Clone)]
pub struct Future<R> {
    rx: watch::Receiver<Option<R>>,
}

impl<R: Clone + Send + Sync + 'static> Future<R> {
    /// Creates an unresolved promise/future pair.
    pub fn pending() -> (Promise<R>, Future<R>) {
        let (tx, rx) = watch::channel(None);
        (Promise { tx }, Future { rx })
    }

    /// Waits until the value is available and returns it.
    ///
    /// The only error is [`FutureError::Abandoned`]: the producer went away
    /// without ever writing a value. This never hangs forever on an abandoned
    /// promise.
    pub async fn get(&self) -> Result<R, FutureError> {
        let mut rx = self.rx.clone();
        let resolved = rx
            .wait_for(|slot| slot.is_some())
            .await
            .map_err(|_| FutureError::Abandoned)?;
        Ok(resolved.clone().expect("watch guard holds a resolved value"))
    }

    /// Waits up to `timeout` for the value.
    ///
    /// Returns [`FutureError::Unresolved`] when the deadline passes first, so a
    /// caller can always distinguish "not yet" from any legitimately resolved
    /// value, including falsy ones.
    pub async fn get_timeout(&self, timeout: Duration) -> Result<R, FutureError> {
        match tokio::time::timeout(timeout, self.get()).await {
            Ok(result) => result,
            Err(_) => {
                trace!(?timeout, "future not resolved within timeout");
                Err(FutureError::Unresolved)
            }
        }
    }

    /// Returns the value if already resolved, without waiting.
    pub fn try_get(&self) -> Option<R> {
        self.rx.borrow().clone()
    }

    /// Non-blocking check for resolution.
    pub fn is_resolved(&self) -> bool {
        self.rx.borrow().is_some()
    }
}

impl<R: Clone + Send + Sync + 'static> Promise<R> {
    /// Writes the value if no value has been written yet and wakes every
    /// waiter. Returns `true` if this call performed the write; later calls
    /// are no-ops returning `false`.
    pub fn resolve(&self, value: R) -> bool {
        self.tx.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(value);
                true
            } else {
                false
            }
        })
    }

    /// Whether a value has been written.
    pub fn is_resolved(&self) -> bool {
        self.tx.borrow().is_some()
    }
}
