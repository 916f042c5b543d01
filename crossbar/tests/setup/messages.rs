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
#![allow(unused)]

use crossbar::prelude::*;

/// A unit of work routed round-robin to one worker; the reply is the
/// sequence number doubled, proving which job a reply belongs to.
#[crossbar_message(reply(u32))]
pub struct ShardJob {
    pub sequence: u32,
}

/// An event whose reply is a formatted greeting.
#[crossbar_message(reply(String))]
pub struct Greet {
    pub who: String,
}

/// A bare liveness pulse fanned out to everyone listening.
#[crossbar_message(broadcast)]
pub struct Heartbeat;

/// A broadcast with a payload; handlers treat the text "boom" as a fault.
#[crossbar_message(broadcast)]
pub struct Announcement {
    pub text: String,
}
