// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Incremental decoder for the cloud's server-sent event stream.
//!
//! The stream looks like this:
//!
//! ```text
//! :ok
//!
//! event: house/ivt/data
//! data: {"data":"{\"fan_on\":1}","ttl":60,"published_at":"2026-10-18T12:00:00.000Z","coreid":"e00fce68"}
//!
//! ```
//!
//! Chunks from the network may split lines (or UTF-8 sequences) anywhere,
//! so bytes are buffered until a full line is available.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::RawEvent;
use crate::error::CloudError;

/// Longest line accepted before the stream is considered broken.
pub(crate) const MAX_LINE_LENGTH: usize = 256 * 1024;

/// JSON envelope carried in the `data:` field of each frame.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    coreid: Option<String>,
}

/// Turns a byte stream into [`RawEvent`]s.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Feeds a chunk and returns every event completed by it.
    ///
    /// Fails with [`CloudError::Stream`] once a line grows past
    /// [`MAX_LINE_LENGTH`]; the partial frame is discarded.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Result<Vec<RawEvent>, CloudError> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }

        if self.buffer.len() > MAX_LINE_LENGTH {
            let length = self.buffer.len();
            self.buffer.clear();
            self.event = None;
            self.data.clear();
            return Err(CloudError::Stream(format!(
                "line of {length} bytes exceeds {MAX_LINE_LENGTH}"
            )));
        }
        Ok(events)
    }

    fn process_line(&mut self, line: &str) -> Option<RawEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        // Comment / keep-alive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<RawEvent> {
        let name = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(event_from_frame(name, &data))
    }
}

fn event_from_frame(name: Option<String>, data: &str) -> RawEvent {
    match serde_json::from_str::<Envelope>(data) {
        Ok(envelope) => RawEvent {
            name,
            data: envelope.data,
            published_at: envelope.published_at,
            core_id: envelope.coreid,
        },
        Err(_) => RawEvent {
            name,
            data: Some(data.to_string()),
            published_at: None,
            core_id: None,
        },
    }
}
