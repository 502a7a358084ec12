//! Incremental parser for `git cat-file --batch` output.
//!
//! For every requested id git writes either
//!
//! ```text
//! <id> <type> <size>\n<size bytes of payload>\n
//! ```
//!
//! or `<id> missing\n`. Reads from the pipe arrive in arbitrary chunks, so the
//! parser keeps its position between calls to [`BatchParser::feed`].

use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::types::{ObjectId, ObjectType};

/// Upper bound on the buffer reserved up front for a payload. Larger objects
/// grow the buffer as their bytes arrive.
const MAX_PAYLOAD_PREALLOC: usize = 64 * 1024;

/// A fully received object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchObject {
    pub id: ObjectId,
    pub object_type: ObjectType,
    pub size: usize,
    pub data: Vec<u8>,
}

impl BatchObject {
    /// Payload decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// Outcome of one lookup in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Found(BatchObject),
    Missing(ObjectId),
}

impl BatchEvent {
    /// The id this event answers.
    #[must_use]
    pub const fn id(&self) -> &ObjectId {
        match self {
            Self::Found(object) => &object.id,
            Self::Missing(id) => id,
        }
    }
}

#[derive(Debug)]
enum State {
    AwaitingHeader,
    ConsumingPayload {
        id: ObjectId,
        object_type: ObjectType,
        size: usize,
        remaining: usize,
    },
    AwaitingTerminator {
        id: ObjectId,
        object_type: ObjectType,
        size: usize,
    },
    Failed,
}

/// Stateful cat-file stream parser.
#[derive(Debug)]
pub struct BatchParser {
    state: State,
    line: Vec<u8>,
    payload: Vec<u8>,
}

impl Default for BatchParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchParser {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::AwaitingHeader,
            line: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Whether the parser sits on a record boundary.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, State::AwaitingHeader)
    }

    /// Feed the next chunk, returning every record it completed.
    ///
    /// # Errors
    /// Returns [`Error::Protocol`] if the stream violates the framing. The
    /// parser is unusable afterwards; every later call fails too.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<BatchEvent>> {
        let result = self.feed_inner(chunk);
        if result.is_err() {
            self.state = State::Failed;
            self.line.clear();
            self.payload.clear();
        }
        result
    }

    fn feed_inner(&mut self, mut chunk: &[u8]) -> Result<Vec<BatchEvent>> {
        let mut events = Vec::new();

        while !chunk.is_empty() {
            match std::mem::replace(&mut self.state, State::AwaitingHeader) {
                State::Failed => {
                    self.state = State::Failed;
                    return Err(Error::Protocol("stream already failed".into()));
                }
                State::AwaitingHeader => {
                    let Some(newline) = chunk.iter().position(|&b| b == b'\n') else {
                        self.line.extend_from_slice(chunk);
                        return Ok(events);
                    };
                    self.line.extend_from_slice(&chunk[..newline]);
                    chunk = &chunk[newline + 1..];

                    let line = std::mem::take(&mut self.line);
                    if let Some(event) = self.consume_header(&line)? {
                        events.push(event);
                    }
                }
                State::ConsumingPayload {
                    id,
                    object_type,
                    size,
                    remaining,
                } => {
                    let take = remaining.min(chunk.len());
                    self.payload.extend_from_slice(&chunk[..take]);
                    chunk = &chunk[take..];

                    self.state = if remaining == take {
                        State::AwaitingTerminator {
                            id,
                            object_type,
                            size,
                        }
                    } else {
                        State::ConsumingPayload {
                            id,
                            object_type,
                            size,
                            remaining: remaining - take,
                        }
                    };
                }
                State::AwaitingTerminator {
                    id,
                    object_type,
                    size,
                } => {
                    if chunk[0] != b'\n' {
                        return Err(Error::Protocol(format!(
                            "object {id} overran its declared size of {size} bytes"
                        )));
                    }
                    chunk = &chunk[1..];
                    events.push(BatchEvent::Found(BatchObject {
                        id,
                        object_type,
                        size,
                        data: std::mem::take(&mut self.payload),
                    }));
                }
            }
        }

        Ok(events)
    }

    /// Interpret one header line, moving into payload state if needed.
    fn consume_header(&mut self, line: &[u8]) -> Result<Option<BatchEvent>> {
        let line = std::str::from_utf8(line)
            .map_err(|_| Error::Protocol("header is not valid UTF-8".into()))?
            .trim_end_matches('\r');

        // Stray blank lines between records carry no information.
        if line.trim().is_empty() {
            return Ok(None);
        }

        let unexpected = || Error::Protocol(format!("unexpected header: '{line}'"));
        let fields: Vec<&str> = line.split(' ').collect();

        match fields.as_slice() {
            [id, "missing"] => {
                let id = ObjectId::new(id).map_err(|_| unexpected())?;
                Ok(Some(BatchEvent::Missing(id)))
            }
            [id, object_type, size] => {
                let id = ObjectId::new(id).map_err(|_| unexpected())?;
                let object_type: ObjectType = object_type.parse().map_err(|_| unexpected())?;
                let size: usize = size.parse().map_err(|_| unexpected())?;

                self.payload = Vec::with_capacity(size.min(MAX_PAYLOAD_PREALLOC));
                self.state = if size == 0 {
                    State::AwaitingTerminator {
                        id,
                        object_type,
                        size,
                    }
                } else {
                    State::ConsumingPayload {
                        id,
                        object_type,
                        size,
                        remaining: size,
                    }
                };
                Ok(None)
            }
            _ => Err(unexpected()),
        }
    }
}
