// The unit of data passed between worker threads through a pooled queue

use crate::error::PacketError;
use serde_json::Value;
use tracing::warn;

/// A sender tag plus a payload that is held as a JSON tree, as JSON text, or both.
///
/// Whichever representation is missing is produced on first access and cached
/// in the packet. Setting one representation drops the cached copy of the other
/// so the two never disagree.
///
/// Packets carry no lock. They move between threads by value through a queue,
/// so only one thread ever touches a given packet.
#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    sender: String,
    /// Structured slot. `None` means invalid.
    structured: Option<Value>,
    /// Serialized slot. `None` means invalid.
    serialized: Option<String>,
    /// Queue id the receiver should answer on, if any.
    reply_to: Option<usize>,
}

impl Packet {
    /// Create a packet whose payload starts out as a JSON tree.
    pub fn from_structured(sender: impl Into<String>, value: Value) -> Self {
        Self {
            sender: sender.into(),
            structured: Some(value),
            serialized: None,
            reply_to: None,
        }
    }

    /// Create a packet whose payload starts out as JSON text.
    ///
    /// The text is not validated here; a malformed payload only shows up when
    /// the structured form is requested.
    pub fn from_serialized(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            structured: None,
            serialized: Some(text.into()),
            reply_to: None,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Ask the receiver to answer on queue `qid`.
    pub fn with_reply_to(mut self, qid: usize) -> Self {
        self.reply_to = Some(qid);
        self
    }

    /// Queue id the sender expects an answer on. Unaffected by `set_*`.
    pub fn reply_to(&self) -> Option<usize> {
        self.reply_to
    }

    pub fn set_structured(&mut self, value: Value) {
        self.structured = Some(value);
        self.serialized = None;
    }

    pub fn set_serialized(&mut self, text: impl Into<String>) {
        self.serialized = Some(text.into());
        self.structured = None;
    }

    /// Structured payload, parsing and caching the text form if needed.
    ///
    /// Returns `None` when the text form is not valid JSON; the structured slot
    /// stays invalid in that case and the text is left untouched.
    pub fn get_structured(&mut self) -> Option<&Value> {
        if let Err(e) = self.try_structured() {
            warn!(sender = %self.sender, "no structured payload: {}", e);
            return None;
        }
        self.structured.as_ref()
    }

    /// Like [`Packet::get_structured`] but reports why the tree is unavailable.
    pub fn try_structured(&mut self) -> Result<&Value, PacketError> {
        if self.structured.is_none() {
            let parsed = match self.serialized.as_deref() {
                Some(text) => serde_json::from_str::<Value>(text)?,
                None => {
                    return Err(PacketError::Empty {
                        sender: self.sender.clone(),
                    })
                }
            };
            self.structured = Some(parsed);
        }
        self.structured.as_ref().ok_or_else(|| PacketError::Empty {
            sender: self.sender.clone(),
        })
    }

    /// Serialized payload, rendering and caching the tree form if needed.
    pub fn get_serialized(&mut self) -> Option<&str> {
        if self.serialized.is_none() {
            // Rendering a `Value` cannot fail: every map key is already a string.
            let text = serde_json::to_string(self.structured.as_ref()?).ok()?;
            self.serialized = Some(text);
        }
        self.serialized.as_deref()
    }

    /// Whether the structured slot currently holds a value.
    pub fn has_structured(&self) -> bool {
        self.structured.is_some()
    }

    /// Whether the serialized slot currently holds a value.
    pub fn has_serialized(&self) -> bool {
        self.serialized.is_some()
    }
}
