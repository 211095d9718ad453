//! Conversation-related types.

use std::fmt::{self, Display, Formatter};

/// Identifies a message within one engine.
///
/// Ids are allocated in increasing order and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub(crate) u64);

impl Display for MessageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "msg:{}", self.0)
    }
}

/// Who wrote a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sender {
    /// The person playing the story.
    User,
    /// The narrative model.
    Assistant,
}

impl Sender {
    /// The prefix a message of this sender gets in a serialized transcript.
    #[inline]
    pub(crate) fn prompt_prefix(self) -> &'static str {
        match self {
            Sender::User => "User: ",
            Sender::Assistant => "AI: ",
        }
    }
}

/// A single immutable entry of the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    content: String,
}

impl Message {
    #[inline]
    pub(crate) fn new(id: MessageId, sender: Sender, content: String) -> Self {
        Self {
            id,
            sender,
            content,
        }
    }

    /// Returns the id of this message.
    #[inline]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Returns who wrote this message.
    #[inline]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Returns the text of this message.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// The append-only list of messages of a story.
#[derive(Clone, Default, Debug)]
pub(crate) struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    /// Appends a message and returns its id.
    pub fn push(&mut self, sender: Sender, content: String) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        self.messages.push(Message::new(id, sender, content));
        id
    }

    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
