//! Conversation state shared by every node of one run
//!
//! An append-only message log plus the supervisor's routing decision. Updates
//! never mutate a state in place; each returns a new value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::ChatMessage;

/// Default value a supervisor selects to end the run
pub const FINISH: &str = "FINISH";

/// One entry of the shared transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    author: Option<String>,
}

impl Message {
    /// A message with no author (the user's question)
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: None,
        }
    }

    /// A message attributed to an agent
    pub fn from_agent(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: Some(author.into()),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Render as a user turn for the completion service, keeping the author
    /// as the participant name.
    pub fn to_chat(&self) -> ChatMessage {
        let msg = ChatMessage::user(self.content.clone());
        match self.author {
            Some(ref author) => msg.named(author.clone()),
            None => msg,
        }
    }
}

/// Who acts after the supervisor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Hand control to the named worker
    Worker(String),
    /// Stop the run
    Finish,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Worker(name) => write!(f, "{}", name),
            Route::Finish => write!(f, "{}", FINISH),
        }
    }
}

/// Partial update returned by an agent invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    /// Messages to append, in order
    pub messages: Vec<Message>,
    /// New routing decision, if the agent made one
    pub next: Option<Route>,
}

impl StateUpdate {
    /// An update that appends a single message
    pub fn message(message: Message) -> Self {
        Self {
            messages: vec![message],
            next: None,
        }
    }

    /// An update that only sets the routing field
    pub fn route(next: Route) -> Self {
        Self {
            messages: Vec::new(),
            next: Some(next),
        }
    }
}

/// Transcript plus routing field for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    next: Option<Route>,
}

impl ConversationState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// A state holding only the user's question, with `next` unset
    pub fn seed(question: impl Into<String>) -> Self {
        Self::new().append(Message::new(question))
    }

    /// New state with `message` appended
    pub fn append(&self, message: Message) -> Self {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend(self.messages.iter().cloned());
        messages.push(message);

        Self {
            messages,
            next: self.next.clone(),
        }
    }

    /// New state with the routing field replaced
    pub fn set_next(&self, next: Route) -> Self {
        Self {
            messages: self.messages.clone(),
            next: Some(next),
        }
    }

    /// Merge an agent's update: append its messages, then set `next` if present
    pub fn apply(&self, update: StateUpdate) -> Self {
        let merged = update
            .messages
            .into_iter()
            .fold(self.clone(), |state, message| state.append(message));

        match update.next {
            Some(next) => merged.set_next(next),
            None => merged,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn next(&self) -> Option<&Route> {
        self.next.as_ref()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// History rendered for the completion service
    pub fn to_chat_history(&self) -> Vec<ChatMessage> {
        self.messages.iter().map(Message::to_chat).collect()
    }
}
