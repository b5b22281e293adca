//! Chat turns and the linear history of a conversation

use serde::{Deserialize, Serialize};

use crate::llm::{Message, MessageRole};

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl From<ChatRole> for MessageRole {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => MessageRole::User,
            ChatRole::Model => MessageRole::Model,
        }
    }
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }

    pub fn to_message(&self) -> Message {
        Message::new_text(self.role.into(), self.text.clone())
    }
}

/// Append-only chat history; only the trailing model turn may grow in place
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Append `fragment` to the trailing model turn. Returns false when the
    /// history does not end with a model turn.
    pub fn append_to_last_model(&mut self, fragment: &str) -> bool {
        match self.turns.last_mut() {
            Some(turn) if turn.role == ChatRole::Model => {
                turn.text.push_str(fragment);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Get conversation statistics
    pub fn stats(&self) -> ConversationStats {
        ConversationStats {
            total_turns: self.turns.len(),
            user_turns: self.turns.iter().filter(|t| t.role == ChatRole::User).count(),
            model_turns: self.turns.iter().filter(|t| t.role == ChatRole::Model).count(),
            characters: self.turns.iter().map(|t| t.text.chars().count()).sum(),
        }
    }
}

/// Conversation statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationStats {
    pub total_turns: usize,
    pub user_turns: usize,
    pub model_turns: usize,
    pub characters: usize,
}

/// Build the backend message list for `history` followed by `new_message`
pub fn to_messages(history: &[ChatTurn], new_message: &str) -> Vec<Message> {
    history
        .iter()
        .map(ChatTurn::to_message)
        .chain(std::iter::once(Message::new_user(new_message.to_string())))
        .collect()
}
