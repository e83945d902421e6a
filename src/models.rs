use serde::{Deserialize, Serialize};

pub type ConversationId = String;
pub type MessageId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Sender {
    pub fn new(id: &str, name: &str) -> Self {
        Sender {
            id: id.to_string(),
            name: name.to_string(),
            avatar: None,
        }
    }

    pub fn with_avatar(mut self, avatar: &str) -> Self {
        self.avatar = Some(avatar.to_string());
        self
    }
}

/// Delivery progress of a locally sent message.
///
/// Variants are declared in delivery order so the derived `Ord` is the
/// progression `Pending < Delivered < Read`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    Pending = 0,   // Created locally, no receipt yet
    Delivered = 1, // Reached the recipient's device
    Read = 2,      // Seen by the recipient
}

impl DeliveryState {
    /// Returns true if moving from `self` to `next` is forward progress.
    pub fn can_advance_to(self, next: DeliveryState) -> bool {
        next > self
    }
}

/// Who authored a message, relative to the local user.
///
/// Only sent messages carry a delivery state.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent(DeliveryState),
    Received,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub timestamp: String,
    pub sender: Sender,
    pub direction: Direction,
}

impl Message {
    pub fn is_sent(&self) -> bool {
        matches!(self.direction, Direction::Sent(_))
    }

    pub fn delivery_state(&self) -> Option<DeliveryState> {
        match self.direction {
            Direction::Sent(state) => Some(state),
            Direction::Received => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    #[serde(default)]
    pub unread: u32,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(id: &str, name: &str) -> Self {
        Conversation {
            id: id.to_string(),
            name: name.to_string(),
            avatar: None,
            online: false,
            last_seen: None,
            unread: 0,
            messages: Vec::new(),
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    // Header subtitle: presence, or last seen when offline
    pub fn presence_label(&self) -> String {
        if self.online {
            "Online".to_string()
        } else {
            self.last_seen.clone().unwrap_or_default()
        }
    }
}

/// One sidebar row, derived from a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub name: String,
    pub online: bool,
    pub unread: u32,
    pub preview: String,
    pub timestamp: String,
}

impl From<&Conversation> for ConversationSummary {
    fn from(conversation: &Conversation) -> Self {
        let (preview, timestamp) = conversation
            .last_message()
            .map(|m| (m.content.clone(), m.timestamp.clone()))
            .unwrap_or_default();

        ConversationSummary {
            id: conversation.id.clone(),
            name: conversation.name.clone(),
            online: conversation.online,
            unread: conversation.unread,
            preview,
            timestamp,
        }
    }
}
