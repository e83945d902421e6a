// src/store.rs
//! Conversation and message state.
//!
//! `ChatStore` owns every conversation and is the only place messages are
//! created or have their delivery state changed. All of its mutating entry
//! points treat unknown targets as no-ops and report what happened through
//! their return value instead of an error.

use std::collections::HashSet;

use chrono::Local;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    Conversation, ConversationId, ConversationSummary, DeliveryState, Direction, Message,
    MessageId, Sender,
};
use crate::seed::SeedError;

/// Display format for message timestamps, e.g. `10:30 AM`.
pub const TIMESTAMP_FORMAT: &str = "%I:%M %p";

/// Result of a delivery state update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeliveryOutcome {
    /// The message moved forward.
    Advanced { from: DeliveryState, to: DeliveryState },
    /// The requested state is not ahead of the current one.
    NotForward { current: DeliveryState },
    /// The message was received, so it has no delivery state.
    NotSent,
    UnknownConversation,
    UnknownMessage,
}

impl DeliveryOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DeliveryOutcome::Advanced { .. })
    }
}

pub struct ChatStore {
    conversations: Vec<Conversation>,
    active: Option<ConversationId>,
    local_user: Sender,
    issued_ids: HashSet<MessageId>,
}

impl ChatStore {
    /// Builds a store from seed conversations with the first one active.
    pub fn new(conversations: Vec<Conversation>, local_user: Sender) -> Result<Self, SeedError> {
        Self::with_initial(conversations, local_user, None)
    }

    /// Builds a store from seed conversations, starting on `initial`.
    ///
    /// Falls back to the first conversation when `initial` is unset or unknown.
    /// Only the conversation that ends up active is marked read.
    pub fn with_initial(
        conversations: Vec<Conversation>,
        local_user: Sender,
        initial: Option<&str>,
    ) -> Result<Self, SeedError> {
        let mut conversation_ids = HashSet::new();
        let mut issued_ids = HashSet::new();

        for conversation in &conversations {
            if !conversation_ids.insert(conversation.id.clone()) {
                return Err(SeedError::DuplicateConversation(conversation.id.clone()));
            }
            for message in &conversation.messages {
                if message.content.trim().is_empty() {
                    return Err(SeedError::EmptyContent(message.id.clone()));
                }
                if !issued_ids.insert(message.id.clone()) {
                    return Err(SeedError::DuplicateMessage(message.id.clone()));
                }
            }
        }

        let active = match initial {
            Some(id) if conversation_ids.contains(id) => Some(id.to_string()),
            Some(id) => {
                warn!("Initial conversation {} does not exist, starting on the first one", id);
                conversations.first().map(|c| c.id.clone())
            }
            None => conversations.first().map(|c| c.id.clone()),
        };
        info!(
            "Chat store ready with {} conversations and {} messages",
            conversations.len(),
            issued_ids.len()
        );

        let mut store = ChatStore {
            conversations,
            active: None,
            local_user,
            issued_ids,
        };
        if let Some(id) = active {
            store.select_conversation(&id);
        }
        Ok(store)
    }

    pub fn local_user(&self) -> &Sender {
        &self.local_user
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    fn conversation_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.conversations.iter().map(ConversationSummary::from).collect()
    }

    pub fn message_count(&self, conversation_id: &str) -> Option<usize> {
        self.conversation(conversation_id).map(|c| c.messages.len())
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active.as_deref().and_then(|id| self.conversation(id))
    }

    /// Makes `id` the active conversation and marks it read.
    ///
    /// Returns false and leaves the current selection alone if `id` is unknown.
    pub fn select_conversation(&mut self, id: &str) -> bool {
        let Some(conversation) = self.conversation_mut(id) else {
            warn!("Ignoring selection of unknown conversation {}", id);
            return false;
        };
        conversation.unread = 0;
        debug!("Active conversation is now {} ({})", conversation.id, conversation.name);
        self.active = Some(id.to_string());
        true
    }

    /// Appends a new pending message from the local user.
    ///
    /// Callers are expected to pass already trimmed, non-empty text.
    pub fn append_message(&mut self, conversation_id: &str, content: &str) -> Option<MessageId> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.append_message_at(conversation_id, content, timestamp)
    }

    fn append_message_at(
        &mut self,
        conversation_id: &str,
        content: &str,
        timestamp: String,
    ) -> Option<MessageId> {
        if self.conversation(conversation_id).is_none() {
            warn!("Dropping message for unknown conversation {}", conversation_id);
            return None;
        }

        let id = self.fresh_id();
        let message = Message {
            id: id.clone(),
            content: content.to_string(),
            timestamp,
            sender: self.local_user.clone(),
            direction: Direction::Sent(DeliveryState::Pending),
        };

        let conversation = self.conversation_mut(conversation_id)?;
        conversation.messages.push(message);
        debug!(
            "Appended message {} to {} ({} messages)",
            id,
            conversation_id,
            conversation.messages.len()
        );
        Some(id)
    }

    fn fresh_id(&mut self) -> MessageId {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.issued_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Moves a sent message's delivery state forward.
    ///
    /// Regressions, repeats and unknown targets are reported but change nothing.
    pub fn update_delivery_state(
        &mut self,
        conversation_id: &str,
        message_id: &str,
        new_state: DeliveryState,
    ) -> DeliveryOutcome {
        let Some(conversation) = self.conversation_mut(conversation_id) else {
            return DeliveryOutcome::UnknownConversation;
        };
        let Some(message) = conversation.messages.iter_mut().find(|m| m.id == message_id) else {
            return DeliveryOutcome::UnknownMessage;
        };

        match message.direction {
            Direction::Received => DeliveryOutcome::NotSent,
            Direction::Sent(current) if !current.can_advance_to(new_state) => {
                DeliveryOutcome::NotForward { current }
            }
            Direction::Sent(current) => {
                message.direction = Direction::Sent(new_state);
                debug!("Message {} advanced {:?} -> {:?}", message_id, current, new_state);
                DeliveryOutcome::Advanced { from: current, to: new_state }
            }
        }
    }
}
