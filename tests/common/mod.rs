// Common test utilities for integration tests
// This module contains shared code for all integration tests

#![allow(dead_code)]

use std::sync::Once;

use log::LevelFilter;
use tokio::sync::mpsc;

use parley::delivery::{DeliverySimulator, DeliveryTimings, DeliveryUpdate};
use parley::seed::mock_conversations;
use parley::{ChatSession, ChatStore, Conversation, DeliveryState, Direction, Message, Sender};

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();
    });
}

/// The local user every test store is built around
pub fn me() -> Sender {
    Sender::new("1", "You")
}

/// A store seeded with the built-in mock conversations
pub fn mock_store() -> ChatStore {
    ChatStore::new(mock_conversations(&me()), me()).expect("mock data should be a valid seed")
}

/// A session over the mock store; must be called inside a tokio runtime
pub fn mock_session(timings: DeliveryTimings) -> (ChatSession, mpsc::Receiver<DeliveryUpdate>) {
    setup_logging();
    let (simulator, rx) = DeliverySimulator::new(timings);
    (ChatSession::new(mock_store(), simulator), rx)
}

pub fn received(id: &str, content: &str, sender: &Sender) -> Message {
    Message {
        id: id.to_string(),
        content: content.to_string(),
        timestamp: "09:00 AM".to_string(),
        sender: sender.clone(),
        direction: Direction::Received,
    }
}

pub fn sent(id: &str, content: &str, state: DeliveryState) -> Message {
    Message {
        id: id.to_string(),
        content: content.to_string(),
        timestamp: "09:01 AM".to_string(),
        sender: me(),
        direction: Direction::Sent(state),
    }
}

/// Looks up a message's delivery state anywhere in the store
pub fn state_of(
    session: &ChatSession,
    conversation_id: &str,
    message_id: &str,
) -> Option<DeliveryState> {
    session
        .store()
        .conversation(conversation_id)?
        .messages
        .iter()
        .find(|m| m.id == message_id)?
        .delivery_state()
}

pub fn message_counts(store: &ChatStore) -> Vec<usize> {
    store.conversations().iter().map(|c: &Conversation| c.messages.len()).collect()
}
