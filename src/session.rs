// src/session.rs
//! The chat session ties the store to the components that drive it.
//!
//! Everything that changes chat state goes through a `ChatSession` method, and
//! those methods are only ever called from the event loop, so store mutations
//! never overlap.

use crossterm::event::KeyEvent;
use log::{debug, info};

use crate::composer::{Composer, ComposerEvent};
use crate::delivery::{DeliverySimulator, DeliveryUpdate};
use crate::models::MessageId;
use crate::selector::{ConversationSelector, LayoutMode};
use crate::store::{ChatStore, DeliveryOutcome};

pub struct ChatSession {
    store: ChatStore,
    simulator: DeliverySimulator,
    selector: ConversationSelector,
    composer: Composer,
}

impl ChatSession {
    pub fn new(store: ChatStore, simulator: DeliverySimulator) -> Self {
        let mut selector = ConversationSelector::new();
        selector.sync_to_active(&store);
        ChatSession {
            store,
            simulator,
            selector,
            composer: Composer::new(),
        }
    }

    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    pub fn selector(&self) -> &ConversationSelector {
        &self.selector
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn simulator(&self) -> &DeliverySimulator {
        &self.simulator
    }

    pub fn set_layout(&mut self, layout: LayoutMode) {
        self.selector.set_layout(layout);
    }

    pub fn select(&mut self, id: &str) -> bool {
        self.selector.select(&mut self.store, id)
    }

    pub fn select_highlighted(&mut self) -> bool {
        self.selector.select_highlighted(&mut self.store)
    }

    pub fn highlight_previous(&mut self) {
        self.selector.move_up(&self.store);
    }

    pub fn highlight_next(&mut self) {
        self.selector.move_down(&self.store);
    }

    pub fn toggle_sidebar(&mut self) {
        self.selector.toggle_overlay();
    }

    /// Validates `raw` and sends it to the active conversation.
    ///
    /// Returns the new message id, or None if the text was blank or no
    /// conversation is active.
    pub fn send_text(&mut self, raw: &str) -> Option<MessageId> {
        let text = Composer::accept(raw)?;
        let conversation_id = self.store.active_id()?.to_string();
        let message_id = self.store.append_message(&conversation_id, &text)?;
        self.simulator.schedule(&conversation_id, &message_id);
        info!("Sent message {} to conversation {}", message_id, conversation_id);
        Some(message_id)
    }

    /// Sends the composer's buffer, clearing it only if a message was created.
    pub fn submit(&mut self) -> Option<MessageId> {
        let raw = self.composer.value().to_string();
        let sent = self.send_text(&raw);
        if sent.is_some() {
            self.composer.clear();
        } else {
            debug!("Discarded submission of {} chars", raw.len());
        }
        sent
    }

    /// Feeds a key press to the composer; the submit keystroke sends.
    pub fn handle_composer_key(&mut self, key: KeyEvent) -> Option<MessageId> {
        match self.composer.handle_key(key) {
            ComposerEvent::Submit => self.submit(),
            ComposerEvent::Edited | ComposerEvent::Ignored => None,
        }
    }

    pub fn apply(&mut self, update: DeliveryUpdate) -> DeliveryOutcome {
        let outcome = self.store.update_delivery_state(
            &update.conversation_id,
            &update.message_id,
            update.state,
        );
        if !outcome.is_applied() {
            debug!("Receipt {:?} for {} ignored: {:?}", update.state, update.message_id, outcome);
        }
        outcome
    }

    pub fn shutdown(&mut self) {
        self.simulator.cancel_all();
    }
}
