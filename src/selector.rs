use log::debug;

use crate::store::ChatStore;

/// Terminal width below which the sidebar becomes an overlay
pub const DEFAULT_NARROW_WIDTH: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Sidebar and thread side by side
    Wide,
    /// Sidebar only visible as an overlay
    Narrow,
}

impl LayoutMode {
    pub fn for_width(width: u16, narrow_below: u16) -> Self {
        if width < narrow_below {
            LayoutMode::Narrow
        } else {
            LayoutMode::Wide
        }
    }
}

/// Sidebar state: which row is highlighted and whether the overlay is open.
pub struct ConversationSelector {
    highlighted: usize,
    overlay_open: bool,
    layout: LayoutMode,
}

impl Default for ConversationSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSelector {
    pub fn new() -> Self {
        ConversationSelector {
            highlighted: 0,
            overlay_open: false,
            layout: LayoutMode::Wide,
        }
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn set_layout(&mut self, layout: LayoutMode) {
        if layout != self.layout {
            debug!("Layout changed to {:?}", layout);
            self.layout = layout;
        }
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn highlighted_id<'a>(&self, store: &'a ChatStore) -> Option<&'a str> {
        store.conversations().get(self.highlighted).map(|c| c.id.as_str())
    }

    /// True when the sidebar should be drawn.
    pub fn sidebar_visible(&self) -> bool {
        match self.layout {
            LayoutMode::Wide => true,
            LayoutMode::Narrow => self.overlay_open,
        }
    }

    pub fn is_overlay_open(&self) -> bool {
        self.overlay_open
    }

    pub fn toggle_overlay(&mut self) {
        self.overlay_open = !self.overlay_open;
    }

    pub fn close_overlay(&mut self) {
        self.overlay_open = false;
    }

    pub fn move_up(&mut self, store: &ChatStore) {
        let len = store.conversations().len();
        if len > 0 {
            self.highlighted = (self.highlighted + len - 1) % len;
        }
    }

    pub fn move_down(&mut self, store: &ChatStore) {
        let len = store.conversations().len();
        if len > 0 {
            self.highlighted = (self.highlighted + 1) % len;
        }
    }

    /// Points the highlight at the store's active conversation.
    pub fn sync_to_active(&mut self, store: &ChatStore) {
        if let Some(active) = store.active_id() {
            if let Some(index) = store.conversations().iter().position(|c| c.id == active) {
                self.highlighted = index;
            }
        }
    }

    /// Selects `id` in the store. On a narrow layout a successful selection
    /// also collapses the overlay.
    pub fn select(&mut self, store: &mut ChatStore, id: &str) -> bool {
        if !store.select_conversation(id) {
            return false;
        }
        self.sync_to_active(store);
        if self.layout == LayoutMode::Narrow {
            self.close_overlay();
        }
        true
    }

    pub fn select_highlighted(&mut self, store: &mut ChatStore) -> bool {
        match self.highlighted_id(store).map(str::to_string) {
            Some(id) => self.select(store, &id),
            None => false,
        }
    }
}
