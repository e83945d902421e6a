//! Display decisions for the message thread.
//!
//! These are pure functions over messages; the terminal UI maps their results
//! onto styles and glyphs.

use crate::models::{DeliveryState, Direction, Message};

/// Which side of the thread a bubble sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleSide {
    Left,
    Right,
}

/// Receipt indicator shown next to a sent message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    SingleCheck,
    DoubleCheckMuted,
    DoubleCheckEmphasized,
}

impl StatusIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            StatusIcon::SingleCheck => "✓",
            StatusIcon::DoubleCheckMuted | StatusIcon::DoubleCheckEmphasized => "✓✓",
        }
    }

    pub fn is_emphasized(&self) -> bool {
        matches!(self, StatusIcon::DoubleCheckEmphasized)
    }
}

/// Whether to draw the sender's avatar next to `message`.
///
/// Sent messages never show one. A received message shows it when it opens
/// the thread or when the turn changes: a different sender, or the local user
/// spoke in between.
pub fn show_avatar(message: &Message, previous: Option<&Message>) -> bool {
    match message.direction {
        Direction::Sent(_) => false,
        Direction::Received => match previous {
            None => true,
            Some(prev) => prev.sender.id != message.sender.id || prev.is_sent(),
        },
    }
}

pub fn status_icon(message: &Message) -> Option<StatusIcon> {
    match message.direction {
        Direction::Sent(DeliveryState::Read) => Some(StatusIcon::DoubleCheckEmphasized),
        Direction::Sent(DeliveryState::Delivered) => Some(StatusIcon::DoubleCheckMuted),
        Direction::Sent(DeliveryState::Pending) => Some(StatusIcon::SingleCheck),
        Direction::Received => None,
    }
}

pub fn bubble_side(message: &Message) -> BubbleSide {
    match message.direction {
        Direction::Sent(_) => BubbleSide::Right,
        Direction::Received => BubbleSide::Left,
    }
}

/// Avatar fallback text: the first letter of each word in `name`.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    pub show_avatar: bool,
    pub side: BubbleSide,
    pub status: Option<StatusIcon>,
}

/// Pairs every message with its predecessor and computes its display decisions.
pub fn thread_view(messages: &[Message]) -> Vec<MessageView<'_>> {
    messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let previous = i.checked_sub(1).map(|p| &messages[p]);
            MessageView {
                message,
                show_avatar: show_avatar(message, previous),
                side: bubble_side(message),
                status: status_icon(message),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;

    fn msg(id: &str, sender: &str, direction: Direction) -> Message {
        Message {
            id: id.to_string(),
            content: format!("message {}", id),
            timestamp: "10:00 AM".to_string(),
            sender: Sender::new(sender, sender),
            direction,
        }
    }

    #[test]
    fn test_sent_messages_never_show_avatar() {
        let received = msg("0", "a", Direction::Received);
        for state in [DeliveryState::Pending, DeliveryState::Delivered, DeliveryState::Read] {
            let sent = msg("1", "me", Direction::Sent(state));
            assert!(!show_avatar(&sent, None));
            assert!(!show_avatar(&sent, Some(&received)));
        }
    }

    #[test]
    fn test_first_received_message_shows_avatar() {
        assert!(show_avatar(&msg("1", "a", Direction::Received), None));
    }

    #[test]
    fn test_same_sender_run_hides_avatar() {
        let messages = vec![
            msg("1", "a", Direction::Received),
            msg("2", "a", Direction::Received),
        ];
        let view = thread_view(&messages);
        assert!(view[0].show_avatar);
        assert!(!view[1].show_avatar);
    }

    #[test]
    fn test_avatar_returns_after_local_turn() {
        let messages = vec![
            msg("1", "a", Direction::Received),
            msg("2", "me", Direction::Sent(DeliveryState::Read)),
            msg("3", "a", Direction::Received),
        ];
        let view = thread_view(&messages);
        assert!(view[0].show_avatar);
        assert!(!view[1].show_avatar);
        assert!(view[2].show_avatar);
    }

    #[test]
    fn test_sender_change_shows_avatar() {
        let messages = vec![
            msg("1", "a", Direction::Received),
            msg("2", "b", Direction::Received),
        ];
        assert!(thread_view(&messages)[1].show_avatar);
    }

    #[test]
    fn test_status_icons() {
        let icon = |state| status_icon(&msg("1", "me", Direction::Sent(state)));
        assert_eq!(icon(DeliveryState::Pending), Some(StatusIcon::SingleCheck));
        assert_eq!(icon(DeliveryState::Delivered), Some(StatusIcon::DoubleCheckMuted));
        assert_eq!(icon(DeliveryState::Read), Some(StatusIcon::DoubleCheckEmphasized));
        assert_eq!(status_icon(&msg("2", "a", Direction::Received)), None);
        assert!(StatusIcon::DoubleCheckEmphasized.is_emphasized());
        assert_eq!(StatusIcon::DoubleCheckMuted.glyph(), "✓✓");
    }

    #[test]
    fn test_bubble_sides() {
        let sent = msg("1", "me", Direction::Sent(DeliveryState::Pending));
        assert_eq!(bubble_side(&sent), BubbleSide::Right);
        assert_eq!(bubble_side(&msg("2", "a", Direction::Received)), BubbleSide::Left);
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("Sarah Johnson"), "SJ");
        assert_eq!(initials("  Design   Team "), "DT");
        assert_eq!(initials("Mike"), "M");
        assert_eq!(initials(""), "");
    }
}
