// Seed data for the chat store: the built-in mock dataset and JSON seed files.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::models::{Conversation, DeliveryState, Direction, Message, Sender};

/// Errors raised while loading or validating seed conversations
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Conversation id {0} appears more than once")]
    DuplicateConversation(String),

    #[error("Message id {0} appears more than once")]
    DuplicateMessage(String),

    #[error("Message {0} has no content")]
    EmptyContent(String),
}

/// Reads a JSON array of conversations.
///
/// Validation of ids and content happens when the conversations are handed to
/// [`crate::store::ChatStore::new`].
pub fn load_seed(path: &Path) -> Result<Vec<Conversation>, SeedError> {
    let file = File::open(path)?;
    let conversations: Vec<Conversation> = serde_json::from_reader(BufReader::new(file))?;
    info!("Loaded {} seed conversations from {}", conversations.len(), path.display());
    Ok(conversations)
}

fn message(
    id: &str,
    content: &str,
    timestamp: &str,
    sender: &Sender,
    direction: Direction,
) -> Message {
    Message {
        id: id.to_string(),
        content: content.to_string(),
        timestamp: timestamp.to_string(),
        sender: sender.clone(),
        direction,
    }
}

/// The built-in mock conversations.
pub fn mock_conversations(local_user: &Sender) -> Vec<Conversation> {
    let sarah = Sender::new("2", "Sarah Johnson").with_avatar("/placeholder.svg");
    let alex = Sender::new("3", "Alex Rivera");
    let priya = Sender::new("4", "Priya Patel");
    let mike = Sender::new("5", "Mike Chen");
    let bot = Sender::new("6", "Project Bot");

    let sent = |state| Direction::Sent(state);

    let mut sarah_chat = Conversation::new("1", "Sarah Johnson");
    sarah_chat.avatar = Some("/placeholder.svg".to_string());
    sarah_chat.online = true;
    sarah_chat.unread = 2;
    sarah_chat.messages = vec![
        message("1", "Hey! How are you doing today?", "10:30 AM", &sarah, Direction::Received),
        message(
            "2",
            "I'm doing great, thanks! Just working on some new designs. How about you?",
            "10:32 AM",
            local_user,
            sent(DeliveryState::Read),
        ),
        message(
            "3",
            "That sounds exciting! I'd love to see them when you're ready to share.",
            "10:33 AM",
            &sarah,
            Direction::Received,
        ),
        message(
            "4",
            "Absolutely! I'll send them over later today. \
             They're for the new chat app project we discussed.",
            "10:35 AM",
            local_user,
            sent(DeliveryState::Delivered),
        ),
    ];

    let mut design_team = Conversation::new("2", "Design Team");
    design_team.last_seen = Some("5 members".to_string());
    design_team.unread = 5;
    design_team.messages = vec![
        message(
            "5",
            "Uploaded the first round of mockups.",
            "09:02 AM",
            &alex,
            Direction::Received,
        ),
        message(
            "6",
            "Color palette is in the shared folder too.",
            "09:03 AM",
            &alex,
            Direction::Received,
        ),
        message(
            "7",
            "Nice, I'll review after standup.",
            "09:10 AM",
            local_user,
            sent(DeliveryState::Read),
        ),
        message("8", "The new mockups look great!", "09:41 AM", &priya, Direction::Received),
    ];

    let mut mike_chat = Conversation::new("3", "Mike Chen");
    mike_chat.online = true;
    mike_chat.messages = vec![
        message(
            "9",
            "Got the deploy working, that config fix did it.",
            "07:15 AM",
            local_user,
            sent(DeliveryState::Read),
        ),
        message("10", "Thanks for the help yesterday", "07:20 AM", &mike, Direction::Received),
    ];

    let mut updates = Conversation::new("4", "Project Updates");
    updates.last_seen = Some("last seen yesterday".to_string());
    updates.unread = 1;
    updates.messages = vec![message(
        "11",
        "Sprint planning meeting at 3 PM",
        "08:00 AM",
        &bot,
        Direction::Received,
    )];

    vec![sarah_chat, design_team, mike_chat, updates]
}
