// Seed loading and thread rendering decisions over realistic data

mod common;
use common::{me, mock_store, received, sent, setup_logging};

use std::fs;

use tempfile::tempdir;

use parley::render::{show_avatar, status_icon, thread_view, StatusIcon};
use parley::seed::{load_seed, mock_conversations, SeedError};
use parley::{ChatStore, DeliveryState, Sender};

#[test]
fn test_load_seed_file() {
    setup_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("seed.json");
    fs::write(
        &path,
        r#"[
            {
                "id": "team",
                "name": "Release Crew",
                "online": true,
                "unread": 2,
                "messages": [
                    {
                        "id": "r1",
                        "content": "Build is green",
                        "timestamp": "08:15 AM",
                        "sender": { "id": "ci", "name": "CI Bot" },
                        "direction": "received"
                    },
                    {
                        "id": "r2",
                        "content": "Shipping it",
                        "timestamp": "08:16 AM",
                        "sender": { "id": "1", "name": "You" },
                        "direction": { "sent": "delivered" }
                    }
                ]
            },
            { "id": "quiet", "name": "Nobody" }
        ]"#,
    )
    .unwrap();

    let conversations = load_seed(&path).unwrap();
    assert_eq!(conversations.len(), 2);
    assert!(conversations[1].messages.is_empty());
    assert!(!conversations[1].online);

    let store = ChatStore::new(conversations, me()).unwrap();
    assert_eq!(store.active_id(), Some("team"));
    // Opening the first conversation marks it read
    assert_eq!(store.conversation("team").unwrap().unread, 0);

    let summaries = store.summaries();
    assert_eq!(summaries[0].preview, "Shipping it");
    assert_eq!(summaries[1].preview, "");
}

#[test]
fn test_configured_start_keeps_other_unread_counts() {
    let seeded = mock_conversations(&me());
    let sarah_unread = seeded[0].unread;
    assert!(sarah_unread > 0);

    let store = ChatStore::with_initial(seeded, me(), Some("3")).unwrap();
    assert_eq!(store.active_id(), Some("3"));
    assert_eq!(store.conversation("1").unwrap().unread, sarah_unread);
    assert_eq!(store.conversation("2").unwrap().unread, 5);
}

#[test]
fn test_load_seed_errors() {
    let dir = tempdir().unwrap();

    let missing = dir.path().join("nope.json");
    assert!(matches!(load_seed(&missing), Err(SeedError::Io(_))));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, r#"[{ "id": "x" }]"#).unwrap();
    assert!(matches!(load_seed(&broken), Err(SeedError::Parse(_))));
}

#[test]
fn test_mock_thread_avatars() {
    let store = mock_store();
    for conversation in store.conversations() {
        let view = thread_view(&conversation.messages);
        for (i, item) in view.iter().enumerate() {
            if item.message.is_sent() {
                assert!(!item.show_avatar, "sent message {} shows an avatar", item.message.id);
            }
            if i == 0 && !item.message.is_sent() {
                assert!(item.show_avatar);
            }
        }
    }

    // Design Team: Alex twice, then a local reply, then Priya
    let design = thread_view(&store.conversation("2").unwrap().messages);
    let avatars: Vec<bool> = design.iter().map(|v| v.show_avatar).collect();
    assert_eq!(avatars, vec![true, false, false, true]);
}

#[test]
fn test_avatar_turn_taking() {
    let a = Sender::new("a", "Alice Smith");

    let same_sender = vec![received("1", "one", &a), received("2", "two", &a)];
    assert!(!show_avatar(&same_sender[1], Some(&same_sender[0])));

    let with_reply = vec![
        received("1", "one", &a),
        sent("2", "mine", DeliveryState::Read),
        received("3", "three", &a),
    ];
    assert!(show_avatar(&with_reply[2], Some(&with_reply[1])));
}

#[test]
fn test_mock_status_icons() {
    let store = mock_store();
    let sarah = &store.conversation("1").unwrap().messages;
    assert_eq!(status_icon(&sarah[0]), None);
    assert_eq!(status_icon(&sarah[1]), Some(StatusIcon::DoubleCheckEmphasized));
    assert_eq!(status_icon(&sarah[3]), Some(StatusIcon::DoubleCheckMuted));
}
