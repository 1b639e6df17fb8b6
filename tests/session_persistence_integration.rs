mod common;

use dormguide::chat::{ChatController, Conversation, GREETING};
use dormguide::sessions::{DeleteOutcome, SessionStore, DEFAULT_SLOT};
use dormguide::storage::{SlotStorage, SqliteStorage};

use common::FixedService;

fn open_store(db_path: &std::path::Path) -> SessionStore {
    let storage = SqliteStorage::new_with_path(db_path).expect("open sqlite storage");
    SessionStore::open(Box::new(storage), DEFAULT_SLOT)
}

#[tokio::test]
async fn test_sessions_survive_reopening_the_database() {
    let (_storage, tmp) = common::create_temp_storage();
    let db_path = tmp.path().join("sessions.db");

    let service = FixedService::replying("Try Teague Hall.", None);
    let mut chat = ChatController::new(Box::new(service), open_store(&db_path));
    let id = chat.new_chat().unwrap();
    chat.submit("Quiet dorm close to classes").await;
    let expected = chat.conversation().snapshot();
    drop(chat);

    let store = open_store(&db_path);
    assert_eq!(store.sessions().len(), 1);
    let session = store.get(id).expect("session restored");
    assert_eq!(session.messages, expected);
    // Reopening never restores the current selection.
    assert_eq!(store.current_id(), None);
}

/// Two sessions, switch back to the first: its stored snapshot comes back.
#[tokio::test]
async fn test_load_restores_earlier_session_after_reopen() {
    let (_storage, tmp) = common::create_temp_storage();
    let db_path = tmp.path().join("sessions.db");

    let service = FixedService::replying("Hinton James is very social.", None);
    let mut chat = ChatController::new(Box::new(service.clone()), open_store(&db_path));

    let s1 = chat.new_chat().unwrap();
    chat.submit("Very social dorm with lots of people").await;
    let s1_snapshot = chat.conversation().snapshot();

    let s2 = chat.new_chat().unwrap();
    assert_ne!(s1, s2);
    assert_eq!(chat.conversation(), &Conversation::new());
    assert_eq!(chat.conversation().turns()[0].text, GREETING);
    drop(chat);

    let mut chat = ChatController::new(Box::new(service), open_store(&db_path));
    assert_eq!(chat.sessions().sessions()[0].id, s2);
    assert!(chat.load_session(s1));
    assert_eq!(chat.conversation(), &s1_snapshot);
}

#[tokio::test]
async fn test_failed_request_is_still_persisted() {
    let (_storage, tmp) = common::create_temp_storage();
    let db_path = tmp.path().join("sessions.db");

    let mut chat = ChatController::new(
        Box::new(FixedService::unreachable()),
        open_store(&db_path),
    );
    let id = chat.new_chat().unwrap();
    chat.submit("Dorm close to Franklin Street").await;
    drop(chat);

    let store = open_store(&db_path);
    assert_eq!(store.get(id).unwrap().message_count(), 3);
}

#[tokio::test]
async fn test_delete_is_persisted() {
    let (_storage, tmp) = common::create_temp_storage();
    let db_path = tmp.path().join("sessions.db");

    let mut chat = ChatController::new(
        Box::new(FixedService::replying("ok", None)),
        open_store(&db_path),
    );
    let s1 = chat.new_chat().unwrap();
    let s2 = chat.new_chat().unwrap();
    assert_eq!(chat.delete_session(s1), Some(DeleteOutcome::Deleted));
    drop(chat);

    let store = open_store(&db_path);
    let ids: Vec<i64> = store.sessions().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![s2]);
}

#[test]
fn test_corrupt_database_slot_starts_empty() {
    let (storage, tmp) = common::create_temp_storage();
    storage
        .write(DEFAULT_SLOT, "this is not json")
        .expect("write corrupt slot");

    let store = open_store(&tmp.path().join("sessions.db"));
    assert!(store.sessions().is_empty());
}
