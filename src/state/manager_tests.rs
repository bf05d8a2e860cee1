//! Tests for StateManager

use super::*;
use crate::partition::{ContextKey, StreamContext};
use serde_json::json;
use tempfile::tempdir;

fn customer(id: &str) -> ContextKey {
    StreamContext::customer(id).key()
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_new() {
    let manager = StateManager::new("/tmp/test-state.json");
    assert!(!manager.is_in_memory());
    assert_eq!(manager.path().to_str().unwrap(), "/tmp/test-state.json");
}

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
}

#[tokio::test]
async fn test_from_json() {
    let manager = StateManager::from_json(
        r#"{"bookmarks": {"click_view_report": {"partitions": [
            {"context": {"customer_id": "123"}, "replication_key": "date",
             "replication_key_value": "2024-01-03"}
        ]}}}"#,
    )
    .unwrap();

    assert!(manager.is_in_memory());
    assert_eq!(
        manager
            .get_checkpoint("click_view_report", &customer("123"))
            .await,
        Some("2024-01-03".to_string())
    );
    assert!(manager
        .get_checkpoint("click_view_report", &customer("456"))
        .await
        .is_none());
}

#[tokio::test]
async fn test_from_empty_json() {
    let manager = StateManager::from_json("  ").unwrap();
    assert_eq!(manager.to_value().await.unwrap(), json!({"bookmarks": {}}));

    let manager = StateManager::from_json("{}").unwrap();
    assert!(manager.state().await.bookmarks.is_empty());
}

#[test]
fn test_from_invalid_json() {
    assert!(StateManager::from_json("{not json").is_err());
}

// ============================================================================
// Checkpoint Tests
// ============================================================================

#[tokio::test]
async fn test_advance_checkpoint() {
    let manager = StateManager::in_memory();
    let key = customer("1");

    assert!(manager.get_checkpoint("s", &key).await.is_none());
    assert!(manager
        .advance_checkpoint("s", &key, "date", "2024-01-01")
        .await
        .unwrap());
    assert_eq!(
        manager.get_checkpoint("s", &key).await,
        Some("2024-01-01".to_string())
    );
}

#[tokio::test]
async fn test_checkpoint_never_moves_backwards() {
    let manager = StateManager::in_memory();
    let key = customer("1");

    manager
        .advance_checkpoint("s", &key, "date", "2024-01-05")
        .await
        .unwrap();
    let changed = manager
        .advance_checkpoint("s", &key, "date", "2024-01-02")
        .await
        .unwrap();

    assert!(!changed);
    assert_eq!(
        manager.get_checkpoint("s", &key).await,
        Some("2024-01-05".to_string())
    );
}

#[tokio::test]
async fn test_checkpoints_are_isolated_per_context_and_stream() {
    let manager = StateManager::in_memory();

    manager
        .advance_checkpoint("a", &customer("1"), "date", "2024-01-01")
        .await
        .unwrap();
    manager
        .advance_checkpoint("a", &customer("2"), "date", "2024-02-01")
        .await
        .unwrap();
    manager
        .advance_checkpoint("b", &customer("1"), "date", "2024-03-01")
        .await
        .unwrap();

    assert_eq!(
        manager.get_checkpoint("a", &customer("1")).await,
        Some("2024-01-01".to_string())
    );
    assert_eq!(
        manager.get_checkpoint("a", &customer("2")).await,
        Some("2024-02-01".to_string())
    );
    assert_eq!(
        manager.get_checkpoint("b", &customer("1")).await,
        Some("2024-03-01".to_string())
    );
}

#[tokio::test]
async fn test_clone_shares_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();

    clone
        .advance_checkpoint("a", &customer("1"), "date", "2024-01-01")
        .await
        .unwrap();

    assert!(manager.get_checkpoint("a", &customer("1")).await.is_some());
}

// ============================================================================
// File Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_advance_saves_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::new(&path);
    manager
        .advance_checkpoint("s", &customer("9"), "date", "2024-01-07")
        .await
        .unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        saved["bookmarks"]["s"]["partitions"][0]["replication_key_value"],
        json!("2024-01-07")
    );
}

#[tokio::test]
async fn test_from_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let manager = StateManager::from_file(&path).unwrap();
        manager
            .advance_checkpoint("s", &customer("9"), "date", "2024-01-07")
            .await
            .unwrap();
    }

    let manager = StateManager::from_file(&path).unwrap();
    assert_eq!(
        manager.get_checkpoint("s", &customer("9")).await,
        Some("2024-01-07".to_string())
    );
}

#[test]
fn test_from_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let manager = StateManager::from_file(dir.path().join("absent.json")).unwrap();
    assert!(!manager.is_in_memory());
}

#[tokio::test]
async fn test_in_memory_save_is_noop() {
    let manager = StateManager::in_memory();
    manager.save().await.unwrap();
}
