use notifyctl::prelude::CredentialStore;
use std::time::Duration;

#[tokio::test]
async fn file_changes_are_picked_up_without_restart() {
    let dir = tempfile::tempdir().unwrap();
    let credential_path = dir.path().join("slack-webhook");
    std::fs::write(&credential_path, "initial-token\n").unwrap();

    let (store, _watcher) = CredentialStore::watch_dir(dir.path()).unwrap();
    assert_eq!(store.get("slack-webhook").unwrap(), "initial-token");

    std::fs::write(&credential_path, "rotated-token\n").unwrap();

    let mut observed = store.get("slack-webhook");
    for _ in 0..50 {
        if observed.as_deref() == Some("rotated-token") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        observed = store.get("slack-webhook");
    }

    assert_eq!(observed.as_deref(), Some("rotated-token"), "hot reload must land within the debounce bound");
}

#[tokio::test]
async fn empty_credential_directory_leaves_every_ref_unresolvable() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _watcher) = CredentialStore::watch_dir(dir.path()).unwrap();
    assert!(store.get("slack-webhook").is_none());
    assert!(store.require("slack-webhook").is_err());
}
