use guard_portal_session::{FileStorage, Session, SessionStorage, SessionStore};
use tempfile::tempdir;

#[test]
fn test_file_session_survives_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = SessionStore::new(FileStorage::new(&path));
    store
        .set(Session::new("persisted-token", "guard@example.com"))
        .unwrap();
    assert!(path.exists());

    // A fresh store over the same file behaves like a page reload
    let reloaded = SessionStore::new(FileStorage::new(&path));
    let session = reloaded.get().expect("session should be restored");
    assert_eq!(session.token, "persisted-token");
    assert_eq!(session.account_email, "guard@example.com");
}

#[test]
fn test_clear_removes_persisted_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    let store = SessionStore::new(FileStorage::new(&path));
    store.set(Session::new("tok", "guard@example.com")).unwrap();
    store.clear().unwrap();

    assert!(!path.exists());
    assert!(store.get().is_none());
    assert!(SessionStore::new(FileStorage::new(&path)).get().is_none());
}

#[test]
fn test_clear_without_session_is_ok() {
    let dir = tempdir().unwrap();
    let store = SessionStore::new(FileStorage::new(dir.path().join("none.json")));
    assert!(store.clear().is_ok());
}

#[test]
fn test_corrupt_file_reads_as_unauthenticated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, b"{not json").unwrap();

    let store = SessionStore::new(FileStorage::new(&path));
    assert!(!store.is_authenticated());
}

#[test]
fn test_file_storage_round_trip_uses_camel_case() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("session.json"));
    storage.save(&Session::new("t", "a@b.c")).unwrap();

    let raw = std::fs::read_to_string(storage.path()).unwrap();
    assert!(raw.contains("\"accountEmail\""));
    assert_eq!(storage.load().unwrap(), Some(Session::new("t", "a@b.c")));
}
