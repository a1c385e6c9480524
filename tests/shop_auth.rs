mod common;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common::memory;
use fluxstore::config::StorageConfig;
use fluxstore::persist::KeyValueStore;
use fluxstore::shop::{auth_state, login, logout, restore_session, shop_store};
use serde_json::{json, Value};

fn token_for(payload: &Value) -> String {
    format!(
        "eyJhbGciOiJIUzI1NiJ9.{}.sig",
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

#[test]
fn test_login_stores_token_and_decodes_subject() {
    let storage = memory();
    let store = shop_store(storage.clone(), &StorageConfig::default());
    let token = token_for(&json!({"sub": {"login": "anna"}}));

    assert!(store.dispatch_thunk(login(token.clone(), storage.clone(), "authToken")));

    let auth = auth_state(&store.get_state());
    assert!(auth.is_logged_in());
    assert_eq!(auth.subject(), Some(&json!({"login": "anna"})));
    assert_eq!(storage.get("authToken"), Some(token.clone()));

    assert!(!store.dispatch_thunk(login(token, storage, "authToken")));
}

#[test]
fn test_bad_token_is_not_stored() {
    let storage = memory();
    let store = shop_store(storage.clone(), &StorageConfig::default());

    assert!(!store.dispatch_thunk(login("not-a-jwt", storage.clone(), "authToken")));
    assert!(!auth_state(&store.get_state()).is_logged_in());
    assert_eq!(storage.get("authToken"), None);
}

#[test]
fn test_session_restores_from_storage() {
    let storage = memory();
    let config = StorageConfig::default();
    let token = token_for(&json!({"sub": "anna"}));

    let first = shop_store(storage.clone(), &config);
    first.dispatch_thunk(login(token, storage.clone(), config.token_key.clone()));

    let second = shop_store(storage.clone(), &config);
    assert!(!auth_state(&second.get_state()).is_logged_in());
    assert!(second.dispatch_thunk(restore_session(storage, config.token_key.clone())));
    assert_eq!(
        auth_state(&second.get_state()).subject(),
        Some(&json!("anna"))
    );
}

#[test]
fn test_logout_forgets_token() {
    let storage = memory();
    let store = shop_store(storage.clone(), &StorageConfig::default());
    let token = token_for(&json!({"sub": "anna"}));
    store.dispatch_thunk(login(token, storage.clone(), "authToken"));

    store.dispatch_thunk(logout(storage.clone(), "authToken"));
    assert!(!auth_state(&store.get_state()).is_logged_in());
    assert_eq!(storage.get("authToken"), None);

    assert!(!store.dispatch_thunk(restore_session(storage, "authToken")));
}
