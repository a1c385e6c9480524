mod common;

use common::memory;
use fluxstore::config::StorageConfig;
use fluxstore::persist::KeyValueStore;
use fluxstore::shop::{cart_state, set_count, shop_store, CartAction, CartState, Good};
use fluxstore::store::same;

fn good(id: &str, price: f64) -> Good {
    Good {
        id: id.to_string(),
        name: id.to_uppercase(),
        price,
    }
}

#[test]
fn test_cart_edits_flow_through_store() {
    let storage = memory();
    let store = shop_store(storage.clone(), &StorageConfig::default());

    store.dispatch(CartAction::Add { good: good("tea", 3.0), count: 2 }.into());
    store.dispatch(CartAction::Add { good: good("cake", 4.5), count: 1 }.into());
    store.dispatch(
        CartAction::Sub {
            id: "tea".to_string(),
            count: 1,
        }
        .into(),
    );

    let cart = cart_state(&store.get_state());
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total_count(), 2);
    assert_eq!(cart.total_price(), 7.5);
}

#[test]
fn test_cart_is_persisted_under_configured_key() {
    let storage = memory();
    let config = StorageConfig {
        cart_key: "basket".to_string(),
        ..StorageConfig::default()
    };
    let store = shop_store(storage.clone(), &config);
    store.dispatch(CartAction::Add { good: good("tea", 3.0), count: 2 }.into());

    let saved: CartState = serde_json::from_str(&storage.get("basket").unwrap()).unwrap();
    assert_eq!(saved.get("tea").unwrap().count, 2);
    assert_eq!(storage.get("cart"), None);

    let reopened = shop_store(storage, &config);
    assert_eq!(*cart_state(&reopened.get_state()), saved);
}

#[test]
fn test_set_count_thunk() {
    let store = shop_store(memory(), &StorageConfig::default());
    store.dispatch(CartAction::Add { good: good("tea", 3.0), count: 1 }.into());

    assert!(store.dispatch_thunk(set_count("tea", 5)));
    assert_eq!(cart_state(&store.get_state()).get("tea").unwrap().count, 5);

    assert!(!store.dispatch_thunk(set_count("coffee", 1)));

    assert!(store.dispatch_thunk(set_count("tea", 0)));
    assert!(cart_state(&store.get_state()).is_empty());
}

#[test]
fn test_noop_cart_actions_do_not_change_root() {
    let store = shop_store(memory(), &StorageConfig::default());
    let before = store.get_state();
    assert!(!store.dispatch(CartAction::Clear.into()));
    assert!(!store.dispatch(
        CartAction::Del {
            id: "missing".to_string()
        }
        .into()
    ));
    assert!(same(&before, &store.get_state()));
}
