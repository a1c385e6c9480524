//! Storefront application state: session, cart and order lifecycle.
//!
//! The root reducer combines three branches:
//!
//! - [`AUTH`]: the logged-in session (kept in memory; the raw token is
//!   stored separately by the [`login`] thunk)
//! - [`CART`]: cart lines, persisted under the configured cart key
//! - [`PROMISE`]: async operation records, persisted under the promise key

mod auth;
mod cart;
mod order;

pub use auth::{
    decode_jwt, login, logout, restore_session, AuthAction, AuthReducer, AuthState, JwtError,
};
pub use cart::{set_count, CartAction, CartLine, CartReducer, CartState, Good};
pub use order::{checkout, Order, OrderError, OrderLedger, NEW_ORDER};

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::StorageConfig;
use crate::persist::{persisted, KeyValueStore};
use crate::promise::{PromiseAction, PromiseActions, PromiseReducer, PromiseState};
use crate::store::{Action, CombineReducers, CombinedState, Store};

pub const AUTH: &str = "auth";
pub const CART: &str = "cart";
pub const PROMISE: &str = "promise";

/// Every action the storefront understands.
#[derive(Debug, Clone, PartialEq)]
pub enum ShopAction {
    Init,
    Auth(AuthAction),
    Cart(CartAction),
    Promise(PromiseAction),
}

impl Action for ShopAction {
    fn init() -> Self {
        ShopAction::Init
    }

    fn kind(&self) -> &'static str {
        match self {
            ShopAction::Init => "@@INIT",
            ShopAction::Auth(action) => action.kind(),
            ShopAction::Cart(action) => action.kind(),
            ShopAction::Promise(_) => crate::promise::PROMISE,
        }
    }
}

impl PromiseActions for ShopAction {
    fn as_promise(&self) -> Option<&PromiseAction> {
        match self {
            ShopAction::Promise(action) => Some(action),
            _ => None,
        }
    }
}

impl From<PromiseAction> for ShopAction {
    fn from(action: PromiseAction) -> Self {
        ShopAction::Promise(action)
    }
}

impl From<AuthAction> for ShopAction {
    fn from(action: AuthAction) -> Self {
        ShopAction::Auth(action)
    }
}

impl From<CartAction> for ShopAction {
    fn from(action: CartAction) -> Self {
        ShopAction::Cart(action)
    }
}

pub type ShopStore = Store<CombinedState, ShopAction>;

/// Root reducer for the storefront.
pub fn shop_reducer(
    storage: Arc<dyn KeyValueStore>,
    config: &StorageConfig,
) -> CombineReducers<ShopAction> {
    CombineReducers::new()
        .branch(AUTH, AuthReducer)
        .branch(
            CART,
            persisted(CartReducer, config.cart_key.clone(), Arc::clone(&storage)),
        )
        .branch(
            PROMISE,
            persisted(
                PromiseReducer::<ShopAction>::new(),
                config.promise_key.clone(),
                storage,
            ),
        )
}

/// Error recorded for operations a previous run left PENDING.
pub const INTERRUPTED: &str = "Interrupted before completion";

/// Build a storefront store over `storage`.
///
/// Operations restored as PENDING cannot still be running, so they are
/// rejected with [`INTERRUPTED`] before the store is handed out.
pub fn shop_store(storage: Arc<dyn KeyValueStore>, config: &StorageConfig) -> ShopStore {
    let store = Store::new(shop_reducer(storage, config));
    let stale: Vec<String> = promises(&store.get_state())
        .map(|records| records.pending().map(str::to_string).collect())
        .unwrap_or_default();
    for name in stale {
        debug!(operation = %name, "settling operation left pending by a previous run");
        let interrupted = Value::String(INTERRUPTED.to_string());
        store.dispatch(PromiseAction::rejected(name, interrupted).into());
    }
    store
}

pub fn auth_state(state: &CombinedState) -> Arc<AuthState> {
    state.get::<AuthState>(AUTH).unwrap_or_default()
}

pub fn cart_state(state: &CombinedState) -> Arc<CartState> {
    state.get::<CartState>(CART).unwrap_or_default()
}

/// Promise branch selector, usable with
/// [`exclusive_promise`](crate::promise::exclusive_promise).
pub fn promises(state: &CombinedState) -> Option<Arc<PromiseState>> {
    state.get::<PromiseState>(PROMISE)
}
