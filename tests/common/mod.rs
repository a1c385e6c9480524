//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use fluxstore::persist::MemoryStore;
use fluxstore::promise::{PromiseAction, PromiseActions, PromiseReducer, PromiseState};
use fluxstore::store::{Action, CombineReducers, CombinedState, Reducer, Store};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum TestAction {
    Init,
    Inc,
    Noop,
    Promise(PromiseAction),
}

impl Action for TestAction {
    fn init() -> Self {
        TestAction::Init
    }

    fn kind(&self) -> &'static str {
        match self {
            TestAction::Init => "@@INIT",
            TestAction::Inc => "INC",
            TestAction::Noop => "NOOP",
            TestAction::Promise(_) => fluxstore::promise::PROMISE,
        }
    }
}

impl PromiseActions for TestAction {
    fn as_promise(&self) -> Option<&PromiseAction> {
        match self {
            TestAction::Promise(action) => Some(action),
            _ => None,
        }
    }
}

impl From<PromiseAction> for TestAction {
    fn from(action: PromiseAction) -> Self {
        TestAction::Promise(action)
    }
}

/// Counts INC actions, starting at 0.
pub struct Counter;

impl Reducer for Counter {
    type State = i64;
    type Action = TestAction;

    fn reduce(&self, state: Option<&Arc<i64>>, action: &TestAction) -> Arc<i64> {
        let current = state.cloned().unwrap_or_else(|| Arc::new(0));
        match action {
            TestAction::Inc => Arc::new(*current + 1),
            _ => current,
        }
    }
}

pub type CounterStore = Store<i64, TestAction>;
pub type AppStore = Store<CombinedState, TestAction>;

pub fn counter_store() -> CounterStore {
    Store::new(Counter)
}

/// Store with a `count` branch and a `promise` branch.
pub fn app_store() -> AppStore {
    Store::new(
        CombineReducers::new()
            .branch("count", Counter)
            .branch("promise", PromiseReducer::<TestAction>::new()),
    )
}

pub fn promises(state: &CombinedState) -> Option<Arc<PromiseState>> {
    state.get::<PromiseState>("promise")
}

pub fn count(state: &CombinedState) -> i64 {
    state.get::<i64>("count").map(|count| *count).unwrap_or_default()
}

/// Subscribe a listener that records every state it is handed.
pub fn record_states<S>(store: &Store<S, TestAction>) -> Arc<Mutex<Vec<Arc<S>>>>
where
    S: Send + Sync + 'static,
{
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |state: &Arc<S>| sink.lock().push(Arc::clone(state)));
    seen
}

pub fn memory() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}
