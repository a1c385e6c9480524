mod common;

use common::{Counter, TestAction};
use fluxstore::store::{reducer_fn, same, Action, CombineReducers, Reducer};
use std::sync::Arc;

fn labels() -> impl Reducer<State = Vec<String>, Action = TestAction> {
    reducer_fn(|state: Option<&Arc<Vec<String>>>, action: &TestAction| {
        let current = state.cloned().unwrap_or_default();
        match action {
            TestAction::Noop => {
                let mut next = Vec::clone(&current);
                next.push("noop".to_string());
                Arc::new(next)
            }
            _ => current,
        }
    })
}

fn root() -> CombineReducers<TestAction> {
    CombineReducers::new()
        .branch("counter", Counter)
        .branch("labels", labels())
}

#[test]
fn test_first_reduce_contains_every_default() {
    let state = root().reduce(None, &TestAction::init());
    assert_eq!(state.len(), 2);
    assert_eq!(state.get::<i64>("counter").map(|c| *c), Some(0));
    assert_eq!(state.get::<Vec<String>>("labels").map(|l| l.len()), Some(0));
}

#[test]
fn test_no_branch_change_returns_same_root() {
    let root = root();
    let state = root.reduce(None, &TestAction::init());
    let next = root.reduce(Some(&state), &TestAction::Init);
    assert!(same(&state, &next));
}

#[test]
fn test_changed_branch_gets_new_root_others_keep_identity() {
    let root = root();
    let state = root.reduce(None, &TestAction::init());
    let next = root.reduce(Some(&state), &TestAction::Inc);

    assert!(!same(&state, &next));
    assert_eq!(next.get::<i64>("counter").map(|c| *c), Some(1));

    let before = state.get::<Vec<String>>("labels").unwrap();
    let after = next.get::<Vec<String>>("labels").unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn test_branch_names_match_registered_names() {
    let state = root().reduce(None, &TestAction::init());
    let names: Vec<&str> = state.names().collect();
    assert_eq!(names, vec!["counter", "labels"]);
}

#[test]
fn test_branches_nest() {
    let inner = CombineReducers::new().branch("counter", Counter);
    let outer = CombineReducers::new()
        .branch("inner", inner)
        .branch("labels", labels());

    let state = outer.reduce(None, &TestAction::init());
    let next = outer.reduce(Some(&state), &TestAction::Noop);
    let inner_before = state.get::<fluxstore::store::CombinedState>("inner").unwrap();
    let inner_after = next.get::<fluxstore::store::CombinedState>("inner").unwrap();
    assert!(Arc::ptr_eq(&inner_before, &inner_after));

    let next = outer.reduce(Some(&next), &TestAction::Inc);
    let inner_after = next.get::<fluxstore::store::CombinedState>("inner").unwrap();
    assert_eq!(inner_after.get::<i64>("counter").map(|c| *c), Some(1));
}
