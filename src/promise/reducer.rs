//! Reducer for the promise branch.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::store::Reducer;

use super::{PromiseActions, PromiseState};

/// Records every lifecycle transition under its operation name.
///
/// A transition replaces the whole record for that name; the previous
/// status, payload or error is discarded. Records of other names keep their
/// `Arc`s. Actions without a lifecycle transition leave the branch as is.
pub struct PromiseReducer<A> {
    _marker: PhantomData<fn() -> A>,
}

impl<A> PromiseReducer<A> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A> Default for PromiseReducer<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PromiseActions> Reducer for PromiseReducer<A> {
    type State = PromiseState;
    type Action = A;

    fn reduce(&self, state: Option<&Arc<PromiseState>>, action: &A) -> Arc<PromiseState> {
        let Some(transition) = action.as_promise() else {
            return state.cloned().unwrap_or_default();
        };

        let mut next = state.map(|s| PromiseState::clone(s)).unwrap_or_default();
        next.records
            .insert(transition.name.clone(), Arc::new(transition.record.clone()));
        Arc::new(next)
    }
}
