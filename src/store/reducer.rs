//! Reducer trait for the state container.

use std::marker::PhantomData;
use std::sync::Arc;

use super::action::Action;

/// Reducer transforms state based on actions.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure, total function: `(Option<State>, Action) -> State`.
///
/// `state` is `None` exactly once per branch, when the store is created; the
/// reducer must then return its default. For an action it does not handle,
/// the reducer must return the input `Arc` itself (`Arc::clone(state)`), not
/// an equal copy, or the store will treat the dispatch as a change.
pub trait Reducer: Send + Sync + 'static {
    /// The state type this reducer operates on.
    type State: Send + Sync + 'static;

    /// The action type this reducer handles.
    type Action: Action;

    /// Process an action and return the next state.
    fn reduce(&self, state: Option<&Arc<Self::State>>, action: &Self::Action)
        -> Arc<Self::State>;
}

/// Reducer backed by a plain function or closure.
pub struct FnReducer<S, A, F> {
    f: F,
    _marker: PhantomData<fn() -> (S, A)>,
}

/// Wrap a closure as a [`Reducer`].
///
/// ```
/// use std::sync::Arc;
/// use fluxstore::store::{reducer_fn, Reducer};
/// # use fluxstore::store::Action;
/// # enum Counter { Init, Inc }
/// # impl Action for Counter {
/// #     fn init() -> Self { Counter::Init }
/// #     fn kind(&self) -> &'static str { "COUNTER" }
/// # }
///
/// let counter = reducer_fn(|state: Option<&Arc<i64>>, action: &Counter| {
///     let current = state.cloned().unwrap_or_default();
///     match action {
///         Counter::Inc => Arc::new(*current + 1),
///         _ => current,
///     }
/// });
/// let initial = counter.reduce(None, &Counter::Init);
/// assert_eq!(*counter.reduce(Some(&initial), &Counter::Inc), 1);
/// ```
pub fn reducer_fn<S, A, F>(f: F) -> FnReducer<S, A, F>
where
    S: Send + Sync + 'static,
    A: Action,
    F: Fn(Option<&Arc<S>>, &A) -> Arc<S> + Send + Sync + 'static,
{
    FnReducer {
        f,
        _marker: PhantomData,
    }
}

impl<S, A, F> Reducer for FnReducer<S, A, F>
where
    S: Send + Sync + 'static,
    A: Action,
    F: Fn(Option<&Arc<S>>, &A) -> Arc<S> + Send + Sync + 'static,
{
    type State = S;
    type Action = A;

    fn reduce(&self, state: Option<&Arc<S>>, action: &A) -> Arc<S> {
        (self.f)(state, action)
    }
}
