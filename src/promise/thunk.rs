//! Thunks driving the async lifecycle.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::store::Store;

use super::{PromiseAction, PromiseActions, PromiseState};

/// Result of a lifecycle thunk: the payload once fulfilled, `None` once
/// rejected.
pub type PromiseFuture<T> = Pin<Box<dyn Future<Output = Option<T>> + Send + 'static>>;

#[derive(Debug, Error)]
pub enum PromiseError {
    #[error("Operation '{name}' is already in flight")]
    InFlight { name: String },
}

/// Build a thunk tracking `operation` under `name`.
///
/// Running the thunk dispatches PENDING right away and returns a future.
/// When `operation` settles, the future dispatches exactly one of
/// FULFILLED (payload converted to JSON) or REJECTED (error message) and
/// resolves to `Some(payload)` or `None` respectively. Failures are never
/// re-raised; read the promise branch to tell them apart from success.
///
/// Two overlapping runs under the same name are not ordered: the last
/// terminal transition to land wins. Use [`exclusive_promise`] to refuse
/// overlap instead.
pub fn promise<S, A, F, T, E>(
    name: impl Into<String>,
    operation: F,
) -> impl FnOnce(&Store<S, A>) -> PromiseFuture<T>
where
    S: Send + Sync + 'static,
    A: PromiseActions,
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Serialize + Send + 'static,
    E: Display + Send + 'static,
{
    let name = name.into();
    move |store: &Store<S, A>| -> PromiseFuture<T> {
        store.dispatch(A::from(PromiseAction::pending(name.clone())));
        let store = store.clone();
        Box::pin(async move {
            let (transition, result) = match operation.await {
                Ok(payload) => match serde_json::to_value(&payload) {
                    Ok(value) => (PromiseAction::fulfilled(name, value), Some(payload)),
                    Err(err) => {
                        warn!(operation = %name, error = %err, "payload not representable as JSON");
                        (rejection(name, &err), None)
                    }
                },
                Err(err) => {
                    debug!(operation = %name, error = %err, "operation rejected");
                    (rejection(name, &err), None)
                }
            };
            store.dispatch(A::from(transition));
            result
        })
    }
}

/// Like [`promise`], but refuses to start while `name` is already PENDING.
///
/// `select` locates the promise branch inside the root state. When the
/// operation is in flight the thunk returns [`PromiseError::InFlight`] and
/// dispatches nothing; `operation` is dropped without being polled.
///
/// A PENDING record restored from persisted state blocks the name just like
/// a live one. Settle such records at startup (the storefront does so in
/// [`shop_store`](crate::shop::shop_store)) before relying on this check.
pub fn exclusive_promise<S, A, P, F, T, E>(
    name: impl Into<String>,
    select: P,
    operation: F,
) -> impl FnOnce(&Store<S, A>) -> Result<PromiseFuture<T>, PromiseError>
where
    S: Send + Sync + 'static,
    A: PromiseActions,
    P: FnOnce(&S) -> Option<Arc<PromiseState>>,
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Serialize + Send + 'static,
    E: Display + Send + 'static,
{
    let name = name.into();
    move |store: &Store<S, A>| -> Result<PromiseFuture<T>, PromiseError> {
        let in_flight =
            select(&*store.get_state()).is_some_and(|promises| promises.is_pending(&name));
        if in_flight {
            debug!(operation = %name, "operation already in flight");
            return Err(PromiseError::InFlight { name });
        }
        Ok(promise(name, operation)(store))
    }
}

fn rejection(name: String, error: &dyn Display) -> PromiseAction {
    PromiseAction::rejected(name, Value::String(error.to_string()))
}
