//! The store: state cell, subscriber list and dispatch pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::action::Action;
use super::reducer::Reducer;
use super::state::same;

/// Callback invoked with the new state after every state-changing dispatch.
pub type Listener<S> = Arc<dyn Fn(&Arc<S>) + Send + Sync>;

type Listeners<S> = Mutex<Vec<(u64, Listener<S>)>>;

/// Sole owner of the application state and its change notification.
///
/// `Store` is a cheap handle; clones share the same state cell and
/// subscriber list. Construct one at the application's composition point
/// and pass it to every consumer.
pub struct Store<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    inner: Arc<StoreInner<S, A>>,
}

struct StoreInner<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    reducer: Box<dyn Reducer<State = S, Action = A>>,
    state: Mutex<Arc<S>>,
    listeners: Arc<Listeners<S>>,
    next_listener_id: AtomicU64,
}

impl<S, A> Clone for Store<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    /// Create a store, reducing [`Action::init`] over an absent state to
    /// obtain the initial state.
    pub fn new<R>(reducer: R) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        let initial = reducer.reduce(None, &A::init());
        debug!("store created");
        Self {
            inner: Arc::new(StoreInner {
                reducer: Box::new(reducer),
                state: Mutex::new(initial),
                listeners: Arc::new(Mutex::new(Vec::new())),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// Current state snapshot. Valid until the next state-changing dispatch;
    /// later dispatches never mutate it.
    pub fn get_state(&self) -> Arc<S> {
        Arc::clone(&*self.inner.state.lock())
    }

    /// Register a listener. It stays registered until
    /// [`Subscription::unsubscribe`] is called; dropping the handle does not
    /// remove it.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<S>) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));

        let listeners: Weak<Listeners<S>> = Arc::downgrade(&self.inner.listeners);
        Subscription {
            id,
            detach: Box::new(move |id| {
                if let Some(listeners) = listeners.upgrade() {
                    listeners.lock().retain(|(registered, _)| *registered != id);
                }
            }),
        }
    }

    /// Reduce a plain action.
    ///
    /// Returns `false` when the reducer handed back the current state
    /// unchanged; in that case nothing is stored and nobody is notified.
    /// Otherwise the new state is stored and every listener registered at
    /// this point is called in subscription order with the current state, so
    /// the last notification a listener receives always matches
    /// [`Store::get_state`] even when an earlier listener dispatched again.
    ///
    /// A panicking reducer unwinds out of this call and leaves the state as
    /// it was.
    pub fn dispatch(&self, action: A) -> bool {
        {
            let mut state = self.inner.state.lock();
            let next = self.inner.reducer.reduce(Some(&*state), &action);
            if same(&next, &*state) {
                trace!(action = action.kind(), "state unchanged");
                return false;
            }
            *state = next;
        }

        let listeners: Vec<Listener<S>> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        debug!(
            action = action.kind(),
            listeners = listeners.len(),
            "state changed"
        );
        // Read the cell per call: a listener may have dispatched again.
        for listener in listeners {
            listener(&self.get_state());
        }
        true
    }

    /// Run a thunk with this store and return whatever it returns.
    ///
    /// The thunk may dispatch further actions (they complete, listeners
    /// included, before the call returns) and always sees the latest state
    /// through [`Store::get_state`]. Returning a future lets the caller await
    /// a result that is still pending.
    pub fn dispatch_thunk<T, R>(&self, thunk: T) -> R
    where
        T: FnOnce(&Store<S, A>) -> R,
    {
        thunk(self)
    }
}

/// Handle returned by [`Store::subscribe`].
pub struct Subscription {
    id: u64,
    detach: Box<dyn Fn(u64) + Send + Sync>,
}

impl Subscription {
    /// Registration id, unique per store.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove exactly this registration. Repeat calls are no-ops.
    pub fn unsubscribe(&self) {
        (self.detach)(self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
