//! Shared state snapshots.

use std::any::Any;
use std::sync::Arc;

/// Type-erased branch value inside a [`CombinedState`](super::CombinedState).
pub type Branch = Arc<dyn Any + Send + Sync>;

/// Returns true when both snapshots are the same allocation.
///
/// This is the store's notion of "unchanged": structural equality is never
/// consulted.
pub fn same<S: ?Sized>(a: &Arc<S>, b: &Arc<S>) -> bool {
    Arc::ptr_eq(a, b)
}
