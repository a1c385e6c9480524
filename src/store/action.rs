//! Base trait for plain actions.

/// A plain action: an immutable record describing an intended transition.
///
/// Actions are processed by reducers to produce new states. Thunks are not
/// actions; they go through [`Store::dispatch_thunk`](super::Store::dispatch_thunk).
pub trait Action: Send + Sync + 'static {
    /// The no-op action reduced once at store creation, together with an
    /// absent prior state, to establish every branch's default.
    fn init() -> Self;

    /// Discriminant identifying the kind of this action (e.g. `"CART_ADD"`).
    fn kind(&self) -> &'static str;
}
