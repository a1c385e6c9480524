//! Unidirectional state container primitives.
//!
//! # Architecture
//!
//! ```text
//! Action ──→ Store::dispatch ──→ Reducer ──→ State ──→ Subscribers
//!   ↑                                                      │
//!   └──────────────────────────────────────────────────────┘
//! ```
//!
//! - **State**: immutable snapshot shared as `Arc<S>`; "unchanged" means pointer-equal
//! - **Action**: plain record describing a transition
//! - **Reducer**: pure function `(Option<&Arc<S>>, &A) -> Arc<S>`
//! - **Thunk**: closure receiving the store, dispatched through [`Store::dispatch_thunk`]

mod action;
mod combine;
mod dispatch;
mod reducer;
mod state;

pub use action::Action;
pub use combine::{CombineReducers, CombinedState};
pub use dispatch::{Listener, Store, Subscription};
pub use reducer::{reducer_fn, FnReducer, Reducer};
pub use state::{same, Branch};
