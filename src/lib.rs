//! Predictable state container with reducer composition, thunks, async
//! operation tracking and persisted branches.

pub mod config;
pub mod logging;
pub mod persist;
pub mod promise;
pub mod shop;
pub mod store;
