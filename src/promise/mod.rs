//! Async operation lifecycle.
//!
//! A named asynchronous operation moves through
//! `NotStarted → PENDING → {FULFILLED | REJECTED}`. The [`promise`] thunk
//! drives the transitions by dispatching [`PromiseAction`]s and the
//! [`PromiseReducer`] records the latest one per name in a [`PromiseState`]
//! branch.

mod reducer;
mod thunk;

pub use reducer::PromiseReducer;
pub use thunk::{exclusive_promise, promise, PromiseError, PromiseFuture};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Action;

/// Discriminant shared by every lifecycle action.
pub const PROMISE: &str = "PROMISE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromiseStatus {
    Pending,
    Fulfilled,
    Rejected,
}

/// Snapshot of one operation. A payload exists only once fulfilled, an
/// error only once rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromiseRecord {
    Pending,
    Fulfilled { payload: Value },
    Rejected { error: Value },
}

impl PromiseRecord {
    pub fn status(&self) -> PromiseStatus {
        match self {
            Self::Pending => PromiseStatus::Pending,
            Self::Fulfilled { .. } => PromiseStatus::Fulfilled,
            Self::Rejected { .. } => PromiseStatus::Rejected,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Fulfilled { payload } => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Value> {
        match self {
            Self::Rejected { error } => Some(error),
            _ => None,
        }
    }
}

/// Lifecycle transition for the operation called `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct PromiseAction {
    pub name: String,
    pub record: PromiseRecord,
}

impl PromiseAction {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record: PromiseRecord::Pending,
        }
    }

    pub fn fulfilled(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            record: PromiseRecord::Fulfilled { payload },
        }
    }

    pub fn rejected(name: impl Into<String>, error: Value) -> Self {
        Self {
            name: name.into(),
            record: PromiseRecord::Rejected { error },
        }
    }

    pub fn status(&self) -> PromiseStatus {
        self.record.status()
    }
}

/// Action types able to carry lifecycle transitions.
///
/// Usually implemented by an application action enum with a
/// `Promise(PromiseAction)` variant.
pub trait PromiseActions: Action + From<PromiseAction> {
    fn as_promise(&self) -> Option<&PromiseAction>;
}

/// The promise branch: latest record per operation name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromiseState {
    records: BTreeMap<String, Arc<PromiseRecord>>,
}

impl PromiseState {
    pub fn get(&self, name: &str) -> Option<&PromiseRecord> {
        self.records.get(name).map(|record| &**record)
    }

    pub fn status(&self, name: &str) -> Option<PromiseStatus> {
        self.get(name).map(PromiseRecord::status)
    }

    pub fn is_pending(&self, name: &str) -> bool {
        self.status(name) == Some(PromiseStatus::Pending)
    }

    /// Shared handle to a record; stays pointer-equal until that name
    /// transitions again.
    pub fn record(&self, name: &str) -> Option<&Arc<PromiseRecord>> {
        self.records.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PromiseRecord)> {
        self.records
            .iter()
            .map(|(name, record)| (name.as_str(), &**record))
    }

    /// Names whose latest record is PENDING.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, record)| record.status() == PromiseStatus::Pending)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
