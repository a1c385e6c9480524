//! Composite reducer over named branches.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::action::Action;
use super::reducer::Reducer;
use super::state::{same, Branch};

/// Root of a composite state tree: branch name → branch value.
///
/// Each branch is owned by exactly one reducer registered in a
/// [`CombineReducers`]. Branch values are shared `Arc`s; cloning a
/// `CombinedState` is a shallow copy.
#[derive(Clone, Default)]
pub struct CombinedState {
    branches: BTreeMap<String, Branch>,
}

impl CombinedState {
    /// Typed access to a branch. `None` if absent or of another type.
    pub fn get<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.branches
            .get(name)
            .and_then(|branch| Arc::clone(branch).downcast::<T>().ok())
    }

    /// Raw access to a branch value.
    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.branches.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

impl std::fmt::Debug for CombinedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.branches.keys()).finish()
    }
}

/// Object-safe view of a branch reducer, erasing its state type.
trait BranchReducer<A>: Send + Sync {
    /// Returns `Some(next)` only when the branch changed (or was absent).
    fn reduce_branch(&self, prior: Option<&Branch>, action: &A) -> Option<Branch>;
}

impl<R: Reducer> BranchReducer<R::Action> for R {
    fn reduce_branch(&self, prior: Option<&Branch>, action: &R::Action) -> Option<Branch> {
        let prior = prior.and_then(|branch| Arc::clone(branch).downcast::<R::State>().ok());
        let next = self.reduce(prior.as_ref(), action);
        match prior {
            Some(prior) if same(&prior, &next) => None,
            _ => Some(next as Branch),
        }
    }
}

/// Merges named branch reducers into one reducer over [`CombinedState`].
///
/// Branches are reduced in registration order. Only branches whose reducer
/// returned a different `Arc` are written into the next composite; if none
/// changed, the input composite is returned as is. A nested
/// `CombineReducers` is itself a valid branch.
pub struct CombineReducers<A> {
    branches: Vec<(String, Box<dyn BranchReducer<A>>)>,
}

impl<A: Action> CombineReducers<A> {
    pub fn new() -> Self {
        Self {
            branches: Vec::new(),
        }
    }

    /// Register `reducer` as the owner of branch `name`.
    ///
    /// Registering an existing name replaces its reducer and keeps its
    /// position.
    pub fn branch<R>(mut self, name: impl Into<String>, reducer: R) -> Self
    where
        R: Reducer<Action = A>,
    {
        let name = name.into();
        let reducer: Box<dyn BranchReducer<A>> = Box::new(reducer);
        match self.branches.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = reducer,
            None => self.branches.push((name, reducer)),
        }
        self
    }
}

impl<A: Action> Default for CombineReducers<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> Reducer for CombineReducers<A> {
    type State = CombinedState;
    type Action = A;

    fn reduce(&self, state: Option<&Arc<CombinedState>>, action: &A) -> Arc<CombinedState> {
        let empty = CombinedState::default();
        let current: &CombinedState = state.map(|s| &**s).unwrap_or(&empty);

        let changed: Vec<(&String, Branch)> = self
            .branches
            .iter()
            .filter_map(|(name, reducer)| {
                reducer
                    .reduce_branch(current.branches.get(name), action)
                    .map(|next| (name, next))
            })
            .collect();

        if changed.is_empty() {
            return match state {
                Some(state) => Arc::clone(state),
                None => Arc::new(empty),
            };
        }

        let mut next = current.clone();
        for (name, branch) in changed {
            next.branches.insert(name.clone(), branch);
        }
        Arc::new(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::reducer_fn;

    enum Op {
        Init,
        Left,
    }

    impl Action for Op {
        fn init() -> Self {
            Op::Init
        }

        fn kind(&self) -> &'static str {
            match self {
                Op::Init => "@@INIT",
                Op::Left => "LEFT",
            }
        }
    }

    fn counter(bump_on_left: bool) -> impl Reducer<State = u8, Action = Op> {
        reducer_fn(move |state: Option<&Arc<u8>>, action: &Op| {
            let current = state.cloned().unwrap_or_default();
            match action {
                Op::Left if bump_on_left => Arc::new(*current + 1),
                _ => current,
            }
        })
    }

    #[test]
    fn first_reduce_populates_every_branch() {
        let root = CombineReducers::new()
            .branch("left", counter(true))
            .branch("right", counter(false));
        let state = root.reduce(None, &Op::Init);
        assert_eq!(state.len(), 2);
        assert_eq!(*state.get::<u8>("left").unwrap(), 0);
        assert_eq!(*state.get::<u8>("right").unwrap(), 0);
    }

    #[test]
    fn untouched_branches_keep_their_arcs() {
        let root = CombineReducers::new()
            .branch("left", counter(true))
            .branch("right", counter(false));
        let before = root.reduce(None, &Op::Init);
        let after = root.reduce(Some(&before), &Op::Left);

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*after.get::<u8>("left").unwrap(), 1);
        assert!(Arc::ptr_eq(
            before.branch("right").unwrap(),
            after.branch("right").unwrap()
        ));
    }

    #[test]
    fn duplicate_branch_name_replaces_reducer() {
        let root = CombineReducers::new()
            .branch("only", counter(false))
            .branch("only", counter(true));
        let state = root.reduce(None, &Op::Init);
        let state = root.reduce(Some(&state), &Op::Left);
        assert_eq!(state.len(), 1);
        assert_eq!(*state.get::<u8>("only").unwrap(), 1);
    }

    #[test]
    fn wrong_type_lookup_is_none() {
        let root = CombineReducers::new().branch("left", counter(true));
        let state = root.reduce(None, &Op::Init);
        assert!(state.get::<String>("left").is_none());
        assert!(state.get::<u8>("missing").is_none());
    }
}
