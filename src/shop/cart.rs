//! Cart branch.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::Reducer;

use super::{cart_state, ShopAction, ShopStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Good {
    pub id: String,
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub good: Good,
    pub count: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 {
        self.good.price * f64::from(self.count)
    }
}

/// Cart lines keyed by good id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    lines: BTreeMap<String, CartLine>,
}

impl CartState {
    pub fn get(&self, id: &str) -> Option<&CartLine> {
        self.lines.get(id)
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of items across all lines.
    pub fn total_count(&self) -> u32 {
        self.lines.values().map(|line| line.count).sum()
    }

    pub fn total_price(&self) -> f64 {
        self.lines.values().map(CartLine::subtotal).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add `count` items, creating the line if needed.
    Add { good: Good, count: u32 },
    /// Remove `count` items; the line disappears at zero.
    Sub { id: String, count: u32 },
    /// Replace the line's count; zero removes the line.
    Set { good: Good, count: u32 },
    Del { id: String },
    Clear,
}

impl CartAction {
    pub fn kind(&self) -> &'static str {
        match self {
            CartAction::Add { .. } => "CART_ADD",
            CartAction::Sub { .. } => "CART_SUB",
            CartAction::Set { .. } => "CART_SET",
            CartAction::Del { .. } => "CART_DEL",
            CartAction::Clear => "CART_CLEAR",
        }
    }
}

pub struct CartReducer;

impl Reducer for CartReducer {
    type State = CartState;
    type Action = ShopAction;

    fn reduce(&self, state: Option<&Arc<CartState>>, action: &ShopAction) -> Arc<CartState> {
        let current = state.cloned().unwrap_or_default();
        let ShopAction::Cart(action) = action else {
            return current;
        };

        match action {
            CartAction::Add { count: 0, .. } => current,
            CartAction::Add { good, count } => {
                let mut next = CartState::clone(&current);
                next.lines
                    .entry(good.id.clone())
                    .and_modify(|line| {
                        line.good = good.clone();
                        line.count = line.count.saturating_add(*count);
                    })
                    .or_insert_with(|| CartLine {
                        good: good.clone(),
                        count: *count,
                    });
                Arc::new(next)
            }
            CartAction::Set { good, count: 0 } => without(current, &good.id),
            CartAction::Set { good, count } => {
                let unchanged = current
                    .get(&good.id)
                    .is_some_and(|line| line.count == *count && line.good == *good);
                if unchanged {
                    return current;
                }
                let mut next = CartState::clone(&current);
                next.lines.insert(
                    good.id.clone(),
                    CartLine {
                        good: good.clone(),
                        count: *count,
                    },
                );
                Arc::new(next)
            }
            CartAction::Sub { count: 0, .. } => current,
            CartAction::Sub { id, count } => {
                let Some(line) = current.get(id) else {
                    return current;
                };
                let remaining = line.count.saturating_sub(*count);
                if remaining == 0 {
                    return without(current, id);
                }
                let mut next = CartState::clone(&current);
                if let Some(line) = next.lines.get_mut(id) {
                    line.count = remaining;
                }
                Arc::new(next)
            }
            CartAction::Del { id } => without(current, id),
            CartAction::Clear if current.is_empty() => current,
            CartAction::Clear => Arc::new(CartState::default()),
        }
    }
}

fn without(current: Arc<CartState>, id: &str) -> Arc<CartState> {
    if !current.lines.contains_key(id) {
        return current;
    }
    let mut next = CartState::clone(&current);
    next.lines.remove(id);
    Arc::new(next)
}

/// Set the count of a good already in the cart, looked up by id.
/// Returns false when the cart has no such line.
pub fn set_count(id: impl Into<String>, count: u32) -> impl FnOnce(&ShopStore) -> bool {
    let id = id.into();
    move |store: &ShopStore| {
        let cart = cart_state(&store.get_state());
        let Some(line) = cart.get(&id) else {
            return false;
        };
        store.dispatch(
            CartAction::Set {
                good: line.good.clone(),
                count,
            }
            .into(),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Action;

    fn apple() -> Good {
        Good {
            id: "apple".to_string(),
            name: "Apple".to_string(),
            price: 1.5,
        }
    }

    fn reduce(state: &Arc<CartState>, action: CartAction) -> Arc<CartState> {
        CartReducer.reduce(Some(state), &action.into())
    }

    fn with_apples(count: u32) -> Arc<CartState> {
        let empty = CartReducer.reduce(None, &ShopAction::init());
        reduce(&empty, CartAction::Add { good: apple(), count })
    }

    #[test]
    fn add_accumulates() {
        let cart = with_apples(2);
        let cart = reduce(&cart, CartAction::Add { good: apple(), count: 3 });
        assert_eq!(cart.get("apple").unwrap().count, 5);
        assert_eq!(cart.total_price(), 7.5);
    }

    #[test]
    fn sub_removes_line_at_zero() {
        let cart = with_apples(2);
        let cart = reduce(
            &cart,
            CartAction::Sub {
                id: "apple".to_string(),
                count: 1,
            },
        );
        assert_eq!(cart.get("apple").unwrap().count, 1);
        let cart = reduce(
            &cart,
            CartAction::Sub {
                id: "apple".to_string(),
                count: 5,
            },
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn no_op_actions_keep_the_same_arc() {
        let cart = with_apples(2);
        let unchanged = [
            CartAction::Add { good: apple(), count: 0 },
            CartAction::Set { good: apple(), count: 2 },
            CartAction::Sub {
                id: "pear".to_string(),
                count: 1,
            },
            CartAction::Del {
                id: "pear".to_string(),
            },
        ];
        for action in unchanged {
            assert!(Arc::ptr_eq(&cart, &reduce(&cart, action)));
        }

        let empty = reduce(&cart, CartAction::Clear);
        assert!(Arc::ptr_eq(&empty, &reduce(&empty, CartAction::Clear)));
    }

    #[test]
    fn set_zero_removes_line() {
        let cart = with_apples(4);
        let cart = reduce(&cart, CartAction::Set { good: apple(), count: 0 });
        assert!(cart.get("apple").is_none());
    }

    #[test]
    fn other_actions_pass_through() {
        let cart = with_apples(1);
        let next = CartReducer.reduce(Some(&cart), &ShopAction::Init);
        assert!(Arc::ptr_eq(&cart, &next));
    }
}
