//! `StateRegistry`: the bijective state to `StateHandle` mapping for one task.
//!
//! The registry proves the bijection. Handles are allocated append-only in
//! first-seen order and never remapped, so a handle stays valid for the
//! whole run.
//!
//! Interning goes through a `RefCell` because successor generation happens
//! behind `&self` ([`crate::TransitionSystem::successor`]). The search is
//! single-threaded and the registry is `!Sync`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;

use crate::handle::StateHandle;

/// Error type for registry construction and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A state was listed more than once in a pre-built registry.
    #[error("state listed twice (first at {first}, again at position {position})")]
    DuplicateState { first: StateHandle, position: usize },
    /// More states than `u32` handles.
    #[error("state registry is full ({len} states)")]
    Exhausted { len: usize },
}

#[derive(Debug)]
struct Tables<S> {
    states: Vec<S>,
    handles: HashMap<S, StateHandle>,
}

/// Interning table for concrete states.
#[derive(Debug)]
pub struct StateRegistry<S> {
    tables: RefCell<Tables<S>>,
}

impl<S: Clone + Eq + Hash> StateRegistry<S> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RefCell::new(Tables {
                states: Vec::new(),
                handles: HashMap::new(),
            }),
        }
    }

    /// Create a registry from a fixed list of states; handle `i` is `states[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateState`] if the bijection is violated.
    pub fn from_states(states: Vec<S>) -> Result<Self, RegistryError> {
        let registry = Self::new();
        for (position, state) in states.into_iter().enumerate() {
            if let Some(first) = registry.handle_of(&state) {
                return Err(RegistryError::DuplicateState { first, position });
            }
            registry.intern(state)?;
        }
        Ok(registry)
    }

    /// Return the handle for `state`, allocating one on first sight.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Exhausted`] once `u32::MAX` states exist.
    pub fn intern(&self, state: S) -> Result<StateHandle, RegistryError> {
        let mut tables = self.tables.borrow_mut();
        if let Some(&handle) = tables.handles.get(&state) {
            return Ok(handle);
        }
        let len = tables.states.len();
        let index = u32::try_from(len).map_err(|_| RegistryError::Exhausted { len })?;
        let handle = StateHandle::new(index);
        tables.states.push(state.clone());
        tables.handles.insert(state, handle);
        Ok(handle)
    }

    /// Look up the handle of an already interned state.
    #[must_use]
    pub fn handle_of(&self, state: &S) -> Option<StateHandle> {
        self.tables.borrow().handles.get(state).copied()
    }

    /// Clone out the state behind `handle`.
    #[must_use]
    pub fn lookup(&self, handle: StateHandle) -> Option<S> {
        self.tables.borrow().states.get(handle.index()).cloned()
    }

    /// Run `f` on the state behind `handle` without cloning it.
    pub fn with_state<R>(&self, handle: StateHandle, f: impl FnOnce(&S) -> R) -> Option<R> {
        self.tables.borrow().states.get(handle.index()).map(f)
    }

    /// Number of interned states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.borrow().states.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Clone + Eq + Hash> Default for StateRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
