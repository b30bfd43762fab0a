//! Append-only state interning table.

use std::collections::HashMap;
use std::ops::Index;
use trajseg_common::StateId;

use super::State;

/// Bidirectional mapping between states and dense ids.
///
/// Ids are assigned in first-seen order starting at 0 and never reused.
#[derive(Debug, Clone, Default)]
pub struct StateInterner {
    states: Vec<State>,
    ids: HashMap<State, StateId>,
}

impl StateInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `state`, assigning the next id on first encounter.
    pub fn intern(&mut self, state: State) -> StateId {
        if let Some(&id) = self.ids.get(&state) {
            return id;
        }
        let id = StateId(self.states.len() as u32);
        self.states.push(state);
        self.ids.insert(state, id);
        id
    }

    pub fn get(&self, state: &State) -> Option<StateId> {
        self.ids.get(state).copied()
    }

    pub fn resolve(&self, id: StateId) -> Option<&State> {
        self.states.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All `(id, state)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &State)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateId(i as u32), s))
    }
}

impl Index<StateId> for StateInterner {
    type Output = State;

    fn index(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }
}
