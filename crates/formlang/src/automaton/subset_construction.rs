//! Subset construction algorithm for converting ε-NFA to DFA.

use crate::automaton::dfa::{Dfa, DfaBuilder};
use crate::automaton::labels::StateLabels;
use crate::automaton::nfa::Nfa;
use crate::automaton::state::{StateId, StateSet};
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::VecDeque;

/// Convert an epsilon-NFA to a DFA using the powerset construction algorithm.
///
/// Subsets are explored breadth-first from the closure of the start state and
/// numbered in order of discovery, so the result is identical across runs.
/// Empty successor sets are left out: the DFA simply has no transition there.
pub fn subset_construction(nfa: &Nfa) -> Dfa {
    // Each DFA state corresponds to a set of NFA states; its id is its index.
    let mut state_mapping: IndexMap<StateSet, StateId> = IndexMap::new();
    let mut accepting = Vec::new();
    let mut transitions = Vec::new();
    let mut worklist: VecDeque<(StateId, StateSet)> = VecDeque::new();

    let initial_set = nfa.initial_states();
    state_mapping.insert(initial_set.clone(), 0);
    worklist.push_back((0, initial_set));

    while let Some((current_dfa_state, current_nfa_set)) = worklist.pop_front() {
        if nfa.is_accepting(&current_nfa_set) {
            accepting.push(current_dfa_state);
        }

        for &symbol in nfa.alphabet() {
            let next_nfa_set = nfa.step(&current_nfa_set, symbol);

            if next_nfa_set.is_empty() {
                continue;
            }

            let next_dfa_state = if let Some(&existing) = state_mapping.get(&next_nfa_set) {
                existing
            } else {
                let new_state = state_mapping.len() as StateId;
                trace!("subset {next_nfa_set} becomes DFA state {new_state}");
                state_mapping.insert(next_nfa_set.clone(), new_state);
                worklist.push_back((new_state, next_nfa_set));
                new_state
            };

            transitions.push((current_dfa_state, symbol, next_dfa_state));
        }
    }

    debug!(
        "subset construction: {} NFA states -> {} DFA states",
        nfa.num_states(),
        state_mapping.len()
    );

    let mut dfa = DfaBuilder::with_labels(StateLabels::sequential(state_mapping.len()), 0);
    for (source, symbol, destination) in transitions {
        dfa.insert_transition(source, symbol, destination);
    }
    for state in accepting {
        dfa.add_accept_state(state);
    }
    dfa.set_state_mapping(state_mapping.into_keys().collect());

    dfa.build()
}
