//! Deterministic Finite Automaton (DFA) implementation with Hopcroft minimization.

use crate::automaton::equivalence;
use crate::automaton::labels::StateLabels;
use crate::automaton::nfa::{Nfa, NfaBuilder};
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{Symbol, is_input_char};
use crate::error::ValidationError;
use log::{debug, trace};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// A Deterministic Finite Automaton.
///
/// Transitions are partial: a missing transition rejects the input. No sink
/// state is ever materialized.
#[derive(Debug, Clone)]
pub struct Dfa {
    /// Number of states
    num_states: StateId,
    start_state: StateId,
    /// Final (accepting) states
    accept_states: StateSet,
    /// Transitions: (source, symbol) -> destination
    transitions: HashMap<(StateId, char), StateId>,
    /// All symbols used
    alphabet: BTreeSet<char>,
    /// Mapping from DFA states to original NFA states (if created via subset construction)
    state_mapping: Option<Vec<StateSet>>,
    labels: StateLabels,
}

/// Incremental construction of a [`Dfa`].
#[derive(Debug, Clone)]
pub struct DfaBuilder {
    num_states: StateId,
    start_state: StateId,
    accept_states: StateSet,
    transitions: HashMap<(StateId, char), StateId>,
    state_mapping: Option<Vec<StateSet>>,
    labels: StateLabels,
}

impl DfaBuilder {
    /// Create a builder holding a single state, the start state, labelled `start_label`.
    pub fn new(start_label: &str) -> Self {
        let mut labels = StateLabels::new();
        labels.get_or_create(start_label);
        Self {
            num_states: 1,
            start_state: 0,
            accept_states: StateSet::with_capacity(16),
            transitions: HashMap::new(),
            state_mapping: None,
            labels,
        }
    }

    pub(crate) fn with_labels(labels: StateLabels, start_state: StateId) -> Self {
        let mut builder = Self {
            num_states: labels.len() as StateId,
            start_state,
            accept_states: StateSet::with_capacity(labels.len()),
            transitions: HashMap::new(),
            state_mapping: None,
            labels,
        };
        builder.ensure_state(start_state);
        builder
    }

    fn ensure_state(&mut self, state: StateId) {
        while self.num_states <= state {
            let label = self.labels.fresh(&self.num_states.to_string());
            self.labels.get_or_create(&label);
            self.num_states += 1;
        }
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self) -> StateId {
        let state = self.num_states;
        self.ensure_state(state);
        state
    }

    /// Get the state labelled `label`, creating it if it does not exist yet.
    pub fn add_labeled_state(&mut self, label: &str) -> StateId {
        let state = self.labels.get_or_create(label);
        self.num_states = self.num_states.max(state + 1);
        state
    }

    pub fn state(&self, label: &str) -> Option<StateId> {
        self.labels.id(label)
    }

    pub fn set_start_state(&mut self, state: StateId) {
        self.ensure_state(state);
        self.start_state = state;
    }

    /// Add a transition, replacing any previous destination of `(source, symbol)`.
    ///
    /// Reserved characters are rejected, as for [`NfaBuilder::add_transition`].
    pub fn add_transition(
        &mut self,
        source: StateId,
        symbol: char,
        destination: StateId,
    ) -> Result<(), ValidationError> {
        if !is_input_char(symbol) {
            return Err(ValidationError::InvalidSymbol {
                state: self.labels.display(source),
                symbol: symbol.to_string(),
            });
        }
        self.insert_transition(source, symbol, destination);
        Ok(())
    }

    pub(crate) fn insert_transition(&mut self, source: StateId, symbol: char, destination: StateId) {
        self.ensure_state(source);
        self.ensure_state(destination);
        self.transitions.insert((source, symbol), destination);
    }

    /// Add a final (accepting) state.
    pub fn add_accept_state(&mut self, state: StateId) {
        self.ensure_state(state);
        self.accept_states.insert(state);
    }

    pub(crate) fn set_state_mapping(&mut self, mapping: Vec<StateSet>) {
        self.state_mapping = Some(mapping);
    }

    pub fn build(self) -> Dfa {
        let alphabet = self.transitions.keys().map(|&(_, symbol)| symbol).collect();

        Dfa {
            num_states: self.num_states,
            start_state: self.start_state,
            accept_states: self.accept_states,
            transitions: self.transitions,
            alphabet,
            state_mapping: self.state_mapping,
            labels: self.labels,
        }
    }
}

impl Dfa {
    /// Start building a DFA whose start state is labelled `start_label`.
    pub fn builder(start_label: &str) -> DfaBuilder {
        DfaBuilder::new(start_label)
    }

    /// Get the number of states.
    pub fn num_states(&self) -> StateId {
        self.num_states
    }

    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    pub fn accept_states(&self) -> &StateSet {
        &self.accept_states
    }

    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    pub fn labels(&self) -> &StateLabels {
        &self.labels
    }

    pub fn label(&self, state: StateId) -> String {
        self.labels.display(state)
    }

    /// The NFA states a state of this DFA stands for, when it was built by
    /// subset construction.
    pub fn subset(&self, state: StateId) -> Option<&StateSet> {
        self.state_mapping.as_ref()?.get(state as usize)
    }

    /// The unique destination of `state` on `symbol`, or `None` when the
    /// transition is undefined.
    pub fn run(&self, symbol: char, state: StateId) -> Option<StateId> {
        self.transitions.get(&(state, symbol)).copied()
    }

    /// Whether `input` leads from the start to an accepting state. An undefined
    /// transition rejects immediately.
    pub fn accepts(&self, input: &str) -> bool {
        input
            .chars()
            .try_fold(self.start_state, |state, c| self.run(c, state))
            .is_some_and(|state| self.accept_states.contains(state))
    }

    /// All transitions as `(source, symbol, destination)`, sorted.
    pub fn edges(&self) -> Vec<(StateId, char, StateId)> {
        let mut edges: Vec<_> = self
            .transitions
            .iter()
            .map(|(&(src, sym), &dst)| (src, sym, dst))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Check if the DFA is empty (accepts no strings).
    pub fn is_empty(&self) -> bool {
        self.find_reachable_states()
            .intersection(&self.accept_states)
            .is_empty()
    }

    /// The shortest word accepted by exactly one of the two automata, if any.
    pub fn distinguishing_word(&self, other: &Dfa) -> Option<String> {
        equivalence::distinguishing_word(self, other)
    }

    pub fn is_equivalent(&self, other: &Dfa) -> bool {
        self.distinguishing_word(other).is_none()
    }

    /// View this DFA as an NFA with singleton destination sets.
    pub fn to_nfa(&self) -> Nfa {
        let mut nfa = NfaBuilder::with_labels(self.labels.clone(), self.start_state);
        for (src, symbol, dst) in self.edges() {
            nfa.add_symbol_transition(src, Symbol::Char(symbol), dst);
        }
        for state in self.accept_states.iter() {
            nfa.add_accept_state(state);
        }
        nfa.build()
    }

    /// Minimize the DFA using Hopcroft's algorithm.
    ///
    /// Unreachable states are discarded first. Undefined transitions lead to a
    /// virtual non-accepting sink during refinement; the sink's block (and so
    /// every state that can never accept) is left out of the result. Output
    /// states are numbered breadth-first from the start. A DFA accepting nothing
    /// minimizes to a single non-accepting state.
    pub fn minimized(&self) -> Dfa {
        let reachable = self.find_reachable_states();
        let sink = self.num_states;

        // Reverse transitions over the reachable states, completed with the sink
        let mut reverse_transitions: HashMap<(StateId, char), StateSet> = HashMap::new();
        for state in reachable.iter().chain(std::iter::once(sink)) {
            for &symbol in &self.alphabet {
                let dest = self.run(symbol, state).unwrap_or(sink);
                reverse_transitions
                    .entry((dest, symbol))
                    .or_default()
                    .insert(state);
            }
        }

        // Initial partition: final states and non-final states
        let final_reachable = self.accept_states.intersection(&reachable);
        let mut non_final_reachable = reachable.difference(&self.accept_states);
        non_final_reachable.insert(sink);

        let mut partitions: Vec<StateSet> = [final_reachable, non_final_reachable]
            .into_iter()
            .filter(|block| !block.is_empty())
            .collect();

        // Worklist of (partition_index, symbol) pairs to process
        let mut worklist: VecDeque<(usize, char)> = (0..partitions.len())
            .flat_map(|idx| self.alphabet.iter().map(move |&symbol| (idx, symbol)))
            .collect();

        while let Some((splitter_idx, symbol)) = worklist.pop_front() {
            let splitter = partitions[splitter_idx].clone();
            let predecessors = find_predecessors(&reverse_transitions, &splitter, symbol);

            if predecessors.is_empty() {
                continue;
            }

            let mut splits = Vec::new();
            for (part_idx, partition) in partitions.iter().enumerate() {
                let intersection = partition.intersection(&predecessors);
                let difference = partition.difference(&predecessors);

                if !intersection.is_empty() && !difference.is_empty() {
                    // Keep the larger part in place, queue the smaller one
                    let (keep, add) = if intersection.len() <= difference.len() {
                        (difference, intersection)
                    } else {
                        (intersection, difference)
                    };
                    splits.push((part_idx, keep, add));
                }
            }

            for (part_idx, keep, add) in splits {
                trace!("split block {part_idx} into {keep} and {add} on {symbol:?}");
                let new_idx = partitions.len();
                partitions[part_idx] = keep;
                partitions.push(add);
                worklist.extend(self.alphabet.iter().map(|&sym| (new_idx, sym)));
            }
        }

        let minimized = self.build_minimized_dfa(&partitions, sink);
        debug!(
            "minimized DFA: {} states -> {} states",
            self.num_states, minimized.num_states
        );
        minimized
    }

    /// Find all states reachable from the start state.
    fn find_reachable_states(&self) -> StateSet {
        let mut reachable = StateSet::with_capacity(self.num_states as usize);
        let mut queue = VecDeque::from([self.start_state]);

        while let Some(state) = queue.pop_front() {
            if !reachable.insert(state) {
                continue;
            }

            for &symbol in &self.alphabet {
                if let Some(next) = self.run(symbol, state) {
                    if !reachable.contains(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        reachable
    }

    /// Build a minimized DFA from partitions, leaving out the block of `sink`.
    fn build_minimized_dfa(&self, partitions: &[StateSet], sink: StateId) -> Dfa {
        let mut block_of: Vec<Option<usize>> = vec![None; sink as usize + 1];
        for (part_idx, partition) in partitions.iter().enumerate() {
            for state in partition.iter() {
                block_of[state as usize] = Some(part_idx);
            }
        }
        let sink_block = block_of[sink as usize];
        let start_block = block_of[self.start_state as usize];

        // Number the live blocks breadth-first from the start block
        let mut new_id: HashMap<usize, StateId> = HashMap::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        if let Some(start_block) = start_block.filter(|&block| Some(block) != sink_block) {
            new_id.insert(start_block, 0);
            queue.push_back(start_block);
        }

        let mut edges = Vec::new();
        while let Some(block) = queue.pop_front() {
            order.push(block);
            let Some(representative) = partitions[block].first() else {
                continue;
            };

            for &symbol in &self.alphabet {
                let Some(dest_block) = self
                    .run(symbol, representative)
                    .and_then(|dest| block_of[dest as usize])
                    .filter(|&dest_block| Some(dest_block) != sink_block)
                else {
                    continue;
                };

                let next = new_id.len() as StateId;
                let dest = *new_id.entry(dest_block).or_insert_with(|| {
                    queue.push_back(dest_block);
                    next
                });
                edges.push((new_id[&block], symbol, dest));
            }
        }

        let mut minimized = DfaBuilder::with_labels(StateLabels::sequential(order.len().max(1)), 0);
        for (src, symbol, dst) in edges {
            minimized.insert_transition(src, symbol, dst);
        }
        for (new, &block) in order.iter().enumerate() {
            if partitions[block].intersects(&self.accept_states) {
                minimized.add_accept_state(new as StateId);
            }
        }

        // Carry the NFA subsets over to the merged states
        if let Some(orig_mapping) = &self.state_mapping {
            let mapping = if order.is_empty() {
                vec![self.subset(self.start_state).cloned().unwrap_or_default()]
            } else {
                order
                    .iter()
                    .map(|&block| {
                        let mut nfa_states = StateSet::default();
                        for state in partitions[block].iter() {
                            if let Some(states) = orig_mapping.get(state as usize) {
                                nfa_states.union_with(states);
                            }
                        }
                        nfa_states
                    })
                    .collect()
            };
            minimized.set_state_mapping(mapping);
        }

        minimized.build()
    }
}

/// Find all states that can reach the target set on a given symbol.
fn find_predecessors(
    reverse_transitions: &HashMap<(StateId, char), StateSet>,
    targets: &StateSet,
    symbol: char,
) -> StateSet {
    let mut predecessors = StateSet::default();

    for target in targets.iter() {
        if let Some(sources) = reverse_transitions.get(&(target, symbol)) {
            predecessors.union_with(sources);
        }
    }

    predecessors
}
