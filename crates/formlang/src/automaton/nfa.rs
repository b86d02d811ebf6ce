//! Epsilon non-deterministic finite automaton (ε-NFA).

use crate::automaton::dfa::Dfa;
use crate::automaton::equivalence;
use crate::automaton::labels::StateLabels;
use crate::automaton::simulation::Simulation;
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::subset_construction::subset_construction;
use crate::automaton::symbol::{Symbol, is_input_char};
use crate::error::ValidationError;
use indexmap::IndexMap;
use log::debug;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// An epsilon non-deterministic finite automaton.
///
/// States are numbered `0..num_states`. Every state carries a display label;
/// the labels are only consulted at the snapshot boundary and never by the
/// algorithms. An `Nfa` is immutable once built: every transformation returns
/// a new automaton.
#[derive(Debug, Clone)]
pub struct Nfa {
    /// Number of states (states are numbered 0..num_states)
    num_states: StateId,
    start_state: StateId,
    accept_states: StateSet,
    /// Transitions: (source, symbol) -> set of destination states.
    /// Destination sets are never empty.
    transitions: HashMap<(StateId, Symbol), StateSet>,
    /// All symbols used (excluding epsilon)
    alphabet: BTreeSet<char>,
    labels: StateLabels,
}

/// Incremental construction of an [`Nfa`].
///
/// Referring to a state id past the current count creates every state up to
/// it, each labelled with its id.
#[derive(Debug, Clone)]
pub struct NfaBuilder {
    num_states: StateId,
    start_state: StateId,
    accept_states: StateSet,
    transitions: HashMap<(StateId, Symbol), StateSet>,
    labels: StateLabels,
}

impl NfaBuilder {
    /// Create a builder holding a single state, the start state, labelled `start_label`.
    pub fn new(start_label: &str) -> Self {
        let mut labels = StateLabels::new();
        labels.get_or_create(start_label);
        Self {
            num_states: 1,
            start_state: 0,
            accept_states: StateSet::with_capacity(16),
            transitions: HashMap::new(),
            labels,
        }
    }

    /// Create a builder whose states are exactly the ones named in `labels`.
    pub(crate) fn with_labels(labels: StateLabels, start_state: StateId) -> Self {
        let mut builder = Self {
            num_states: labels.len() as StateId,
            start_state,
            accept_states: StateSet::with_capacity(labels.len()),
            transitions: HashMap::new(),
            labels,
        };
        builder.ensure_state(start_state);
        builder
    }

    /// Ensure a state exists, expanding num_states if needed.
    fn ensure_state(&mut self, state: StateId) {
        while self.num_states <= state {
            let label = self.labels.fresh(&self.num_states.to_string());
            self.labels.get_or_create(&label);
            self.num_states += 1;
        }
    }

    /// Add a new state labelled with its id (made unique if taken).
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

    /// The state labelled `label`, if any.
    pub fn state(&self, label: &str) -> Option<StateId> {
        self.labels.id(label)
    }

    pub fn set_start_state(&mut self, state: StateId) {
        self.ensure_state(state);
        self.start_state = state;
    }

    /// Add a transition from source to destination on an input character.
    ///
    /// Characters reserved by the regex syntax (`~`, `∅`, parentheses, `*`
    /// and `|`) are not input symbols and are rejected.
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
        self.add_symbol_transition(source, Symbol::Char(symbol), destination);
        Ok(())
    }

    /// Add an epsilon transition from source to destination.
    pub fn add_epsilon_transition(&mut self, source: StateId, destination: StateId) {
        self.add_symbol_transition(source, Symbol::Epsilon, destination);
    }

    pub(crate) fn add_symbol_transition(
        &mut self,
        source: StateId,
        symbol: Symbol,
        destination: StateId,
    ) {
        self.ensure_state(source);
        self.ensure_state(destination);

        let capacity = self.num_states as usize;
        self.transitions
            .entry((source, symbol))
            .or_insert_with(|| StateSet::with_capacity(capacity))
            .insert(destination);
    }

    /// Add an accepting state.
    pub fn add_accept_state(&mut self, state: StateId) {
        self.ensure_state(state);
        self.accept_states.insert(state);
    }

    pub fn build(self) -> Nfa {
        let alphabet = self
            .transitions
            .keys()
            .filter_map(|&(_, symbol)| symbol.as_char())
            .collect();

        Nfa {
            num_states: self.num_states,
            start_state: self.start_state,
            accept_states: self.accept_states,
            transitions: self.transitions,
            alphabet,
            labels: self.labels,
        }
    }
}

impl Nfa {
    /// Start building an NFA whose start state is labelled `start_label`.
    pub fn builder(start_label: &str) -> NfaBuilder {
        NfaBuilder::new(start_label)
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

    /// Get the alphabet (all symbols except epsilon), in ascending order.
    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    pub fn labels(&self) -> &StateLabels {
        &self.labels
    }

    /// The display label of a state.
    pub fn label(&self, state: StateId) -> String {
        self.labels.display(state)
    }

    /// The destinations of `state` on `symbol`, if there are any.
    pub fn targets(&self, state: StateId, symbol: Symbol) -> Option<&StateSet> {
        self.transitions.get(&(state, symbol))
    }

    /// The symbols `state` has transitions on, epsilon first, then ascending.
    pub fn symbols_from(&self, state: StateId) -> Vec<Symbol> {
        std::iter::once(Symbol::Epsilon)
            .chain(self.alphabet.iter().map(|&c| Symbol::Char(c)))
            .filter(|&symbol| self.transitions.contains_key(&(state, symbol)))
            .collect()
    }

    /// All transitions as `(source, symbol, destination)`, sorted.
    pub fn edges(&self) -> Vec<(StateId, Symbol, StateId)> {
        let mut edges: Vec<_> = self
            .transitions
            .iter()
            .flat_map(|(&(src, sym), dests)| dests.iter().map(move |dst| (src, sym, dst)))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Get the epsilon closure of a set of states.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.num_states as usize);
        let mut stack: Vec<StateId> = states.iter().collect();

        while let Some(s) = stack.pop() {
            if !closure.insert(s) {
                continue;
            }

            if let Some(destinations) = self.transitions.get(&(s, Symbol::Epsilon)) {
                stack.extend(destinations.iter().filter(|&dest| !closure.contains(dest)));
            }
        }

        closure
    }

    /// Get the epsilon closure of a single state.
    pub fn epsilon_closure_of(&self, state: StateId) -> StateSet {
        self.epsilon_closure(&StateSet::singleton(state, self.num_states as usize))
    }

    /// The epsilon closure of the start state.
    pub fn initial_states(&self) -> StateSet {
        self.epsilon_closure_of(self.start_state)
    }

    /// Get the states reachable from a set of states on a given character,
    /// including everything reachable from those by epsilon moves.
    pub fn step(&self, states: &StateSet, symbol: char) -> StateSet {
        let mut reached = StateSet::with_capacity(self.num_states as usize);

        for state in states.iter() {
            if let Some(destinations) = self.transitions.get(&(state, Symbol::Char(symbol))) {
                reached.union_with(destinations);
            }
        }

        self.epsilon_closure(&reached)
    }

    /// A step-at-a-time run over `input`.
    pub fn simulation<'a>(&'a self, input: &'a str) -> Simulation<'a> {
        Simulation::new(self, input)
    }

    pub fn accepts(&self, input: &str) -> bool {
        self.simulation(input).accepted()
    }

    /// Whether a set of states contains an accepting state.
    pub fn is_accepting(&self, states: &StateSet) -> bool {
        states.intersects(&self.accept_states)
    }

    /// Determinize with the subset construction.
    pub fn to_dfa(&self) -> Dfa {
        subset_construction(self)
    }

    /// The minimal DFA for the language of this NFA.
    pub fn minimized(&self) -> Dfa {
        self.to_dfa().minimized()
    }

    /// True iff there are no epsilon transitions and no (state, symbol) pair
    /// has more than one destination.
    pub fn is_dfa(&self) -> bool {
        self.transitions
            .iter()
            .all(|(&(_, symbol), dests)| !symbol.is_epsilon() && dests.len() <= 1)
    }

    /// Check if the NFA accepts no string at all.
    pub fn is_empty(&self) -> bool {
        let mut visited = StateSet::with_capacity(self.num_states as usize);
        let mut queue = VecDeque::from([self.start_state]);

        while let Some(state) = queue.pop_front() {
            if !visited.insert(state) {
                continue;
            }

            if self.accept_states.contains(state) {
                return false;
            }

            for symbol in self.symbols_from(state) {
                if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                    queue.extend(destinations.iter().filter(|&dest| !visited.contains(dest)));
                }
            }
        }

        true
    }

    /// Language equivalence, independent of state naming.
    pub fn is_equivalent(&self, other: &Nfa) -> bool {
        self.distinguishing_word(other).is_none()
    }

    /// The shortest word accepted by exactly one of the two automata, if any.
    pub fn distinguishing_word(&self, other: &Nfa) -> Option<String> {
        equivalence::distinguishing_word(&self.to_dfa(), &other.to_dfa())
    }

    /// Rename the states `0, 1, ..` in breadth-first discovery order from the
    /// start state.
    ///
    /// Epsilon edges are followed before symbol edges and symbols in ascending
    /// order. States the start cannot reach keep their relative order and are
    /// numbered after the reachable ones. Returns the renamed automaton and the
    /// map from old labels to new labels.
    pub fn relabeled(&self) -> (Nfa, IndexMap<String, String>) {
        let n = self.num_states as usize;
        let mut order = Vec::with_capacity(n);
        let mut visited = StateSet::with_capacity(n);
        let mut queue = VecDeque::from([self.start_state]);
        visited.insert(self.start_state);

        while let Some(state) = queue.pop_front() {
            order.push(state);
            for symbol in self.symbols_from(state) {
                if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                    for dest in destinations.iter() {
                        if visited.insert(dest) {
                            queue.push_back(dest);
                        }
                    }
                }
            }
        }
        order.extend((0..self.num_states).filter(|&state| !visited.contains(state)));

        let mut new_id = vec![0; n];
        for (new, &old) in order.iter().enumerate() {
            new_id[old as usize] = new as StateId;
        }

        let mut builder = NfaBuilder::with_labels(StateLabels::sequential(n), 0);
        for (src, symbol, dst) in self.edges() {
            builder.add_symbol_transition(new_id[src as usize], symbol, new_id[dst as usize]);
        }
        for state in self.accept_states.iter() {
            builder.add_accept_state(new_id[state as usize]);
        }

        let mapping = order
            .iter()
            .enumerate()
            .map(|(new, &old)| (self.label(old), new.to_string()))
            .collect();

        (builder.build(), mapping)
    }

    /// States from which some accepting state can be reached, following every
    /// edge including epsilon edges.
    pub fn live_states(&self) -> StateSet {
        let n = self.num_states as usize;
        let mut predecessors: Vec<Vec<StateId>> = vec![Vec::new(); n];
        for (&(src, _), dests) in &self.transitions {
            for dst in dests.iter() {
                predecessors[dst as usize].push(src);
            }
        }

        let mut live = StateSet::with_capacity(n);
        let mut stack: Vec<StateId> = self.accept_states.iter().collect();
        while let Some(state) = stack.pop() {
            if live.insert(state) {
                stack.extend(
                    predecessors[state as usize]
                        .iter()
                        .copied()
                        .filter(|&pred| !live.contains(pred)),
                );
            }
        }

        live
    }

    /// Drop every state that cannot reach an accepting state, with all edges
    /// touching it.
    ///
    /// The start state is always kept, even when it is dead itself. Surviving
    /// states keep their labels.
    pub fn trash_states_removed(&self) -> Nfa {
        let mut keep = self.live_states();
        keep.insert(self.start_state);

        let survivors = keep.to_vec();
        let mut new_id: Vec<Option<StateId>> = vec![None; self.num_states as usize];
        for (new, &old) in survivors.iter().enumerate() {
            new_id[old as usize] = Some(new as StateId);
        }
        let remap = |state: StateId| new_id[state as usize];

        let start = remap(self.start_state).unwrap_or_default();
        let mut builder = NfaBuilder::with_labels(self.labels.project(&survivors), start);
        for (src, symbol, dst) in self.edges() {
            if let (Some(src), Some(dst)) = (remap(src), remap(dst)) {
                builder.add_symbol_transition(src, symbol, dst);
            }
        }
        for state in self.accept_states.iter() {
            if let Some(state) = remap(state) {
                builder.add_accept_state(state);
            }
        }

        debug!(
            "removed {} trash states",
            self.num_states as usize - survivors.len()
        );
        builder.build()
    }

    /// Complete the automaton with one sink state.
    ///
    /// Every (state, symbol) pair over the alphabet that has no transition gets
    /// one to the sink, which loops to itself on every symbol. The sink is
    /// labelled `trash` (made unique if taken). When nothing is missing the
    /// automaton is returned unchanged.
    pub fn trash_states_added(&self) -> Nfa {
        let missing: Vec<(StateId, char)> = (0..self.num_states)
            .flat_map(|state| self.alphabet.iter().map(move |&c| (state, c)))
            .filter(|&(state, c)| !self.transitions.contains_key(&(state, Symbol::Char(c))))
            .collect();

        if missing.is_empty() {
            return self.clone();
        }

        let mut builder = NfaBuilder::with_labels(self.labels.clone(), self.start_state);
        for (src, symbol, dst) in self.edges() {
            builder.add_symbol_transition(src, symbol, dst);
        }
        for state in self.accept_states.iter() {
            builder.add_accept_state(state);
        }

        let sink = builder.add_labeled_state(&self.labels.fresh("trash"));
        for (state, c) in missing {
            builder.add_symbol_transition(state, Symbol::Char(c), sink);
        }
        for &c in &self.alphabet {
            builder.add_symbol_transition(sink, Symbol::Char(c), sink);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts words with an even number of 0s or an even number of 1s.
    fn even_zeros_or_ones() -> Nfa {
        let mut builder = Nfa::builder("0");
        builder.add_epsilon_transition(0, 1);
        builder.add_epsilon_transition(0, 3);
        builder.add_transition(1, '0', 2).unwrap();
        builder.add_transition(1, '1', 1).unwrap();
        builder.add_transition(2, '0', 1).unwrap();
        builder.add_transition(2, '1', 2).unwrap();
        builder.add_transition(3, '0', 3).unwrap();
        builder.add_transition(3, '1', 4).unwrap();
        builder.add_transition(4, '0', 4).unwrap();
        builder.add_transition(4, '1', 3).unwrap();
        builder.add_accept_state(1);
        builder.add_accept_state(3);
        builder.build()
    }

    #[test]
    fn test_nfa_basic() {
        let nfa = even_zeros_or_ones();

        assert_eq!(nfa.num_states(), 5);
        assert_eq!(nfa.alphabet().iter().collect::<String>(), "01");
        assert_eq!(nfa.label(4), "4");
        assert!(!nfa.is_empty());
        assert!(!nfa.is_dfa());
    }

    #[test]
    fn test_epsilon_closure() {
        let nfa = even_zeros_or_ones();

        assert_eq!(nfa.epsilon_closure_of(0).to_vec(), vec![0, 1, 3]);
        assert_eq!(nfa.epsilon_closure_of(2).to_vec(), vec![2]);
    }

    #[test]
    fn test_step() {
        let nfa = even_zeros_or_ones();
        let start = nfa.initial_states();

        assert_eq!(nfa.step(&start, '0').to_vec(), vec![2, 3]);
        assert_eq!(nfa.step(&start, '2').to_vec(), Vec::<StateId>::new());
    }

    #[test]
    fn test_accepts() {
        let nfa = even_zeros_or_ones();

        assert!(nfa.accepts(""));
        assert!(nfa.accepts("010"));
        assert!(nfa.accepts("101"));
        assert!(nfa.accepts("1010"));
        assert!(!nfa.accepts("01"));
    }

    #[test]
    fn test_is_empty() {
        let mut builder = Nfa::builder("0");
        builder.add_accept_state(1);
        // No transitions - no path from 0 to 1
        assert!(builder.clone().build().is_empty());

        builder.add_epsilon_transition(0, 1);
        assert!(!builder.build().is_empty());
    }

    #[test]
    fn test_builder_labels() {
        let mut builder = Nfa::builder("q0");
        let q1 = builder.add_labeled_state("q1");
        assert_eq!(builder.add_labeled_state("q1"), q1);
        assert_eq!(builder.state("q0"), Some(0));
        builder.add_transition(0, 'a', q1).unwrap();
        builder.add_accept_state(q1);
        let nfa = builder.build();

        assert_eq!(nfa.label(q1), "q1");
        assert!(nfa.is_dfa());
        assert!(nfa.accepts("a"));
    }

    #[test]
    fn test_reserved_characters_are_not_symbols() {
        let mut builder = Nfa::builder("p");
        for reserved in ['~', '∅', '(', ')', '*', '|'] {
            assert_eq!(
                builder.add_transition(0, reserved, 1),
                Err(ValidationError::InvalidSymbol {
                    state: "p".to_string(),
                    symbol: reserved.to_string(),
                })
            );
        }
        builder.add_transition(0, 'a', 1).unwrap();
        builder.add_accept_state(1);
        let nfa = builder.build();

        assert_eq!(nfa.alphabet().iter().collect::<String>(), "a");
        assert!(nfa.targets(0, Symbol::Epsilon).is_none());
        assert!(!nfa.accepts(""));

        let reloaded = Nfa::from_json(&nfa.to_json().unwrap()).unwrap();
        assert!(reloaded.accepts("a"));
        assert!(!reloaded.accepts(""));
    }

    #[test]
    fn test_relabeled_follows_bfs_order() {
        // 0 -b-> 1, 0 -a-> 2, 0 -ε-> 3, 4 unreachable
        let mut builder = Nfa::builder("s");
        builder.add_transition(0, 'b', 1).unwrap();
        builder.add_transition(0, 'a', 2).unwrap();
        builder.add_epsilon_transition(0, 3);
        builder.add_state();
        builder.add_accept_state(1);
        let nfa = builder.build();

        let (relabeled, mapping) = nfa.relabeled();

        assert_eq!(mapping.get("s").map(String::as_str), Some("0"));
        assert_eq!(mapping.get("3").map(String::as_str), Some("1"));
        assert_eq!(mapping.get("2").map(String::as_str), Some("2"));
        assert_eq!(mapping.get("1").map(String::as_str), Some("3"));
        assert_eq!(mapping.get("4").map(String::as_str), Some("4"));
        assert_eq!(relabeled.start_state(), 0);
        assert!(relabeled.accepts("b"));
        assert!(!relabeled.accepts("a"));
        assert!(relabeled.is_equivalent(&nfa));
    }

    #[test]
    fn test_trash_states_removed() {
        // 0 -a-> 1 (accept), 0 -b-> 2 -a-> 2 (dead)
        let mut builder = Nfa::builder("0");
        builder.add_transition(0, 'a', 1).unwrap();
        builder.add_transition(0, 'b', 2).unwrap();
        builder.add_transition(2, 'a', 2).unwrap();
        builder.add_accept_state(1);
        let nfa = builder.build();

        let pruned = nfa.trash_states_removed();

        assert_eq!(pruned.num_states(), 2);
        assert_eq!(pruned.label(1), "1");
        assert!(pruned.accepts("a"));
        assert!(pruned.is_equivalent(&nfa));
    }

    #[test]
    fn test_trash_states_removed_keeps_dead_start() {
        let mut builder = Nfa::builder("0");
        builder.add_transition(0, 'a', 1).unwrap();
        let nfa = builder.build();

        let pruned = nfa.trash_states_removed();

        assert_eq!(pruned.num_states(), 1);
        assert!(pruned.is_empty());
        assert_eq!(pruned.label(pruned.start_state()), "0");
    }

    #[test]
    fn test_trash_states_added() {
        let mut builder = Nfa::builder("0");
        builder.add_transition(0, 'a', 1).unwrap();
        builder.add_transition(1, 'b', 1).unwrap();
        builder.add_accept_state(1);
        let nfa = builder.build();

        let completed = nfa.trash_states_added();

        assert_eq!(completed.num_states(), 3);
        assert_eq!(completed.label(2), "trash");
        assert_eq!(completed.targets(0, Symbol::Char('b')).map(StateSet::to_vec), Some(vec![2]));
        assert!(completed.is_dfa());
        assert!(completed.is_equivalent(&nfa));

        // Removing the sink again gives back the original shape.
        assert_eq!(completed.trash_states_removed().num_states(), 2);

        // A complete automaton has nothing to add.
        assert_eq!(completed.trash_states_added().num_states(), 3);
    }
}
