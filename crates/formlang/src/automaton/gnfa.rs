//! Generalized NFA with regular-expression edge labels, reduced by state
//! elimination to a single equivalent regular expression.

use crate::automaton::labels::StateLabels;
use crate::automaton::nfa::Nfa;
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::Symbol;
use crate::error::InvalidOperation;
use crate::regex::ast::Regex;
use crate::regex::simplify;
use log::{debug, trace};
use std::collections::HashMap;

static EMPTY_LABEL: Regex = Regex::EmptySet;

/// A generalized NFA.
///
/// The start state has no incoming edges and the accept state, which is a
/// different state, has no outgoing edges. Every ordered pair of states has a
/// label; pairs without a stored edge are labelled `∅`.
#[derive(Debug, Clone)]
pub struct Gnfa {
    /// States that have not been eliminated yet
    states: StateSet,
    start_state: StateId,
    accept_state: StateId,
    /// Labels other than `∅`
    edges: HashMap<(StateId, StateId), Regex>,
    labels: StateLabels,
}

impl Gnfa {
    /// Build the GNFA of an NFA.
    ///
    /// A fresh start state (labelled `start`) reaches the old start by `~`, and
    /// every old accepting state reaches a fresh accept state (labelled
    /// `accept`) by `~`. Both labels are made unique if the NFA already uses
    /// them. Parallel edges are joined with `|`.
    pub fn from_nfa(nfa: &Nfa) -> Gnfa {
        let mut labels = nfa.labels().clone();
        let start_label = labels.fresh("start");
        let start_state = labels.get_or_create(&start_label);
        let accept_label = labels.fresh("accept");
        let accept_state = labels.get_or_create(&accept_label);

        let mut edges: HashMap<(StateId, StateId), Regex> = HashMap::new();
        let mut add_edge = |from: StateId, to: StateId, label: Regex| {
            let previous = edges.remove(&(from, to)).unwrap_or(Regex::EmptySet);
            edges.insert((from, to), simplify::union(previous, label));
        };

        add_edge(start_state, nfa.start_state(), Regex::EmptyString);
        for (src, symbol, dst) in nfa.edges() {
            let label = match symbol {
                Symbol::Epsilon => Regex::EmptyString,
                Symbol::Char(c) => Regex::Char(c),
            };
            add_edge(src, dst, label);
        }
        for state in nfa.accept_states().iter() {
            add_edge(state, accept_state, Regex::EmptyString);
        }

        let mut states = StateSet::full(nfa.num_states() as usize);
        states.insert(start_state);
        states.insert(accept_state);

        Gnfa {
            states,
            start_state,
            accept_state,
            edges,
            labels,
        }
    }

    /// Assemble a GNFA from parts that already satisfy the structural rules.
    pub(crate) fn from_parts(
        labels: StateLabels,
        start_state: StateId,
        accept_state: StateId,
        edges: HashMap<(StateId, StateId), Regex>,
    ) -> Gnfa {
        let mut states = StateSet::full(labels.len());
        states.insert(start_state);
        states.insert(accept_state);
        let edges = edges
            .into_iter()
            .filter(|(_, label)| *label != Regex::EmptySet)
            .collect();

        Gnfa {
            states,
            start_state,
            accept_state,
            edges,
            labels,
        }
    }

    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    pub fn accept_state(&self) -> StateId {
        self.accept_state
    }

    /// The states that are still present.
    pub fn states(&self) -> &StateSet {
        &self.states
    }

    pub fn labels(&self) -> &StateLabels {
        &self.labels
    }

    /// The display label of a state.
    pub fn state_label(&self, state: StateId) -> String {
        self.labels.display(state)
    }

    /// The label of the edge `from -> to`, `∅` when there is no edge.
    pub fn label(&self, from: StateId, to: StateId) -> &Regex {
        self.edges.get(&(from, to)).unwrap_or(&EMPTY_LABEL)
    }

    /// All edges not labelled `∅`, sorted by endpoints.
    pub fn edges(&self) -> Vec<(StateId, StateId, &Regex)> {
        let mut edges: Vec<_> = self
            .edges
            .iter()
            .map(|(&(from, to), label)| (from, to, label))
            .collect();
        edges.sort_unstable_by_key(|&(from, to, _)| (from, to));
        edges
    }

    /// The states other than start and accept, in ascending order.
    pub fn interior_states(&self) -> Vec<StateId> {
        self.states
            .iter()
            .filter(|&state| state != self.start_state && state != self.accept_state)
            .collect()
    }

    /// True once only the start and the accept state remain.
    pub fn is_final(&self) -> bool {
        self.interior_states().is_empty()
    }

    /// The equivalent regular expression, once the GNFA is final.
    pub fn regex(&self) -> Option<Regex> {
        self.is_final()
            .then(|| self.label(self.start_state, self.accept_state).clone())
    }

    /// Eliminate one interior state.
    ///
    /// Every remaining pair `(i, j)` becomes `label(i, j) | label(i, r) label(r, r)* label(r, j)`.
    pub fn reduced(&self, state: StateId) -> Result<Gnfa, InvalidOperation> {
        if state == self.start_state {
            return Err(InvalidOperation::EliminateStart(self.state_label(state)));
        }
        if state == self.accept_state {
            return Err(InvalidOperation::EliminateAccept(self.state_label(state)));
        }
        if !self.states.contains(state) {
            return Err(InvalidOperation::UnknownState(self.state_label(state)));
        }

        Ok(self.eliminate(state))
    }

    /// Eliminate the interior state with the given display label.
    pub fn reduced_label(&self, label: &str) -> Result<Gnfa, InvalidOperation> {
        let state = self
            .labels
            .id(label)
            .ok_or_else(|| InvalidOperation::UnknownState(label.to_string()))?;
        self.reduced(state)
    }

    /// Eliminate the states in `order`, then every other interior state in
    /// ascending order, and return the resulting expression.
    pub fn eliminate_all(&self, order: &[StateId]) -> Result<Regex, InvalidOperation> {
        let mut gnfa = self.clone();
        for &state in order {
            gnfa = gnfa.reduced(state)?;
        }
        for state in gnfa.interior_states() {
            gnfa = gnfa.eliminate(state);
        }
        Ok(gnfa.label(gnfa.start_state, gnfa.accept_state).clone())
    }

    fn eliminate(&self, r: StateId) -> Gnfa {
        debug!("eliminating GNFA state {}", self.state_label(r));

        let self_loop = simplify::star(self.label(r, r).clone());
        let mut states = self.states.clone();
        states.remove(r);

        let mut edges: HashMap<(StateId, StateId), Regex> = self
            .edges
            .iter()
            .filter(|&(&(from, to), _)| from != r && to != r)
            .map(|(&pair, label)| (pair, label.clone()))
            .collect();

        let incoming: Vec<(StateId, &Regex)> = states
            .iter()
            .filter_map(|i| self.edges.get(&(i, r)).map(|label| (i, label)))
            .collect();
        let outgoing: Vec<(StateId, &Regex)> = states
            .iter()
            .filter_map(|j| self.edges.get(&(r, j)).map(|label| (j, label)))
            .collect();

        for &(i, into_r) in &incoming {
            for &(j, out_of_r) in &outgoing {
                let detour = simplify::concat(
                    into_r.clone(),
                    simplify::concat(self_loop.clone(), out_of_r.clone()),
                );
                let direct = edges.remove(&(i, j)).unwrap_or(Regex::EmptySet);
                let label = simplify::union(direct, detour);
                trace!(
                    "{} -> {} becomes {label}",
                    self.state_label(i),
                    self.state_label(j)
                );
                if label != Regex::EmptySet {
                    edges.insert((i, j), label);
                }
            }
        }

        Gnfa {
            states,
            start_state: self.start_state,
            accept_state: self.accept_state,
            edges,
            labels: self.labels.clone(),
        }
    }
}

impl Nfa {
    /// An equivalent regular expression, by eliminating every state of the
    /// GNFA of this automaton in ascending order.
    pub fn to_regex(&self) -> Regex {
        let gnfa = Gnfa::from_nfa(self);
        gnfa.interior_states()
            .into_iter()
            .fold(gnfa, |gnfa, state| gnfa.eliminate(state))
            .regex()
            .unwrap_or(Regex::EmptySet)
    }
}
