//! Finite automata over character alphabets.
//!
//! This module provides epsilon-NFA, DFA and GNFA implementations with:
//! - Epsilon closure computation and step-at-a-time simulation
//! - Subset construction (NFA to DFA conversion)
//! - Hopcroft's DFA minimization algorithm
//! - Language equivalence with a shortest distinguishing word
//! - Canonical relabeling and dead-state pruning
//! - GNFA state elimination (automaton to regular expression)

pub(crate) mod dfa;
pub(crate) mod equivalence;
pub(crate) mod gnfa;
pub(crate) mod labels;
pub(crate) mod nfa;
pub(crate) mod simulation;
pub(crate) mod state;
pub(crate) mod subset_construction;
pub(crate) mod symbol;

pub use dfa::{Dfa, DfaBuilder};
pub use equivalence::distinguishing_word;
pub use gnfa::Gnfa;
pub use labels::StateLabels;
pub use nfa::{Nfa, NfaBuilder};
pub use simulation::{Simulation, Step};
pub use state::{StateId, StateSet};
pub use subset_construction::subset_construction;
pub use symbol::{EMPTY_SET_CHAR, EPSILON_CHAR, EPSILON_TEXT, RESERVED, Symbol, is_input_char};
