//! Thompson construction: syntax-directed compilation of a [`Regex`] into an [`Nfa`].
//!
//! Each sub-expression is compiled on its own into states `0..n`. Combining
//! two of them shifts the states of each into one disjoint numbering (offsets
//! in the combined automaton) and copies their transitions verbatim.

use crate::automaton::labels::StateLabels;
use crate::automaton::nfa::{Nfa, NfaBuilder};
use crate::automaton::state::StateId;
use crate::automaton::symbol::Symbol;
use crate::regex::ast::Regex;

impl Regex {
    /// Compile this expression into an equivalent NFA.
    pub fn to_nfa(&self) -> Nfa {
        match self {
            Regex::Char(c) => {
                let mut builder = Nfa::builder("0");
                let accept = builder.add_state();
                builder.add_symbol_transition(0, Symbol::Char(*c), accept);
                builder.add_accept_state(accept);
                builder.build()
            }
            Regex::EmptyString => {
                let mut builder = Nfa::builder("0");
                builder.add_accept_state(0);
                builder.build()
            }
            Regex::EmptySet => Nfa::builder("0").build(),
            Regex::Concat(left, right) => {
                let left = left.to_nfa();
                let right = right.to_nfa();
                let offset = left.num_states();

                let mut builder = sequential_builder(
                    left.num_states() + right.num_states(),
                    left.start_state(),
                );
                embed(&mut builder, &left, 0);
                embed(&mut builder, &right, offset);
                for accept in left.accept_states().iter() {
                    builder.add_epsilon_transition(accept, right.start_state() + offset);
                }
                for accept in right.accept_states().iter() {
                    builder.add_accept_state(accept + offset);
                }
                builder.build()
            }
            Regex::Union(left, right) => {
                let left = left.to_nfa();
                let right = right.to_nfa();
                let left_offset = 1;
                let right_offset = 1 + left.num_states();

                let mut builder =
                    sequential_builder(1 + left.num_states() + right.num_states(), 0);
                embed(&mut builder, &left, left_offset);
                embed(&mut builder, &right, right_offset);
                builder.add_epsilon_transition(0, left.start_state() + left_offset);
                builder.add_epsilon_transition(0, right.start_state() + right_offset);
                for accept in left.accept_states().iter() {
                    builder.add_accept_state(accept + left_offset);
                }
                for accept in right.accept_states().iter() {
                    builder.add_accept_state(accept + right_offset);
                }
                builder.build()
            }
            Regex::Star(inner) => {
                let inner = inner.to_nfa();
                let old_start = inner.start_state() + 1;

                let mut builder = sequential_builder(1 + inner.num_states(), 0);
                embed(&mut builder, &inner, 1);
                builder.add_epsilon_transition(0, old_start);
                for accept in inner.accept_states().iter() {
                    builder.add_epsilon_transition(accept + 1, old_start);
                    builder.add_accept_state(accept + 1);
                }
                builder.add_accept_state(0);
                builder.build()
            }
        }
    }
}

impl From<&Regex> for Nfa {
    fn from(regex: &Regex) -> Self {
        regex.to_nfa()
    }
}

fn sequential_builder(num_states: StateId, start_state: StateId) -> NfaBuilder {
    NfaBuilder::with_labels(StateLabels::sequential(num_states as usize), start_state)
}

/// Copy every transition of `nfa` into `builder`, shifting states by `offset`.
fn embed(builder: &mut NfaBuilder, nfa: &Nfa, offset: StateId) {
    for (src, symbol, dst) in nfa.edges() {
        builder.add_symbol_transition(src + offset, symbol, dst + offset);
    }
}
