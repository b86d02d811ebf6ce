//! Language equivalence of two DFAs by exploring their product automaton.

use crate::automaton::dfa::Dfa;
use crate::automaton::state::StateId;
use indexmap::IndexMap;
use log::debug;
use std::collections::{BTreeSet, VecDeque};

/// A state of one side of the product. `None` is the implicit sink reached by
/// an undefined transition.
type Side = Option<StateId>;

fn is_accepting(dfa: &Dfa, state: Side) -> bool {
    state.is_some_and(|state| dfa.accept_states().contains(state))
}

/// The shortest word accepted by exactly one of `left` and `right`, or `None`
/// when they accept the same language.
///
/// Pairs of states are explored breadth-first from the pair of start states,
/// with both automata completed by an implicit sink. The first pair whose
/// acceptance differs ends the search.
pub fn distinguishing_word(left: &Dfa, right: &Dfa) -> Option<String> {
    let alphabet: BTreeSet<char> = left.alphabet().union(right.alphabet()).copied().collect();

    // Every discovered pair, with the pair and symbol it was first reached from
    let mut parents: IndexMap<(Side, Side), Option<(usize, char)>> = IndexMap::new();
    let start = (Some(left.start_state()), Some(right.start_state()));
    parents.insert(start, None);
    let mut queue = VecDeque::from([0]);

    while let Some(index) = queue.pop_front() {
        let Some((&(l, r), _)) = parents.get_index(index) else {
            continue;
        };

        if is_accepting(left, l) != is_accepting(right, r) {
            let word = witness(&parents, index);
            debug!("automata differ on {word:?}");
            return Some(word);
        }

        // Both sides stuck in the sink accept nothing from here on
        if l.is_none() && r.is_none() {
            continue;
        }

        for &symbol in &alphabet {
            let next = (
                l.and_then(|state| left.run(symbol, state)),
                r.and_then(|state| right.run(symbol, state)),
            );
            if !parents.contains_key(&next) {
                let (next_index, _) = parents.insert_full(next, Some((index, symbol)));
                queue.push_back(next_index);
            }
        }
    }

    None
}

/// Walk the parent links back to the start pair.
fn witness(parents: &IndexMap<(Side, Side), Option<(usize, char)>>, mut index: usize) -> String {
    let mut symbols = Vec::new();
    while let Some((_, Some((parent, symbol)))) = parents.get_index(index) {
        symbols.push(*symbol);
        index = *parent;
    }
    symbols.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_word(word: &str) -> Dfa {
        let mut dfa = Dfa::builder("0");
        for (i, c) in word.chars().enumerate() {
            dfa.add_transition(i as StateId, c, i as StateId + 1).unwrap();
        }
        dfa.add_accept_state(word.chars().count() as StateId);
        dfa.build()
    }

    #[test]
    fn test_same_language_different_shape() {
        let left = single_word("ab");

        let mut right = Dfa::builder("x");
        let y = right.add_labeled_state("y");
        let z = right.add_labeled_state("z");
        right.add_labeled_state("unreachable");
        right.add_transition(0, 'a', y).unwrap();
        right.add_transition(y, 'b', z).unwrap();
        right.add_accept_state(z);
        let right = right.build();

        assert_eq!(distinguishing_word(&left, &right), None);
    }

    #[test]
    fn test_shortest_witness() {
        let left = single_word("ab");
        let right = single_word("abc");

        assert_eq!(distinguishing_word(&left, &right).as_deref(), Some("ab"));
        assert_eq!(distinguishing_word(&right, &left).as_deref(), Some("ab"));
    }

    #[test]
    fn test_empty_word_witness() {
        let left = single_word("");
        let right = single_word("a");

        assert_eq!(distinguishing_word(&left, &right).as_deref(), Some(""));
    }
}
