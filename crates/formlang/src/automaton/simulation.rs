//! Step-at-a-time NFA simulation.

use crate::automaton::nfa::Nfa;
use crate::automaton::state::StateSet;
use std::str::Chars;

/// One element of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The set of active states after consuming `position` characters.
    Active(StateSet),
    /// The input is exhausted; whether the last active set contains an accepting state.
    Finished(bool),
}

/// A lazy run of an [`Nfa`] over one input.
///
/// The first element is the epsilon closure of the start state, then one
/// element per input character, then a single [`Step::Finished`]. A finished
/// simulation stays finished; build a new one to start over. Dropping it
/// midway needs no cleanup.
#[derive(Debug, Clone)]
pub struct Simulation<'a> {
    nfa: &'a Nfa,
    input: Chars<'a>,
    position: usize,
    current: Option<StateSet>,
    done: bool,
}

impl<'a> Simulation<'a> {
    pub(crate) fn new(nfa: &'a Nfa, input: &'a str) -> Self {
        Self {
            nfa,
            input: input.chars(),
            position: 0,
            current: None,
            done: false,
        }
    }

    /// Number of characters consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The most recently produced set of active states.
    pub fn current(&self) -> Option<&StateSet> {
        self.current.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Drive the run to completion and return the verdict.
    pub fn accepted(self) -> bool {
        matches!(self.last(), Some(Step::Finished(true)))
    }
}

impl Iterator for Simulation<'_> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        if self.done {
            return None;
        }

        if self.current.is_none() {
            let initial = self.nfa.initial_states();
            self.current = Some(initial.clone());
            return Some(Step::Active(initial));
        }
        let current = self.current.as_ref()?;

        match self.input.next() {
            Some(c) => {
                let next = self.nfa.step(current, c);
                self.position += 1;
                self.current = Some(next.clone());
                Some(Step::Active(next))
            }
            None => {
                self.done = true;
                Some(Step::Finished(self.nfa.is_accepting(current)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 -ε-> 1, 1 -a-> 2 (accept)
    fn single_a() -> Nfa {
        let mut builder = Nfa::builder("0");
        builder.add_epsilon_transition(0, 1);
        builder.add_transition(1, 'a', 2).unwrap();
        builder.add_accept_state(2);
        builder.build()
    }

    #[test]
    fn test_simulation_steps() {
        let nfa = single_a();
        let steps: Vec<Step> = nfa.simulation("a").collect();

        assert_eq!(
            steps,
            vec![
                Step::Active([0, 1].into_iter().collect()),
                Step::Active([2].into_iter().collect()),
                Step::Finished(true),
            ]
        );
    }

    #[test]
    fn test_simulation_is_not_restartable() {
        let nfa = single_a();
        let mut sim = nfa.simulation("aa");

        assert_eq!(sim.position(), 0);
        assert!(sim.current().is_none());
        sim.next();
        sim.next();
        assert_eq!(sim.position(), 1);
        sim.next();
        assert_eq!(sim.current(), Some(&StateSet::default()));
        assert_eq!(sim.next(), Some(Step::Finished(false)));
        assert!(sim.is_done());
        assert_eq!(sim.next(), None);
    }

    #[test]
    fn test_accepted_drives_to_completion() {
        let nfa = single_a();
        assert!(nfa.simulation("a").accepted());
        assert!(!nfa.simulation("").accepted());
    }
}
