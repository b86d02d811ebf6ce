//! JSON snapshots of automata.
//!
//! Snapshots are the boundary format shared with rendering and storage. They
//! name states by display label and are validated as a whole when an
//! automaton is rebuilt from them: either the snapshot is valid and a complete
//! automaton comes back, or a [`ValidationError`] does.
//!
//! # Formats
//!
//! ```json
//! { "startState": "0", "acceptStates": ["1"], "table": { "0": { "a": ["1"], "~": ["0"] } } }
//! ```
//!
//! A DFA snapshot has no `startState`; the first state of its table is the
//! start. Its table maps each symbol to a single state. A GNFA snapshot has
//! `startState`, `acceptState` and a table mapping each state to the regex
//! labels of its outgoing edges. Edges labelled `∅` are left out.
//!
//! State labels may be written as strings or as non-negative integers; they
//! are always written back as strings.

use crate::automaton::dfa::{Dfa, DfaBuilder};
use crate::automaton::gnfa::Gnfa;
use crate::automaton::labels::StateLabels;
use crate::automaton::nfa::{Nfa, NfaBuilder};
use crate::automaton::state::StateId;
use crate::automaton::symbol::Symbol;
use crate::error::{SnapshotError, ValidationError};
use crate::regex::ast::Regex;
use crate::regex::parser::parse_regex;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A state label as it appears in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawLabel", into = "String")]
pub struct Label(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Text(String),
    Number(u64),
}

impl From<RawLabel> for Label {
    fn from(raw: RawLabel) -> Self {
        match raw {
            RawLabel::Text(text) => Label(text),
            RawLabel::Number(number) => Label(number.to_string()),
        }
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Label(text.to_string())
    }
}

impl From<String> for Label {
    fn from(text: String) -> Self {
        Label(text)
    }
}

impl Label {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of an [`Nfa`]. The symbol `~` stands for an epsilon transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NfaSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_state: Option<Label>,
    #[serde(default)]
    pub accept_states: Vec<Label>,
    #[serde(default)]
    pub table: IndexMap<Label, IndexMap<String, Vec<Label>>>,
}

/// Snapshot of a [`Dfa`]. The first state of the table is the start state.
///
/// A table with integer labels serialized from a JavaScript object lists its
/// keys in ascending order, so its start is the smallest label, normally `0`.
/// Reorder the table when the start state is some other state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DfaSnapshot {
    #[serde(default)]
    pub accept_states: Vec<Label>,
    #[serde(default)]
    pub table: IndexMap<Label, IndexMap<String, Label>>,
}

/// Snapshot of a [`Gnfa`]. Table values are regex text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GnfaSnapshot {
    pub start_state: Label,
    pub accept_state: Label,
    #[serde(default)]
    pub table: IndexMap<Label, IndexMap<Label, String>>,
}

fn parse_symbol(state: &Label, symbol: &str) -> Result<Symbol, ValidationError> {
    Symbol::parse(symbol).ok_or_else(|| ValidationError::InvalidSymbol {
        state: state.to_string(),
        symbol: symbol.to_string(),
    })
}

fn lookup(labels: &StateLabels, state: &Label, target: &Label) -> Result<StateId, ValidationError> {
    labels
        .id(target.as_str())
        .ok_or_else(|| ValidationError::UnknownTarget {
            state: state.to_string(),
            target: target.to_string(),
        })
}

impl Nfa {
    pub fn to_snapshot(&self) -> NfaSnapshot {
        let label = |state: StateId| Label(self.label(state));

        let table = (0..self.num_states())
            .map(|state| {
                let row: IndexMap<String, Vec<Label>> = self
                    .symbols_from(state)
                    .into_iter()
                    .filter_map(|symbol| {
                        let targets = self.targets(state, symbol)?;
                        Some((symbol.to_string(), targets.iter().map(label).collect()))
                    })
                    .collect();
                (label(state), row)
            })
            .collect();

        NfaSnapshot {
            start_state: Some(label(self.start_state())),
            accept_states: self.accept_states().iter().map(label).collect(),
            table,
        }
    }

    /// Rebuild an NFA from a snapshot.
    ///
    /// The states are the table keys and the accepting states. The start
    /// state and every transition target must be one of them.
    pub fn from_snapshot(snapshot: &NfaSnapshot) -> Result<Nfa, ValidationError> {
        let start = snapshot
            .start_state
            .as_ref()
            .ok_or(ValidationError::MissingStart)?;

        let mut labels = StateLabels::new();
        for state in snapshot.table.keys().chain(&snapshot.accept_states) {
            labels.get_or_create(state.as_str());
        }
        let start = labels
            .id(start.as_str())
            .ok_or_else(|| ValidationError::UnknownStart {
                state: start.to_string(),
            })?;

        let mut transitions = Vec::new();
        for (state, row) in &snapshot.table {
            let source = lookup(&labels, state, state)?;
            for (symbol, targets) in row {
                let symbol = parse_symbol(state, symbol)?;
                for target in targets {
                    transitions.push((source, symbol, lookup(&labels, state, target)?));
                }
            }
        }
        let accept_states: Vec<StateId> = snapshot
            .accept_states
            .iter()
            .filter_map(|state| labels.id(state.as_str()))
            .collect();

        let mut builder = NfaBuilder::with_labels(labels, start);
        for (source, symbol, destination) in transitions {
            builder.add_symbol_transition(source, symbol, destination);
        }
        for state in accept_states {
            builder.add_accept_state(state);
        }
        Ok(builder.build())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Nfa, SnapshotError> {
        let snapshot: NfaSnapshot = serde_json::from_str(json)?;
        Ok(Nfa::from_snapshot(&snapshot)?)
    }
}

impl Dfa {
    /// Snapshot with the start state first in the table.
    pub fn to_snapshot(&self) -> DfaSnapshot {
        let label = |state: StateId| Label(self.label(state));
        let start = self.start_state();
        let mut table: IndexMap<Label, IndexMap<String, Label>> = std::iter::once(start)
            .chain((0..self.num_states()).filter(|&state| state != start))
            .map(|state| (label(state), IndexMap::new()))
            .collect();

        for (source, symbol, destination) in self.edges() {
            table
                .entry(label(source))
                .or_default()
                .insert(symbol.to_string(), label(destination));
        }

        DfaSnapshot {
            accept_states: self.accept_states().iter().map(label).collect(),
            table,
        }
    }

    /// Rebuild a DFA from a snapshot whose first table entry is the start state.
    pub fn from_snapshot(snapshot: &DfaSnapshot) -> Result<Dfa, ValidationError> {
        let (start, _) = snapshot
            .table
            .first()
            .ok_or(ValidationError::MissingStart)?;

        let mut labels = StateLabels::new();
        for state in snapshot.table.keys().chain(&snapshot.accept_states) {
            labels.get_or_create(state.as_str());
        }
        let start = lookup(&labels, start, start)?;

        let mut transitions = Vec::new();
        for (state, row) in &snapshot.table {
            let source = lookup(&labels, state, state)?;
            for (symbol, target) in row {
                let symbol = match parse_symbol(state, symbol)? {
                    Symbol::Char(c) => c,
                    Symbol::Epsilon => {
                        return Err(ValidationError::EpsilonInDfa {
                            state: state.to_string(),
                        });
                    }
                };
                transitions.push((source, symbol, lookup(&labels, state, target)?));
            }
        }
        let accept_states: Vec<StateId> = snapshot
            .accept_states
            .iter()
            .filter_map(|state| labels.id(state.as_str()))
            .collect();

        let mut builder = DfaBuilder::with_labels(labels, start);
        for (source, symbol, destination) in transitions {
            builder.insert_transition(source, symbol, destination);
        }
        for state in accept_states {
            builder.add_accept_state(state);
        }
        Ok(builder.build())
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Dfa, SnapshotError> {
        let snapshot: DfaSnapshot = serde_json::from_str(json)?;
        Ok(Dfa::from_snapshot(&snapshot)?)
    }
}

impl Gnfa {
    pub fn to_snapshot(&self) -> GnfaSnapshot {
        let label = |state: StateId| Label(self.state_label(state));
        let mut table: IndexMap<Label, IndexMap<Label, String>> = self
            .states()
            .iter()
            .map(|state| (label(state), IndexMap::new()))
            .collect();

        for (from, to, regex) in self.edges() {
            table
                .entry(label(from))
                .or_default()
                .insert(label(to), regex.to_string());
        }

        GnfaSnapshot {
            start_state: label(self.start_state()),
            accept_state: label(self.accept_state()),
            table,
        }
    }

    /// Rebuild a GNFA from a snapshot, checking the GNFA shape rules.
    pub fn from_snapshot(snapshot: &GnfaSnapshot) -> Result<Gnfa, ValidationError> {
        let mut labels = StateLabels::new();
        for state in snapshot.table.keys() {
            labels.get_or_create(state.as_str());
        }
        let start = labels.get_or_create(snapshot.start_state.as_str());
        let accept = labels.get_or_create(snapshot.accept_state.as_str());
        if start == accept {
            return Err(ValidationError::StartIsAccept);
        }

        let mut edges = HashMap::new();
        for (from_label, row) in &snapshot.table {
            let from = lookup(&labels, from_label, from_label)?;
            for (to_label, text) in row {
                let to = lookup(&labels, from_label, to_label)?;
                let regex = parse_regex(text).map_err(|source| ValidationError::InvalidLabel {
                    from: from_label.to_string(),
                    to: to_label.to_string(),
                    source,
                })?;
                if regex == Regex::EmptySet {
                    continue;
                }
                if to == start {
                    return Err(ValidationError::IncomingToStart {
                        from: from_label.to_string(),
                    });
                }
                if from == accept {
                    return Err(ValidationError::OutgoingFromAccept {
                        to: to_label.to_string(),
                    });
                }
                edges.insert((from, to), regex);
            }
        }

        Ok(Gnfa::from_parts(labels, start, accept, edges))
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Gnfa, SnapshotError> {
        let snapshot: GnfaSnapshot = serde_json::from_str(json)?;
        Ok(Gnfa::from_snapshot(&snapshot)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_labels() {
        let snapshot: NfaSnapshot = serde_json::from_str(
            r#"{ "startState": 0, "acceptStates": [1], "table": { "0": { "a": [1] } } }"#,
        )
        .unwrap();

        assert_eq!(snapshot.start_state, Some(Label::from("0")));
        assert_eq!(snapshot.accept_states, vec![Label::from("1")]);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"{"startState":"0","acceptStates":["1"],"table":{"0":{"a":["1"]}}}"#
        );
    }

    #[test]
    fn test_nfa_snapshot_lists_every_state() {
        let mut builder = Nfa::builder("p");
        let q = builder.add_labeled_state("q");
        builder.add_transition(0, 'a', q).unwrap();
        builder.add_epsilon_transition(0, q);
        builder.add_accept_state(q);
        let snapshot = builder.build().to_snapshot();

        assert_eq!(snapshot.start_state, Some(Label::from("p")));
        assert_eq!(snapshot.table.len(), 2);
        let row = &snapshot.table[&Label::from("p")];
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["~", "a"]);
        assert!(snapshot.table[&Label::from("q")].is_empty());
    }

    #[test]
    fn test_nfa_validation() {
        let missing_start = NfaSnapshot::default();
        assert_eq!(
            Nfa::from_snapshot(&missing_start).unwrap_err(),
            ValidationError::MissingStart
        );

        let mut snapshot = NfaSnapshot {
            start_state: Some(Label::from("0")),
            ..Default::default()
        };
        snapshot
            .table
            .insert(Label::from("0"), IndexMap::from([("a".to_string(), vec![Label::from("9")])]));
        assert_eq!(
            Nfa::from_snapshot(&snapshot).unwrap_err(),
            ValidationError::UnknownTarget {
                state: "0".to_string(),
                target: "9".to_string()
            }
        );

        snapshot
            .table
            .insert(Label::from("0"), IndexMap::from([("ab".to_string(), vec![])]));
        assert!(matches!(
            Nfa::from_snapshot(&snapshot),
            Err(ValidationError::InvalidSymbol { .. })
        ));

        // A start state that no table key or accepting state declares
        let snapshot: NfaSnapshot = serde_json::from_str(
            r#"{ "startState": "zz", "acceptStates": [], "table": { "0": { "a": ["0"] } } }"#,
        )
        .unwrap();
        assert_eq!(
            Nfa::from_snapshot(&snapshot).unwrap_err(),
            ValidationError::UnknownStart {
                state: "zz".to_string()
            }
        );

        // Being accepting is enough to be declared
        let snapshot: NfaSnapshot =
            serde_json::from_str(r#"{ "startState": 5, "acceptStates": [5], "table": {} }"#)
                .unwrap();
        let nfa = Nfa::from_snapshot(&snapshot).unwrap();
        assert_eq!(nfa.num_states(), 1);
        assert!(nfa.accepts(""));
    }

    #[test]
    fn test_dfa_start_is_first_key() {
        let dfa = Dfa::from_json(
            r#"{ "acceptStates": ["x"], "table": { "y": { "a": "x" }, "x": {} } }"#,
        )
        .unwrap();

        assert_eq!(dfa.label(dfa.start_state()), "y");
        assert!(dfa.accepts("a"));

        let snapshot = dfa.to_snapshot();
        assert_eq!(snapshot.table.first().map(|(k, _)| k.as_str()), Some("y"));
    }

    #[test]
    fn test_dfa_rejects_epsilon() {
        let err = Dfa::from_json(r#"{ "acceptStates": [], "table": { "0": { "~": "0" } } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Invalid(ValidationError::EpsilonInDfa { .. })
        ));
    }

    #[test]
    fn test_gnfa_snapshot_omits_empty_labels() {
        let mut builder = Nfa::builder("0");
        builder.add_transition(0, 'a', 0).unwrap();
        builder.add_accept_state(0);
        let gnfa = Gnfa::from_nfa(&builder.build());

        let snapshot = gnfa.to_snapshot();
        assert_eq!(snapshot.start_state, Label::from("start"));
        assert_eq!(snapshot.table[&Label::from("0")].len(), 2);
        assert!(snapshot.table[&Label::from("accept")].is_empty());

        let restored = Gnfa::from_snapshot(&snapshot).unwrap();
        assert_eq!(restored.eliminate_all(&[]).unwrap().to_string(), "a*");
    }

    #[test]
    fn test_gnfa_validation() {
        let parse = |json: &str| Gnfa::from_json(json).unwrap_err();

        assert!(matches!(
            parse(r#"{ "startState": "s", "acceptState": "s", "table": {} }"#),
            SnapshotError::Invalid(ValidationError::StartIsAccept)
        ));
        assert!(matches!(
            parse(r#"{ "startState": "s", "acceptState": "f", "table": { "f": { "q": "a" }, "q": {} } }"#),
            SnapshotError::Invalid(ValidationError::OutgoingFromAccept { .. })
        ));
        assert!(matches!(
            parse(r#"{ "startState": "s", "acceptState": "f", "table": { "q": { "s": "a" } } }"#),
            SnapshotError::Invalid(ValidationError::IncomingToStart { .. })
        ));
        assert!(matches!(
            parse(r#"{ "startState": "s", "acceptState": "f", "table": { "s": { "f": "(a" } } }"#),
            SnapshotError::Invalid(ValidationError::InvalidLabel { .. })
        ));
        assert!(matches!(
            parse(r#"{ "startState": "s", "table": {} }"#),
            SnapshotError::Json(_)
        ));

        // ∅ edges are allowed anywhere
        let gnfa = Gnfa::from_json(
            r#"{ "startState": "s", "acceptState": "f", "table": { "f": { "s": "∅" } } }"#,
        )
        .unwrap();
        assert!(gnfa.is_final());
        assert_eq!(gnfa.regex(), Some(Regex::EmptySet));
    }
}
