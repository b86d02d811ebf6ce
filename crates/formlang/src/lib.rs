//! Regular expressions, NFAs, DFAs and GNFAs as one closed algebra.
//!
//! Text parses into a [`Regex`], which compiles into an [`Nfa`]. An NFA can be
//! simulated, determinized into a [`Dfa`], minimized, compared with another
//! NFA for language equivalence, relabeled and pruned, or turned back into a
//! regular expression through a [`Gnfa`]. Every transformation returns a new
//! value and leaves its input untouched.
//!
//! ```
//! use formlang::prelude::*;
//!
//! let nfa = parse_regex("(a|b)*aba").unwrap().to_nfa();
//! assert!(nfa.accepts("babaaba"));
//!
//! let dfa = nfa.minimized();
//! assert_eq!(dfa.num_states(), 4);
//!
//! let regex = dfa.to_nfa().to_regex();
//! assert!(regex.to_nfa().is_equivalent(&nfa));
//! ```

pub mod automaton;
pub mod error;
pub mod regex;
pub mod snapshot;

pub use automaton::{Dfa, Gnfa, Nfa, StateId, StateSet};
pub use error::{Error, Result};
pub use regex::{Regex, parse_regex};

pub mod prelude {
    pub use crate::automaton::{
        Dfa, DfaBuilder, Gnfa, Nfa, NfaBuilder, Simulation, StateId, StateSet, Step, Symbol,
    };
    pub use crate::error::{Error, InvalidOperation, ParseError, Result, ValidationError};
    pub use crate::regex::{Regex, parse_regex};
    pub use crate::snapshot::{DfaSnapshot, GnfaSnapshot, Label, NfaSnapshot};
}
