//! formlang - Regular expressions and finite automata from the command line
//!
//! Automata are read and written as JSON NFA snapshots.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use formlang::automaton::{Dfa, Gnfa, Nfa, StateId, Step};
use formlang::regex::parse_regex;
use log::LevelFilter;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "formlang")]
#[command(about = "Regular expressions, NFAs, DFAs and GNFAs")]
#[command(version)]
struct Cli {
    /// Log every transformation step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a regular expression into an automaton
    Compile {
        /// Regular expression
        regex: String,

        /// Output snapshot format
        #[arg(short, long, default_value = "nfa")]
        format: OutputFormat,
    },

    /// Run an automaton on an input word
    Run {
        /// NFA snapshot file ("-" for stdin)
        file: PathBuf,

        /// Input word
        input: String,

        /// Print the active states after every character
        #[arg(short, long)]
        trace: bool,
    },

    /// Determinize an automaton with the subset construction
    Determinize {
        /// NFA snapshot file ("-" for stdin)
        file: PathBuf,

        /// Output snapshot format
        #[arg(short, long, default_value = "nfa")]
        format: OutputFormat,
    },

    /// Build the minimal DFA of an automaton
    Minimize {
        /// NFA snapshot file ("-" for stdin)
        file: PathBuf,

        /// Output snapshot format
        #[arg(short, long, default_value = "nfa")]
        format: OutputFormat,
    },

    /// Rename states in breadth-first order from the start state
    Relabel {
        /// NFA snapshot file ("-" for stdin)
        file: PathBuf,
    },

    /// Remove states that cannot reach an accepting state
    Prune {
        /// NFA snapshot file ("-" for stdin)
        file: PathBuf,

        /// Add a single trash state completing every missing transition instead
        #[arg(short, long)]
        restore: bool,
    },

    /// Check whether two automata accept the same language
    Equivalent {
        /// First NFA snapshot file
        left: PathBuf,

        /// Second NFA snapshot file
        right: PathBuf,
    },

    /// Convert an automaton into a regular expression by state elimination
    ToRegex {
        /// NFA snapshot file ("-" for stdin)
        file: PathBuf,

        /// Labels of the states to eliminate first, in order
        #[arg(short, long, value_delimiter = ',')]
        order: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// NFA snapshot (startState, acceptStates, table of state lists)
    Nfa,
    /// DFA snapshot (acceptStates, table of single states; first state is the start)
    Dfa,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = execute(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Compile { regex, format } => {
            let regex =
                parse_regex(&regex).with_context(|| format!("Failed to parse regex: {regex}"))?;
            let nfa = regex.to_nfa();
            match format {
                OutputFormat::Nfa => println!("{}", nfa.to_json()?),
                OutputFormat::Dfa => print_dfa(&nfa.to_dfa(), format)?,
            }
            Ok(())
        }
        Commands::Run { file, input, trace } => {
            let nfa = load_nfa(&file)?;
            let mut accepted = false;
            for step in nfa.simulation(&input) {
                match step {
                    Step::Active(states) if trace => {
                        let labels: Vec<String> = states.iter().map(|s| nfa.label(s)).collect();
                        println!("{{{}}}", labels.join(", "));
                    }
                    Step::Active(_) => {}
                    Step::Finished(verdict) => accepted = verdict,
                }
            }
            println!("{}", if accepted { "accepted" } else { "rejected" });
            Ok(())
        }
        Commands::Determinize { file, format } => print_dfa(&load_nfa(&file)?.to_dfa(), format),
        Commands::Minimize { file, format } => print_dfa(&load_nfa(&file)?.minimized(), format),
        Commands::Relabel { file } => {
            let (relabeled, mapping) = load_nfa(&file)?.relabeled();
            for (old, new) in &mapping {
                eprintln!("{old} -> {new}");
            }
            println!("{}", relabeled.to_json()?);
            Ok(())
        }
        Commands::Prune { file, restore } => {
            let nfa = load_nfa(&file)?;
            let result = if restore {
                nfa.trash_states_added()
            } else {
                nfa.trash_states_removed()
            };
            println!("{}", result.to_json()?);
            Ok(())
        }
        Commands::Equivalent { left, right } => {
            let left = load_nfa(&left)?;
            let right = load_nfa(&right)?;
            match left.distinguishing_word(&right) {
                None => println!("equivalent"),
                Some(word) => println!("not equivalent: {word:?} is accepted by only one of them"),
            }
            Ok(())
        }
        Commands::ToRegex { file, order } => {
            let nfa = load_nfa(&file)?;
            let gnfa = Gnfa::from_nfa(&nfa);
            let order = order
                .iter()
                .map(|label| {
                    gnfa.labels()
                        .id(label)
                        .with_context(|| format!("Unknown state: {label}"))
                })
                .collect::<Result<Vec<StateId>>>()?;
            let regex = gnfa.eliminate_all(&order)?;
            println!("{regex}");
            Ok(())
        }
    }
}

fn print_dfa(dfa: &Dfa, format: OutputFormat) -> Result<()> {
    let json = match format {
        OutputFormat::Nfa => dfa.to_nfa().to_json()?,
        OutputFormat::Dfa => dfa.to_json()?,
    };
    println!("{json}");
    Ok(())
}

fn load_nfa(path: &Path) -> Result<Nfa> {
    let json = if path == Path::new("-") {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read stdin")?;
        json
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?
    };

    if json.trim().is_empty() {
        bail!("Empty snapshot: {}", path.display());
    }

    Nfa::from_json(&json).with_context(|| format!("Invalid NFA snapshot: {}", path.display()))
}
