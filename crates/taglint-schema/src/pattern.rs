//! Sequence pattern matcher for ordered child-role lists.
//!
//! Grammar: whitespace-separated atoms. An atom is a literal role name or a
//! one-level parenthesized alternation `(A|B|...)`, optionally suffixed with
//! `*` (zero or more), `+` (one or more) or `?` (zero or one). There is no
//! nesting, no back-references and no anchors: matching is always full-match
//! over the whole input sequence.
//!
//! Compilation builds a small NFA over the literal role alphabet; matching
//! runs an epsilon-closure state-set simulation, so there is no backtracking
//! and a token that keeps no state alive rejects early.

use thiserror::Error;

/// Errors produced while compiling a pattern source string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("empty pattern")]
    Empty,
    #[error("unbalanced parenthesis at byte {0}")]
    UnbalancedParen(usize),
    #[error("nested parenthesis at byte {0}")]
    NestedParen(usize),
    #[error("empty alternative in group at byte {0}")]
    EmptyAlternative(usize),
    #[error("quantifier `{0}` has no preceding atom")]
    DanglingQuantifier(char),
    #[error("`|` outside of a parenthesized group at byte {0}")]
    StrayAlternation(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

#[derive(Debug, Clone)]
struct Atom {
    /// Literal roles this atom accepts (one entry for a plain literal).
    alternatives: Vec<String>,
    quantifier: Quantifier,
}

#[derive(Debug, Clone, Default)]
struct State {
    /// Transitions consuming one token: (alternative set index, target).
    edges: Vec<(usize, usize)>,
    epsilon: Vec<usize>,
}

/// A compiled child-sequence pattern.
#[derive(Debug)]
pub struct Pattern {
    source: String,
    /// Alternative sets referenced by NFA edges, one per atom.
    alphabets: Vec<Vec<String>>,
    /// Per-atom flag: true when the atom carried `*` or `+`.
    repeated: Vec<bool>,
    states: Vec<State>,
    start: usize,
    accept: usize,
}

impl Pattern {
    /// Compile a pattern source string.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        let atoms = parse(source)?;
        if atoms.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(build_nfa(source, atoms))
    }

    /// The source string this pattern was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every literal role name the pattern can consume.
    #[must_use]
    pub fn literals(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .alphabets
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Literal roles that may occur more than once in a row, i.e. roles of
    /// atoms quantified with `*` or `+`.
    #[must_use]
    pub fn repeatable_literals(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .alphabets
            .iter()
            .zip(&self.repeated)
            .filter(|(_, repeated)| **repeated)
            .flat_map(|(alternatives, _)| alternatives.iter().map(String::as_str))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Match the whole role sequence end-to-end.
    #[must_use]
    pub fn full_match<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        let mut current = self.closure(vec![self.start]);
        for role in roles {
            let role = role.as_ref();
            let mut next = Vec::new();
            for &state in &current {
                for &(alphabet, target) in &self.states[state].edges {
                    if self.alphabets[alphabet].iter().any(|a| a == role) {
                        next.push(target);
                    }
                }
            }
            if next.is_empty() {
                // No surviving state: unambiguous early reject.
                return false;
            }
            current = self.closure(next);
        }
        current.contains(&self.accept)
    }

    fn closure(&self, seed: Vec<usize>) -> Vec<usize> {
        let mut seen = vec![false; self.states.len()];
        let mut stack = seed;
        let mut out = Vec::new();
        while let Some(state) = stack.pop() {
            if seen[state] {
                continue;
            }
            seen[state] = true;
            out.push(state);
            stack.extend(self.states[state].epsilon.iter().copied());
        }
        out.sort_unstable();
        out
    }
}

fn parse(source: &str) -> Result<Vec<Atom>, PatternError> {
    let mut atoms = Vec::new();
    let bytes = source.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                let open = i;
                let mut alternatives = Vec::new();
                let mut current = String::new();
                i += 1;
                loop {
                    if i >= bytes.len() {
                        return Err(PatternError::UnbalancedParen(open));
                    }
                    match bytes[i] as char {
                        '(' => return Err(PatternError::NestedParen(i)),
                        ')' => {
                            push_alternative(&mut alternatives, &mut current, open)?;
                            i += 1;
                            break;
                        }
                        '|' => {
                            push_alternative(&mut alternatives, &mut current, open)?;
                            i += 1;
                        }
                        c if c.is_whitespace() => i += 1,
                        c => {
                            current.push(c);
                            i += 1;
                        }
                    }
                }
                let quantifier = take_quantifier(bytes, &mut i);
                atoms.push(Atom {
                    alternatives,
                    quantifier,
                });
            }
            ')' => return Err(PatternError::UnbalancedParen(i)),
            '|' => return Err(PatternError::StrayAlternation(i)),
            '*' | '+' | '?' => return Err(PatternError::DanglingQuantifier(c)),
            _ => {
                let start = i;
                while i < bytes.len() && !"()|*+? \t\n\r".contains(bytes[i] as char) {
                    i += 1;
                }
                let literal = source[start..i].to_string();
                let quantifier = take_quantifier(bytes, &mut i);
                atoms.push(Atom {
                    alternatives: vec![literal],
                    quantifier,
                });
            }
        }
    }
    Ok(atoms)
}

fn push_alternative(
    alternatives: &mut Vec<String>,
    current: &mut String,
    group_start: usize,
) -> Result<(), PatternError> {
    if current.is_empty() {
        return Err(PatternError::EmptyAlternative(group_start));
    }
    alternatives.push(std::mem::take(current));
    Ok(())
}

fn take_quantifier(bytes: &[u8], i: &mut usize) -> Quantifier {
    if *i < bytes.len() {
        let q = match bytes[*i] as char {
            '*' => Some(Quantifier::ZeroOrMore),
            '+' => Some(Quantifier::OneOrMore),
            '?' => Some(Quantifier::ZeroOrOne),
            _ => None,
        };
        if let Some(q) = q {
            *i += 1;
            return q;
        }
    }
    Quantifier::One
}

fn build_nfa(source: &str, atoms: Vec<Atom>) -> Pattern {
    let mut states: Vec<State> = vec![State::default()];
    let mut alphabets = Vec::new();
    let mut repeated = Vec::new();
    let mut current = 0usize;

    for atom in atoms {
        let alphabet = alphabets.len();
        alphabets.push(atom.alternatives);
        repeated.push(matches!(
            atom.quantifier,
            Quantifier::ZeroOrMore | Quantifier::OneOrMore
        ));
        match atom.quantifier {
            Quantifier::One => {
                let next = new_state(&mut states);
                states[current].edges.push((alphabet, next));
                current = next;
            }
            Quantifier::ZeroOrOne => {
                let next = new_state(&mut states);
                states[current].edges.push((alphabet, next));
                states[current].epsilon.push(next);
                current = next;
            }
            Quantifier::ZeroOrMore => {
                let next = new_state(&mut states);
                states[current].edges.push((alphabet, current));
                states[current].epsilon.push(next);
                current = next;
            }
            Quantifier::OneOrMore => {
                let repeat = new_state(&mut states);
                let next = new_state(&mut states);
                states[current].edges.push((alphabet, repeat));
                states[repeat].edges.push((alphabet, repeat));
                states[repeat].epsilon.push(next);
                current = next;
            }
        }
    }

    Pattern {
        source: source.to_string(),
        alphabets,
        repeated,
        states,
        start: 0,
        accept: current,
    }
}

fn new_state(states: &mut Vec<State>) -> usize {
    states.push(State::default());
    states.len() - 1
}
