//! L-system grammar expansion. An axiom string is rewritten a fixed number of
//! times, with every symbol replaced simultaneously on each pass.

use fnv::FnvBuildHasher;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Axiom used when an empty one is given
pub const DEFAULT_AXIOM: &str = "X";

/// A single rewrite rule: every occurrence of `symbol` is replaced with
/// `replacement`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRule {
    pub symbol: char,
    pub replacement: String,
}

impl ProductionRule {
    pub fn new(symbol: char, replacement: impl Into<String>) -> Self {
        Self {
            symbol,
            replacement: replacement.into(),
        }
    }
}

/// A set of production rules, at most one per symbol. Symbols without a rule
/// are copied through unchanged.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: HashMap<char, String, FnvBuildHasher>,
}

impl RuleSet {
    /// The rule that grows the street grid. Every `X` becomes a trunk of 5
    /// forward steps with 4 branches, each ending in a new `X`.
    pub const CITY_STREETS: (char, &'static str) =
        ('X', "F[+X]F[-X]F[-X]F[+X]F");

    pub fn new(rules: impl IntoIterator<Item = ProductionRule>) -> Self {
        let mut rule_set = Self::default();
        for rule in rules {
            rule_set.insert(rule);
        }
        rule_set
    }

    /// The fixed rule set used for city generation
    pub fn city_streets() -> Self {
        let (symbol, replacement) = Self::CITY_STREETS;
        Self::new(vec![ProductionRule::new(symbol, replacement)])
    }

    /// Add a rule. If there's already a rule for the symbol, it's replaced.
    pub fn insert(&mut self, rule: ProductionRule) {
        self.rules.insert(rule.symbol, rule.replacement);
    }

    pub fn get(&self, symbol: char) -> Option<&str> {
        self.rules.get(&symbol).map(String::as_str)
    }
}

/// Rewrite `axiom` under `rules`, `iterations` times. An empty axiom is
/// treated as [DEFAULT_AXIOM]. This is a pure function: the same input always
/// gives the same output.
///
/// Output length grows geometrically with `iterations`, so keep it small.
pub fn expand(axiom: &str, rules: &RuleSet, iterations: u8) -> String {
    let mut current = if axiom.is_empty() {
        DEFAULT_AXIOM.to_owned()
    } else {
        axiom.to_owned()
    };

    for _ in 0..iterations {
        let mut next = String::with_capacity(current.len() * 4);
        for symbol in current.chars() {
            match rules.get(symbol) {
                Some(replacement) => next.push_str(replacement),
                None => next.push(symbol),
            }
        }
        current = next;
    }

    current
}
