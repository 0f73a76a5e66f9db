//! L-System Rewriter - Deterministic string rewriting
//!
//! Grows the tree pattern one pass at a time. Symbols:
//! - `0`: segment ending in a leaf
//! - `1`: branch segment
//! - `[`: push position and heading, turn left 45 degrees
//! - `]`: pop position and heading, turn right 45 degrees

use std::collections::HashMap;

/// Substitution table, fixed once built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rules {
    table: HashMap<char, String>,
}

impl Rules {
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (char, S)>,
        S: Into<String>,
    {
        Self {
            table: pairs.into_iter().map(|(c, s)| (c, s.into())).collect(),
        }
    }

    /// Replacement for `symbol`, if it has one
    pub fn get(&self, symbol: char) -> Option<&str> {
        self.table.get(&symbol).map(String::as_str)
    }
}

/// Apply one rewriting pass. Unmapped symbols pass through unchanged.
pub fn iterate(state: &str, rules: &Rules) -> String {
    let mut next = String::with_capacity(state.len() * 2);
    for c in state.chars() {
        match rules.get(c) {
            Some(replacement) => next.push_str(replacement),
            None => next.push(c),
        }
    }
    next
}

/// An axiom, its rules, and the string grown so far
#[derive(Debug, Clone)]
pub struct LSystem {
    axiom: String,
    rules: Rules,
    current: String,
    depth: u32,
}

impl LSystem {
    pub fn new(axiom: impl Into<String>, rules: Rules) -> Self {
        let axiom = axiom.into();
        Self {
            current: axiom.clone(),
            axiom,
            rules,
            depth: 0,
        }
    }

    /// The rule set the demo draws.
    /// Axiom: 2, Rules: 2 → 1[[[0[[[00[[[0[[[[[[[2
    pub fn christmas_tree() -> Self {
        Self::new("2", Rules::new([('2', "1[[[0[[[00[[[0[[[[[[[2")]))
    }

    /// Classic fractal binary tree.
    /// Axiom: 0, Rules: 0 → 1[0]0, 1 → 11
    pub fn binary_tree() -> Self {
        Self::new("0", Rules::new([('0', "1[0]0"), ('1', "11")]))
    }

    pub fn value(&self) -> &str {
        &self.current
    }

    pub fn axiom(&self) -> &str {
        &self.axiom
    }

    /// Number of passes applied since the axiom
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn iterate(&mut self) {
        self.current = iterate(&self.current, &self.rules);
        self.depth += 1;
    }

    pub fn advance(&mut self, passes: u32) -> &str {
        for _ in 0..passes {
            self.iterate();
        }
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_tree_first_pass() {
        let mut system = LSystem::binary_tree();
        system.iterate();
        assert_eq!(system.value(), "1[0]0");
        assert_eq!(system.depth(), 1);
    }

    #[test]
    fn test_binary_tree_second_pass() {
        let mut system = LSystem::binary_tree();
        assert_eq!(system.advance(2), "11[1[0]0]1[0]0");
    }

    #[test]
    fn test_unmapped_symbols_pass_through() {
        let rules = Rules::new([('a', "ab")]);
        assert_eq!(iterate("x[a]y", &rules), "x[ab]y");
        assert_eq!(iterate("", &rules), "");
    }

    #[test]
    fn test_empty_rules_is_identity() {
        let rules = Rules::default();
        assert_eq!(iterate("1[0]0", &rules), "1[0]0");
    }

    #[test]
    fn test_christmas_tree_growth() {
        let mut system = LSystem::christmas_tree();
        let mut previous = system.value().len();
        for _ in 0..4 {
            system.iterate();
            assert!(system.value().len() >= previous);
            previous = system.value().len();
        }
        assert!(system.value().starts_with("1[[[0"));
        assert!(system.value().ends_with('2'));
    }

    #[test]
    fn test_deterministic() {
        let mut a = LSystem::binary_tree();
        let mut b = LSystem::binary_tree();
        assert_eq!(a.advance(5), b.advance(5));
        assert_eq!(a.axiom(), "0");
    }

    #[test]
    fn test_growth_and_determinism_across_rule_sets() {
        let cases: Vec<(&str, Rules)> = vec![
            ("F", Rules::new([('F', "F+G"), ('G', "F-G")])),
            ("F--F--F", Rules::new([('F', "F+F--F+F")])),
            // Partial map: `b` and `[`/`]` have no rule
            ("ab[a]", Rules::new([('a', "ab")])),
            // Same-length substitution
            ("xyz", Rules::new([('x', "y"), ('y', "x")])),
            // Rules that never match
            ("0]1[", Rules::new([('q', "qq")])),
            ("", Rules::new([('0', "00")])),
        ];

        for (axiom, rules) in cases {
            let mut a = LSystem::new(axiom, rules.clone());
            let mut b = LSystem::new(axiom, rules);
            let mut previous = a.value().len();
            for pass in 1..=5 {
                a.iterate();
                b.iterate();
                assert_eq!(a.value(), b.value(), "axiom {:?} pass {}", axiom, pass);
                assert!(a.value().len() >= previous, "axiom {:?} shrank on pass {}", axiom, pass);
                previous = a.value().len();
            }
            assert_eq!(a.depth(), 5);
        }
    }
}
