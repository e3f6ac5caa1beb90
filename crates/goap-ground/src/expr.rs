//! Atom expressions: `Name`, `Name(arg, ...)`.
//!
//! An argument is a constant (an integer literal or a double-quoted string) or a variable (an
//! identifier). The same syntax names parameterized actions, e.g. `write B(id)` or `F1(b)`.

use std::collections::BTreeMap;
use std::fmt;

use goap_core::{PlanningError, Result};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Constant {
    Int(i64),
    Str(String),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(i) => write!(f, "{i}"),
            Constant::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Int(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::Str(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Const(Constant),
    Var(String),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Const(c) => c.fmt(f),
            Term::Var(v) => f.write_str(v),
        }
    }
}

/// Variable name -> constant.
pub type Binding = BTreeMap<String, Constant>;

/// Predicate name plus arity; two expressions with the same signature talk about the same
/// family of atoms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    pub predicate: String,
    pub arity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AtomExpr {
    predicate: String,
    args: Vec<Term>,
}

impl AtomExpr {
    pub fn new(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        Parser::new(input).parse()
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    pub fn args(&self) -> &[Term] {
        &self.args
    }

    pub fn signature(&self) -> Signature {
        Signature {
            predicate: self.predicate.clone(),
            arity: self.args.len(),
        }
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(|t| matches!(t, Term::Const(_)))
    }

    /// Variables in order of first occurrence.
    pub fn variables(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for t in &self.args {
            if let Term::Var(v) = t {
                if !out.contains(&v.as_str()) {
                    out.push(v);
                }
            }
        }
        out
    }

    /// Replace bound variables by their constants; unbound variables stay.
    pub fn substitute(&self, binding: &Binding) -> AtomExpr {
        let args = self
            .args
            .iter()
            .map(|t| match t {
                Term::Var(v) => binding
                    .get(v)
                    .map(|c| Term::Const(c.clone()))
                    .unwrap_or_else(|| t.clone()),
                Term::Const(_) => t.clone(),
            })
            .collect();
        AtomExpr::new(self.predicate.clone(), args)
    }

    /// Match this pattern against a ground atom.
    ///
    /// Constants must be equal position by position, and a variable occurring more than once
    /// must meet the same constant everywhere. Returns the induced binding.
    pub fn unify(&self, ground: &AtomExpr) -> Option<Binding> {
        if self.predicate != ground.predicate || self.args.len() != ground.args.len() {
            return None;
        }
        let mut binding = Binding::new();
        for (pattern, value) in self.args.iter().zip(&ground.args) {
            let Term::Const(value) = value else {
                return None;
            };
            match pattern {
                Term::Const(c) if c != value => return None,
                Term::Const(_) => {}
                Term::Var(v) => match binding.get(v) {
                    Some(bound) if bound != value => return None,
                    Some(_) => {}
                    None => {
                        binding.insert(v.clone(), value.clone());
                    }
                },
            }
        }
        Some(binding)
    }
}

impl fmt::Display for AtomExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.predicate)?;
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            arg.fmt(f)?;
        }
        f.write_str(")")
    }
}

struct Parser<'a> {
    input: &'a str,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input }
    }

    fn error(&self, reason: impl Into<String>) -> PlanningError {
        PlanningError::MalformedAtom {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn parse(&self) -> Result<AtomExpr> {
        let text = self.input.trim();
        let Some(open) = text.find('(') else {
            self.check_predicate(text)?;
            return Ok(AtomExpr::new(text, Vec::new()));
        };

        let predicate = text[..open].trim_end();
        self.check_predicate(predicate)?;
        let Some(inner) = text[open + 1..].strip_suffix(')') else {
            return Err(self.error("missing closing ')'"));
        };

        let args = self
            .split_args(inner)?
            .into_iter()
            .map(|raw| self.parse_term(raw))
            .collect::<Result<Vec<_>>>()?;
        Ok(AtomExpr::new(predicate, args))
    }

    fn check_predicate(&self, predicate: &str) -> Result<()> {
        if predicate.is_empty() {
            return Err(self.error("empty name"));
        }
        if predicate.contains([')', ',', '"']) {
            return Err(self.error("unexpected character in name"));
        }
        Ok(())
    }

    /// Split on commas that are not inside a quoted string.
    fn split_args<'s>(&self, inner: &'s str) -> Result<Vec<&'s str>> {
        let mut out = Vec::new();
        let mut in_string = false;
        let mut start = 0;
        for (i, ch) in inner.char_indices() {
            match ch {
                '"' => in_string = !in_string,
                ',' if !in_string => {
                    out.push(&inner[start..i]);
                    start = i + 1;
                }
                '(' | ')' if !in_string => return Err(self.error("nested parentheses")),
                _ => {}
            }
        }
        if in_string {
            return Err(self.error("unterminated string"));
        }
        out.push(&inner[start..]);
        Ok(out)
    }

    fn parse_term(&self, raw: &str) -> Result<Term> {
        let arg = raw.trim();
        if arg.is_empty() {
            return Err(self.error("empty argument"));
        }
        if let Some(rest) = arg.strip_prefix('"') {
            return match rest.strip_suffix('"') {
                Some(s) if !s.contains('"') => Ok(Term::Const(Constant::Str(s.to_string()))),
                _ => Err(self.error(format!("bad string literal {arg}"))),
            };
        }
        if let Ok(i) = arg.parse::<i64>() {
            return Ok(Term::Const(Constant::Int(i)));
        }
        let mut chars = arg.chars();
        let starts_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if starts_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Ok(Term::Var(arg.to_string()));
        }
        Err(self.error(format!("bad argument '{arg}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_atom() {
        let a = AtomExpr::parse(" slider_high ").unwrap();
        assert_eq!(a.predicate(), "slider_high");
        assert!(a.args().is_empty());
        assert!(a.is_ground());
        assert_eq!(a.to_string(), "slider_high");
    }

    #[test]
    fn parses_mixed_arguments() {
        let a = AtomExpr::parse("A(0, b, \"x,y\")").unwrap();
        assert_eq!(
            a.args(),
            &[
                Term::Const(Constant::Int(0)),
                Term::Var("b".into()),
                Term::Const(Constant::Str("x,y".into())),
            ]
        );
        assert_eq!(a.variables(), vec!["b"]);
        assert_eq!(a.to_string(), "A(0,b,\"x,y\")");
        assert_eq!(a.signature(), Signature { predicate: "A".into(), arity: 3 });
    }

    #[test]
    fn action_names_may_contain_spaces() {
        let a = AtomExpr::parse("write B(id)").unwrap();
        assert_eq!(a.predicate(), "write B");
        assert_eq!(a.variables(), vec!["id"]);
        let plain = AtomExpr::parse("Move Slider to 50").unwrap();
        assert!(plain.args().is_empty());
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "A(", "A()", "A(1,)", "A(\"x)", "A(b c)", "(x)", "A((x))", "A(x)y"] {
            assert!(
                matches!(AtomExpr::parse(bad), Err(PlanningError::MalformedAtom { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn unify_binds_variables() {
        let pattern = AtomExpr::parse("A(0,b)").unwrap();
        let fact = AtomExpr::parse("A(0,7)").unwrap();
        let binding = pattern.unify(&fact).unwrap();
        assert_eq!(binding.get("b"), Some(&Constant::Int(7)));

        let other = AtomExpr::parse("A(1,7)").unwrap();
        assert_eq!(pattern.unify(&other), None);
    }

    #[test]
    fn unify_requires_consistent_repeated_variables() {
        let pattern = AtomExpr::parse("E(x,x)").unwrap();
        assert!(pattern.unify(&AtomExpr::parse("E(1,1)").unwrap()).is_some());
        assert!(pattern.unify(&AtomExpr::parse("E(1,2)").unwrap()).is_none());
    }

    #[test]
    fn substitute_keeps_unbound_variables() {
        let pattern = AtomExpr::parse("B(c,b)").unwrap();
        let mut binding = Binding::new();
        binding.insert("b".into(), Constant::from("abc"));
        assert_eq!(pattern.substitute(&binding).to_string(), "B(c,\"abc\")");
    }
}
