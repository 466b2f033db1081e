//! String predicates: the value tests inside a
//! [`RecordMatcher`](crate::RecordMatcher).
//!
//! A [`Predicate`] is immutable once built. All of its validation happens in
//! the constructor: an empty argument or an unparsable regex is rejected there,
//! so evaluation itself can never fail. Case folding of the argument also
//! happens once, at construction.
//!
//! # Regex semantics
//!
//! The `regex` predicate matches only when the **entire** value matches the
//! pattern. `A.*B` matches `AxxB` but not `zAxxBz`. The pattern is anchored
//! rather than searched, so alternations like `a|ab` still accept `ab`.

use crate::error::{Error, Result};
use crate::record::Value;
use phf::phf_ordered_map;
use regex::Regex;
use regex_syntax::hir::{Hir, Look};
use regex_syntax::ParserBuilder;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The six predicate kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    Contains,
    EndsWith,
    Equals,
    NotEquals,
    Regex,
    StartsWith,
}

static KINDS_BY_IDENTIFIER: phf::OrderedMap<&'static str, PredicateKind> = phf_ordered_map! {
    "contains" => PredicateKind::Contains,
    "endsWith" => PredicateKind::EndsWith,
    "equals" => PredicateKind::Equals,
    "notEquals" => PredicateKind::NotEquals,
    "regex" => PredicateKind::Regex,
    "startsWith" => PredicateKind::StartsWith,
};

static KINDS_BY_DISPLAY_NAME: phf::OrderedMap<&'static str, PredicateKind> = phf_ordered_map! {
    "Contains" => PredicateKind::Contains,
    "Ends With" => PredicateKind::EndsWith,
    "Equals" => PredicateKind::Equals,
    "Not Equals" => PredicateKind::NotEquals,
    "Matches Regex" => PredicateKind::Regex,
    "Starts With" => PredicateKind::StartsWith,
};

impl PredicateKind {
    /// Persisted identifier. Never rename one of these.
    pub fn identifier(self) -> &'static str {
        match self {
            PredicateKind::Contains => "contains",
            PredicateKind::EndsWith => "endsWith",
            PredicateKind::Equals => "equals",
            PredicateKind::NotEquals => "notEquals",
            PredicateKind::Regex => "regex",
            PredicateKind::StartsWith => "startsWith",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PredicateKind::Contains => "Contains",
            PredicateKind::EndsWith => "Ends With",
            PredicateKind::Equals => "Equals",
            PredicateKind::NotEquals => "Not Equals",
            PredicateKind::Regex => "Matches Regex",
            PredicateKind::StartsWith => "Starts With",
        }
    }

    /// Phrase used when describing a rule in prose.
    fn verb(self) -> &'static str {
        match self {
            PredicateKind::Contains => "contains",
            PredicateKind::EndsWith => "ends with",
            PredicateKind::Equals => "equals",
            PredicateKind::NotEquals => "does not equal",
            PredicateKind::Regex => "matches",
            PredicateKind::StartsWith => "starts with",
        }
    }

    /// # Errors
    ///
    /// [`Error::InvalidIdentifier`] carrying `identifier` when unknown.
    pub fn from_identifier(identifier: &str) -> Result<Self> {
        KINDS_BY_IDENTIFIER
            .get(identifier)
            .copied()
            .ok_or_else(|| Error::InvalidIdentifier {
                registry: "predicate identifier",
                value: identifier.to_string(),
            })
    }

    /// # Errors
    ///
    /// [`Error::InvalidIdentifier`] carrying `name` when unknown.
    pub fn from_display_name(name: &str) -> Result<Self> {
        KINDS_BY_DISPLAY_NAME
            .get(name)
            .copied()
            .ok_or_else(|| Error::InvalidIdentifier {
                registry: "predicate display name",
                value: name.to_string(),
            })
    }

    /// Every kind in registration order.
    pub fn all() -> impl Iterator<Item = PredicateKind> {
        KINDS_BY_IDENTIFIER.values().copied()
    }

    /// Display names in registration order.
    pub fn display_names() -> impl Iterator<Item = &'static str> {
        KINDS_BY_DISPLAY_NAME.keys().copied()
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Compiled form of the argument.
#[derive(Clone)]
enum Test {
    /// The argument, already lower-cased when ignoring case.
    Text(String),
    Pattern(Regex),
}

/// A stateless string test with a fixed argument.
///
/// Equality and hashing consider only `(kind, argument, ignoring_case)`;
/// two predicates built from the same triple are interchangeable.
#[derive(Clone)]
pub struct Predicate {
    kind: PredicateKind,
    argument: String,
    ignoring_case: bool,
    test: Test,
}

impl Predicate {
    /// Build a predicate.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `argument` is empty.
    /// - [`Error::InvalidPattern`] if `kind` is [`PredicateKind::Regex`] and
    ///   `argument` does not compile.
    pub fn new(
        kind: PredicateKind,
        argument: impl Into<String>,
        ignoring_case: bool,
    ) -> Result<Self> {
        let argument = argument.into();
        if argument.is_empty() {
            return Err(Error::invalid_argument(format!(
                "{} predicate requires a non-empty argument",
                kind.identifier()
            )));
        }
        let test = match kind {
            PredicateKind::Regex => Test::Pattern(compile_whole_match(&argument, ignoring_case)?),
            _ if ignoring_case => Test::Text(argument.to_lowercase()),
            _ => Test::Text(argument.clone()),
        };
        Ok(Self {
            kind,
            argument,
            ignoring_case,
            test,
        })
    }

    /// Build from a persisted identifier such as `"startsWith"`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIdentifier`] for an unknown identifier, otherwise as
    /// [`Predicate::new`].
    pub fn from_identifier(
        identifier: &str,
        argument: impl Into<String>,
        ignoring_case: bool,
    ) -> Result<Self> {
        Self::new(
            PredicateKind::from_identifier(identifier)?,
            argument,
            ignoring_case,
        )
    }

    /// Build from a display name such as `"Starts With"`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidIdentifier`] for an unknown name, otherwise as
    /// [`Predicate::new`].
    pub fn from_display_name(
        name: &str,
        argument: impl Into<String>,
        ignoring_case: bool,
    ) -> Result<Self> {
        Self::new(
            PredicateKind::from_display_name(name)?,
            argument,
            ignoring_case,
        )
    }

    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    pub fn identifier(&self) -> &'static str {
        self.kind.identifier()
    }

    /// The argument exactly as supplied, never case-folded.
    pub fn argument(&self) -> &str {
        &self.argument
    }

    pub fn is_ignoring_case(&self) -> bool {
        self.ignoring_case
    }

    /// Test a value. Anything other than a string is `false`.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        match value.as_str() {
            Some(s) => self.matches_str(s),
            None => false,
        }
    }

    pub fn matches_str(&self, value: &str) -> bool {
        let argument = match &self.test {
            Test::Pattern(re) => return re.is_match(value),
            Test::Text(argument) => argument.as_str(),
        };
        let folded;
        let value = if self.ignoring_case {
            folded = value.to_lowercase();
            folded.as_str()
        } else {
            value
        };
        match self.kind {
            PredicateKind::Contains => value.contains(argument),
            PredicateKind::EndsWith => value.ends_with(argument),
            PredicateKind::Equals => value == argument,
            PredicateKind::NotEquals => value != argument,
            PredicateKind::StartsWith => value.starts_with(argument),
            PredicateKind::Regex => false,
        }
    }
}

/// Compile `pattern` so that it only accepts whole values.
///
/// The pattern is parsed on its own and anchored at the syntax-tree level, so
/// inline flags and verbose-mode comments keep their meaning.
fn compile_whole_match(pattern: &str, ignoring_case: bool) -> Result<Regex> {
    let invalid = |detail: String| Error::InvalidPattern {
        pattern: pattern.to_string(),
        detail,
    };
    let hir = ParserBuilder::new()
        .case_insensitive(ignoring_case)
        .build()
        .parse(pattern)
        .map_err(|e| invalid(e.to_string()))?;
    let anchored = Hir::concat(vec![Hir::look(Look::Start), hir, Hir::look(Look::End)]);
    Regex::new(&anchored.to_string()).map_err(|e| invalid(e.to_string()))
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.ignoring_case == other.ignoring_case
            && self.argument == other.argument
    }
}

impl Eq for Predicate {}

impl Hash for Predicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.argument.hash(state);
        self.ignoring_case.hash(state);
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("identifier", &self.kind.identifier())
            .field("argument", &self.argument)
            .field("ignoring_case", &self.ignoring_case)
            .finish()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind.verb(), self.argument)?;
        if self.ignoring_case {
            f.write_str(" (ignoring case)")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
